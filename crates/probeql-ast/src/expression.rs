//! Expression AST nodes

use crate::{BinaryOp, Literal, UnaryOp};
use probeql_fields::Field;
use probeql_functions::FunctionDef;
use probeql_types::ValueKind;
use std::fmt;

/// A compiled filter expression node.
///
/// Field and function references are resolved, so no variant carries a
/// raw name that could still fail to exist at evaluation time.
#[derive(Debug, Clone)]
pub enum Expression {
    /// Literal value
    Literal(Literal),
    /// Resolved field reference
    Field(Field),
    /// Unary operation
    Unary(UnaryExpr),
    /// Binary comparison or logical connective
    Binary(BinaryExpr),
    /// Resolved function call
    FunctionCall(FunctionCall),
    /// List literal, the right-hand side of `in`
    List(Vec<Expression>),
}

/// Unary operation node
#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expression>,
}

/// Binary operation node
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub lhs: Box<Expression>,
    pub op: BinaryOp,
    pub rhs: Box<Expression>,
}

/// Function call with its resolved catalog signature
#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub def: &'static FunctionDef,
    pub args: Vec<Expression>,
}

impl Expression {
    /// Static kind tag of this node, used for parse-time checks.
    ///
    /// Composite nodes yield the kind of the value they evaluate to.
    pub fn static_kind(&self) -> ValueKind {
        match self {
            Self::Literal(lit) => lit.kind(),
            Self::Field(field) => field.kind,
            Self::Unary(_) => ValueKind::Bool,
            Self::Binary(_) => ValueKind::Bool,
            Self::FunctionCall(call) => call.def.return_kind,
            Self::List(_) => ValueKind::Slice,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{}", lit),
            Self::Field(field) => write!(f, "{}", field.name),
            Self::Unary(u) => write!(f, "{} {}", u.op, u.operand),
            Self::Binary(b) => write!(f, "{} {} {}", b.lhs, b.op, b.rhs),
            Self::FunctionCall(call) => {
                write!(f, "{}(", call.def.name)?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Self::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}
