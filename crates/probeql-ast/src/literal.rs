//! Literal values appearing in filter source text

use probeql_types::{Value, ValueKind};
use std::fmt;
use std::net::IpAddr;

/// A literal token carried into the AST with its kind tag
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Single-quoted string
    String(String),
    /// Signed decimal integer
    Int(i64),
    /// Decimal floating point number
    Float(f64),
    /// `true` or `false`
    Bool(bool),
    /// Bare IP address (either family)
    Ip(IpAddr),
}

impl Literal {
    /// Static kind tag used for parse-time argument checks
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::UnicodeString,
            Self::Int(_) => ValueKind::Int64,
            Self::Float(_) => ValueKind::Double,
            Self::Bool(_) => ValueKind::Bool,
            Self::Ip(addr) => match addr {
                IpAddr::V4(_) => ValueKind::Ipv4,
                IpAddr::V6(_) => ValueKind::Ipv6,
            },
        }
    }

    /// Convert to the runtime value representation
    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::string(s.clone()),
            Self::Int(v) => Value::Int64(*v),
            Self::Float(v) => Value::Double(*v),
            Self::Bool(v) => Value::Bool(*v),
            Self::Ip(addr) => Value::Ip(*addr),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "'{}'", s),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Ip(addr) => write!(f, "{}", addr),
        }
    }
}
