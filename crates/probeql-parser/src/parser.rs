//! Recursive descent parser for filter expressions
//!
//! A hand-written parser keeps the precedence climb explicit and lets
//! name resolution, arity checks and argument-kind checks run inline
//! while the call site is still in hand, which is where the diagnostic
//! strings need the surrounding context.

use crate::lexer::{tokenize, SpannedToken, Token};
use crate::suggest::suggestions;
use probeql_ast::{BinaryExpr, BinaryOp, Expression, FunctionCall, Literal, UnaryExpr, UnaryOp};
use probeql_diagnostics::{QlError, SourceLocation, Span};
use probeql_fields::{default_registry, FieldRegistry};
use probeql_functions::{default_catalog, FunctionCatalog};
use probeql_types::ValueKind;

/// Parse a filter expression against the default field registry and
/// function catalog.
pub fn parse(source: &str) -> Result<Expression, QlError> {
    parse_with(source, default_registry(), default_catalog())
}

/// Parse a filter expression against explicit registries.
pub fn parse_with(
    source: &str,
    fields: &FieldRegistry,
    catalog: &FunctionCatalog,
) -> Result<Expression, QlError> {
    let mut parser = Parser::new(source, fields, catalog)?;
    parser.parse_expression()
}

/// Parser state over a pre-lexed token stream
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<SpannedToken>,
    pos: usize,
    fields: &'a FieldRegistry,
    catalog: &'a FunctionCatalog,
}

impl<'a> Parser<'a> {
    pub fn new(
        source: &'a str,
        fields: &'a FieldRegistry,
        catalog: &'a FunctionCatalog,
    ) -> Result<Self, QlError> {
        let tokens = tokenize(source)?;
        Ok(Self {
            source,
            tokens,
            pos: 0,
            fields,
            catalog,
        })
    }

    /// Parse one complete expression; trailing tokens are an error.
    pub fn parse_expression(&mut self) -> Result<Expression, QlError> {
        let expr = self.parse_or_expr()?;
        if !self.check(&Token::Eof) {
            return Err(self.unexpected("end of expression"));
        }
        Ok(expr)
    }

    fn current(&self) -> &SpannedToken {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(&self.current().token) == std::mem::discriminant(token)
    }

    fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, expected: &Token, msg: &str) -> Result<(), QlError> {
        if self.match_token(expected) {
            Ok(())
        } else {
            Err(self.unexpected(msg))
        }
    }

    fn location(&self) -> SourceLocation {
        let tok = self.current();
        SourceLocation::from_span(Span::new(tok.start, tok.end), self.source)
    }

    fn unexpected(&self, expected: &str) -> QlError {
        QlError::parse_at(
            format!(
                "unexpected token {}, expected {}",
                self.current().token,
                expected
            ),
            self.source,
            self.location(),
        )
    }

    // ========================================================================
    // Precedence tiers
    // ========================================================================

    fn parse_or_expr(&mut self) -> Result<Expression, QlError> {
        let mut left = self.parse_and_expr()?;
        while self.match_token(&Token::Or) {
            let right = self.parse_and_expr()?;
            left = Expression::Binary(BinaryExpr {
                lhs: Box::new(left),
                op: BinaryOp::Or,
                rhs: Box::new(right),
            });
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<Expression, QlError> {
        let mut left = self.parse_not_expr()?;
        while self.match_token(&Token::And) {
            let right = self.parse_not_expr()?;
            left = Expression::Binary(BinaryExpr {
                lhs: Box::new(left),
                op: BinaryOp::And,
                rhs: Box::new(right),
            });
        }
        Ok(left)
    }

    fn parse_not_expr(&mut self) -> Result<Expression, QlError> {
        if self.match_token(&Token::Not) {
            let operand = self.parse_not_expr()?;
            return Ok(Expression::Unary(UnaryExpr {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            }));
        }
        self.parse_comparison_expr()
    }

    fn parse_comparison_expr(&mut self) -> Result<Expression, QlError> {
        let left = self.parse_primary_expr()?;

        let op = match &self.current().token {
            Token::Eq => Some(BinaryOp::Equal),
            Token::NotEq => Some(BinaryOp::NotEqual),
            Token::Lt => Some(BinaryOp::Less),
            Token::Le => Some(BinaryOp::LessOrEqual),
            Token::Gt => Some(BinaryOp::Greater),
            Token::Ge => Some(BinaryOp::GreaterOrEqual),
            Token::In => Some(BinaryOp::In),
            Token::Contains => Some(BinaryOp::Contains),
            Token::StartsWith => Some(BinaryOp::StartsWith),
            Token::EndsWith => Some(BinaryOp::EndsWith),
            Token::Matches => Some(BinaryOp::Matches),
            _ => None,
        };

        let Some(op) = op else {
            return Ok(left);
        };
        let op_location = self.location();
        self.advance();
        let right = if op == BinaryOp::In {
            self.parse_in_operand()?
        } else {
            self.parse_primary_expr()?
        };
        self.check_operands(&left, op, &right, op_location)?;

        Ok(Expression::Binary(BinaryExpr {
            lhs: Box::new(left),
            op,
            rhs: Box::new(right),
        }))
    }

    fn parse_primary_expr(&mut self) -> Result<Expression, QlError> {
        match self.current().token.clone() {
            Token::LParen => {
                self.advance();
                self.parse_group_or_list()
            }
            Token::String(s) => {
                self.advance();
                Ok(Expression::Literal(Literal::String(s)))
            }
            Token::Integer(n) => {
                self.advance();
                Ok(Expression::Literal(Literal::Int(n)))
            }
            Token::Float(n) => {
                self.advance();
                Ok(Expression::Literal(Literal::Float(n)))
            }
            Token::Ip(addr) => {
                self.advance();
                Ok(Expression::Literal(Literal::Ip(addr)))
            }
            Token::True => {
                self.advance();
                Ok(Expression::Literal(Literal::Bool(true)))
            }
            Token::False => {
                self.advance();
                Ok(Expression::Literal(Literal::Bool(false)))
            }
            Token::Ident(name) => {
                let location = self.location();
                self.advance();
                if self.check(&Token::LParen) {
                    self.parse_function_call(&name, location)
                } else {
                    self.resolve_field(&name, location)
                }
            }
            _ => Err(self.unexpected("a literal, field or function call")),
        }
    }

    /// Both grouping and list literals open with `(`; the first comma
    /// decides which one this is.
    fn parse_group_or_list(&mut self) -> Result<Expression, QlError> {
        let first = self.parse_or_expr()?;
        if !self.check(&Token::Comma) {
            self.consume(&Token::RParen, ")")?;
            return Ok(first);
        }

        let mut items = vec![first];
        while self.match_token(&Token::Comma) {
            items.push(self.parse_or_expr()?);
        }
        self.consume(&Token::RParen, ")")?;
        Ok(Expression::List(items))
    }

    /// On the right of `in` a parenthesized expression is always a list,
    /// even with a single element.
    fn parse_in_operand(&mut self) -> Result<Expression, QlError> {
        if !self.match_token(&Token::LParen) {
            return self.parse_primary_expr();
        }

        let mut items = vec![self.parse_or_expr()?];
        while self.match_token(&Token::Comma) {
            items.push(self.parse_or_expr()?);
        }
        self.consume(&Token::RParen, ")")?;
        Ok(Expression::List(items))
    }

    // ========================================================================
    // Name resolution
    // ========================================================================

    fn resolve_field(&self, name: &str, location: SourceLocation) -> Result<Expression, QlError> {
        match self.fields.lookup(name) {
            Some(field) => Ok(Expression::Field(*field)),
            None => Err(QlError::semantic_at(
                format!("{} is not a valid field", name),
                location,
            )),
        }
    }

    fn parse_function_call(
        &mut self,
        name: &str,
        location: SourceLocation,
    ) -> Result<Expression, QlError> {
        let Some(def) = self.catalog.lookup(name) else {
            let ranked = suggestions(name, self.catalog.names());
            let message = if ranked.is_empty() {
                format!("{} function is undefined", name)
            } else {
                format!(
                    "{} function is undefined. Did you mean one of {}?",
                    name,
                    ranked.join("|")
                )
            };
            return Err(QlError::semantic_at(message, location));
        };

        self.consume(&Token::LParen, "(")?;
        let mut args = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                args.push(self.parse_or_expr()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume(&Token::RParen, ")")?;

        if args.len() != def.arity() {
            return Err(QlError::semantic_at(
                format!(
                    "{} function requires {} argument(s) but {} argument(s) given",
                    def.name,
                    def.arity(),
                    args.len()
                ),
                location,
            ));
        }

        for (i, (arg, spec)) in args.iter().zip(def.args.iter()).enumerate() {
            if !spec.admits(arg.static_kind()) {
                return Err(QlError::semantic_at(
                    format!(
                        "argument #{} ({}) in function {} should be one of: {}",
                        i + 1,
                        spec.name,
                        def.name,
                        spec.accepted()
                    ),
                    location,
                ));
            }
        }

        Ok(Expression::FunctionCall(FunctionCall { def, args }))
    }

    // ========================================================================
    // Static operand checks
    // ========================================================================

    fn check_operands(
        &self,
        lhs: &Expression,
        op: BinaryOp,
        rhs: &Expression,
        location: SourceLocation,
    ) -> Result<(), QlError> {
        let lk = lhs.static_kind();
        let rk = rhs.static_kind();

        if op == BinaryOp::In {
            if rk != ValueKind::Slice {
                return Err(QlError::semantic_at(
                    format!("the right-hand side of in must be a list, got {}", rk),
                    location,
                ));
            }
            return Ok(());
        }

        // String predicates render both sides through the canonical
        // string form, so any kind pairing is legal for them.
        if op.is_string_predicate() || op.is_logical() {
            return Ok(());
        }

        if !lk.is_comparable_with(&rk) {
            return Err(QlError::semantic_at(
                format!("{} ({}) cannot be compared with {} ({})", lhs, lk, rhs, rk),
                location,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("kevt.name = 'CreateProcess'")]
    #[case("ps.name = 'cmd.exe' and kevt.pid != 4")]
    #[case("not (net.dport = 443 or net.dport = 8443)")]
    #[case("net.dip = 172.17.12.4")]
    #[case("kevt.name in ('Send', 'Recv')")]
    #[case("ps.name contains 'svc'")]
    #[case(r"ps.exe matches '.*\\.exe'")]
    #[case("cidr_contains(net.dip, '172.17.12.4/24')")]
    #[case("length(ps.name) > 8")]
    #[case("upper(ps.name) = 'CMD.EXE'")]
    fn test_well_formed_expressions_compile(#[case] source: &str) {
        parse(source).unwrap_or_else(|e| panic!("{source}: {e}"));
    }

    #[test]
    fn test_precedence_binds_and_tighter_than_or() {
        let expr = parse("kevt.pid = 4 or kevt.pid = 8 and kevt.cpu = 1").unwrap();
        match expr {
            Expression::Binary(b) => {
                assert_eq!(b.op, BinaryOp::Or);
                match *b.rhs {
                    Expression::Binary(rhs) => assert_eq!(rhs.op, BinaryOp::And),
                    other => panic!("expected and on the right, got {other}"),
                }
            }
            other => panic!("expected binary, got {other}"),
        }
    }

    #[test]
    fn test_arity_mismatch() {
        let err = parse("cidr_contains(net.dip)").unwrap_err();
        assert_eq!(
            err.to_string(),
            "CIDR_CONTAINS function requires 2 argument(s) but 1 argument(s) given"
        );
    }

    #[test]
    fn test_argument_kind_mismatch() {
        let err = parse("cidr_contains(net.dip, 12)").unwrap_err();
        assert_eq!(
            err.to_string(),
            "argument #2 (cidr) in function CIDR_CONTAINS should be one of: string"
        );
    }

    #[test]
    fn test_undefined_function_suggestion() {
        let err = parse("md('172.17.12.4')").unwrap_err();
        assert_eq!(
            err.to_string(),
            "md function is undefined. Did you mean one of MD5?"
        );
    }

    #[test]
    fn test_undefined_function_without_close_candidates() {
        let err = parse("frobnicate(ps.name)").unwrap_err();
        assert_eq!(err.to_string(), "frobnicate function is undefined");
    }

    #[test]
    fn test_unknown_field() {
        let err = parse("kevt.nope = 1").unwrap_err();
        assert_eq!(err.to_string(), "kevt.nope is not a valid field");
        assert!(err.is_compile_error());
    }

    #[test]
    fn test_incomparable_kinds_rejected_at_compile_time() {
        let err = parse("kevt.pid = 'cmd.exe'").unwrap_err();
        assert!(err.to_string().contains("cannot be compared"));
    }

    #[test]
    fn test_in_requires_a_list() {
        let err = parse("kevt.pid in 4").unwrap_err();
        assert!(err.to_string().contains("must be a list"));
    }

    #[test]
    fn test_in_accepts_a_single_element_list() {
        let expr = parse("ps.name in ('cmd.exe')").unwrap();
        match expr {
            Expression::Binary(b) => {
                assert_eq!(b.op, BinaryOp::In);
                match *b.rhs {
                    Expression::List(ref items) => assert_eq!(items.len(), 1),
                    ref other => panic!("expected a list, got {other}"),
                }
            }
            other => panic!("expected binary, got {other}"),
        }
    }

    #[test]
    fn test_parenthesized_group_still_groups_outside_in() {
        let expr = parse("('cmd.exe') = ps.name").unwrap();
        match expr {
            Expression::Binary(b) => {
                assert!(matches!(*b.lhs, Expression::Literal(_)));
            }
            other => panic!("expected binary, got {other}"),
        }
    }

    #[test]
    fn test_case_insensitive_function_names() {
        parse("CIDR_CONTAINS(net.dip, '10.0.0.0/8')").unwrap();
        parse("Cidr_Contains(net.dip, '10.0.0.0/8')").unwrap();
    }

    #[test]
    fn test_nested_function_calls() {
        parse("upper(lower(ps.name)) = 'CMD.EXE'").unwrap();
    }

    #[test]
    fn test_parse_is_deterministic() {
        let a = format!("{:?}", parse("ps.name = 'cmd.exe' and kevt.pid != 4").unwrap());
        let b = format!("{:?}", parse("ps.name = 'cmd.exe' and kevt.pid != 4").unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = parse("kevt.pid = 4 kevt.tid").unwrap_err();
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_errors_carry_location() {
        let err = parse("kevt.pid = bogus.field").unwrap_err();
        let loc = err.location().expect("location");
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 12);
    }
}
