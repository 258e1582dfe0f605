//! Lexer for the filter grammar using Logos

use logos::Logos;
use probeql_diagnostics::{QlError, SourceLocation, Span};
use std::fmt;
use std::net::IpAddr;

/// Token type for filter expressions.
///
/// Dotted field identifiers (`net.dip.names`) lex as one token, and a
/// bare dotted quad lexes as an IP literal rather than two floats.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // === Keywords ===
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("in")]
    In,
    #[token("contains")]
    Contains,
    #[token("startswith")]
    StartsWith,
    #[token("endswith")]
    EndsWith,
    #[token("matches")]
    Matches,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // === Operators ===
    #[token("=")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,

    // === Literals ===
    #[regex(r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}", |lex| lex.slice().parse::<IpAddr>().ok())]
    Ip(IpAddr),

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),

    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| {
        let s = lex.slice();
        unescape(&s[1..s.len() - 1])
    })]
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape(&s[1..s.len() - 1])
    })]
    String(String),

    // === Identifier ===
    // Dotted segments belong to the identifier: field names are
    // namespace-qualified and must arrive at the parser whole.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*(\.[a-zA-Z0-9_]+)*", |lex| lex.slice().to_string())]
    Ident(String),

    // === Special ===
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::And => write!(f, "and"),
            Token::Or => write!(f, "or"),
            Token::Not => write!(f, "not"),
            Token::In => write!(f, "in"),
            Token::Contains => write!(f, "contains"),
            Token::StartsWith => write!(f, "startswith"),
            Token::EndsWith => write!(f, "endswith"),
            Token::Matches => write!(f, "matches"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Eq => write!(f, "="),
            Token::NotEq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Ip(addr) => write!(f, "{}", addr),
            Token::Float(n) => write!(f, "{}", n),
            Token::Integer(n) => write!(f, "{}", n),
            Token::String(s) => write!(f, "'{}'", s),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

/// Decodes backslash escapes inside a string literal body. Only `\'`,
/// `\"` and `\\` are recognized; anything else makes the token invalid.
fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            _ => return None,
        }
    }
    Some(out)
}

/// Spanned token with byte position information
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

/// Tokenize a source string; fails on the first unrecognized character
/// or malformed literal.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, QlError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push(SpannedToken {
                token,
                start: span.start,
                end: span.end,
            }),
            Err(()) => {
                let slice = lexer.slice();
                let message = if slice.len() > 1 && (slice.starts_with('\'') || slice.starts_with('"')) {
                    format!("invalid escape sequence in {}", slice)
                } else if slice == "'" || slice == "\"" {
                    "unterminated string literal".to_string()
                } else {
                    format!("unexpected character {:?}", slice)
                };
                return Err(QlError::lex_at(
                    message,
                    SourceLocation::from_span(Span::new(span.start, span.end), source),
                ));
            }
        }
    }
    let end = source.len();
    tokens.push(SpannedToken {
        token: Token::Eof,
        start: end,
        end,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_dotted_field_is_one_token() {
        let tokens = kinds("kevt.time.h = 22");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("kevt.time.h".into()),
                Token::Eq,
                Token::Integer(22),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_ip_literal() {
        let tokens = kinds("net.dip = 172.17.12.4");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("net.dip".into()),
                Token::Eq,
                Token::Ip("172.17.12.4".parse().unwrap()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_string_literals_both_quotes() {
        assert_eq!(
            kinds(r#"'cmd.exe' "cmd.exe""#),
            vec![
                Token::String("cmd.exe".into()),
                Token::String("cmd.exe".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_and_operators() {
        let tokens = kinds("not a and b or c in (1, 2) >= 3.5");
        assert!(tokens.contains(&Token::Not));
        assert!(tokens.contains(&Token::And));
        assert!(tokens.contains(&Token::Or));
        assert!(tokens.contains(&Token::In));
        assert!(tokens.contains(&Token::Ge));
        assert!(tokens.contains(&Token::Float(3.5)));
    }

    #[test]
    fn test_escaped_quote_is_decoded() {
        assert_eq!(
            kinds(r"'o\'brien.exe'"),
            vec![Token::String("o'brien.exe".into()), Token::Eof]
        );
    }

    #[test]
    fn test_escaped_backslash_is_decoded() {
        assert_eq!(
            kinds(r"'C:\\Windows'"),
            vec![Token::String(r"C:\Windows".into()), Token::Eof]
        );
    }

    #[test]
    fn test_invalid_escape_is_a_lex_error() {
        let err = tokenize(r"ps.name = 'bad\x'").unwrap_err();
        assert!(err.is_compile_error());
        assert!(err.to_string().contains("invalid escape sequence"));
    }

    #[test]
    fn test_unterminated_string_is_a_lex_error() {
        let err = tokenize("ps.name = 'cmd").unwrap_err();
        assert!(err.is_compile_error());
    }

    #[test]
    fn test_unrecognized_character() {
        let err = tokenize("kevt.pid § 4").unwrap_err();
        assert!(err.to_string().contains("unexpected character"));
    }
}
