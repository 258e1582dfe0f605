//! Lexer and parser for the filter expression grammar
//!
//! Parsing resolves every name it meets: field references against the
//! field registry, function calls against the function catalog, with
//! arity and argument-kind checks applied before the expression ever
//! sees an event. A successful parse therefore yields an expression
//! that cannot fail name resolution at evaluation time.

mod lexer;
mod parser;
mod suggest;

pub use lexer::{tokenize, SpannedToken, Token};
pub use parser::{parse, parse_with, Parser};
pub use suggest::{levenshtein, suggestions};
