//! Filter expression AST definitions
//!
//! Nodes come out of the parser fully resolved: field references carry
//! their registry entry and function calls carry their catalog
//! signature, so evaluation needs no name lookups. A built expression
//! is immutable and safe to share across threads.

mod expression;
mod literal;
mod operator;

pub use expression::*;
pub use literal::*;
pub use operator::*;
