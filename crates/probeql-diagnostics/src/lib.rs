//! ProbeQL diagnostics and error handling
//!
//! This crate provides the error handling infrastructure for the ProbeQL
//! engine: source spans and locations, diagnostic records, and the
//! top-level error type shared by the lexer, parser and evaluator.

mod error;
mod span;

pub use error::*;
pub use span::*;

/// Result type for ProbeQL operations
pub type Result<T> = std::result::Result<T, QlError>;
