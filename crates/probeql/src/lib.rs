//! Filter expression engine for security event streams
//!
//! This crate provides the rule-matching core of an event monitor:
//! - Lexing and parsing of filter expressions
//! - Parse-time resolution of fields and functions with typed
//!   argument validation
//! - Per-event evaluation producing a boolean match verdict
//!
//! # Example
//!
//! ```ignore
//! use probeql::{compile, evaluate};
//!
//! let rule = compile("ps.name = 'cmd.exe' and cidr_contains(net.dip, '10.0.0.0/8')")?;
//! for event in events {
//!     if evaluate(&rule, &event) {
//!         alert(&event);
//!     }
//! }
//! ```

// Re-export all public APIs from internal crates
pub use probeql_ast as ast;
pub use probeql_diagnostics as diagnostics;
pub use probeql_eval as eval;
pub use probeql_event as event;
pub use probeql_fields as fields;
pub use probeql_functions as functions;
pub use probeql_parser as parser;
pub use probeql_types as types;

// Convenience re-exports
pub use probeql_ast::Expression;
pub use probeql_diagnostics::{QlError, Result};
pub use probeql_event::{Event, EventCategory, ProcessInfo};
pub use probeql_fields::{default_registry, FieldRegistry};
pub use probeql_functions::{default_catalog, FunctionCatalog};
pub use probeql_types::{Value, ValueKind};

/// Compile a filter expression against the default field registry and
/// function catalog.
pub fn compile(source: &str) -> Result<Expression> {
    probeql_parser::parse(source)
}

/// Evaluate a compiled expression against one event.
pub fn evaluate(expr: &Expression, evt: &Event) -> bool {
    probeql_eval::evaluate(expr, evt)
}
