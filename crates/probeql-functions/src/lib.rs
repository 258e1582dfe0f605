//! Built-in function catalog
//!
//! Declares every function callable from a filter expression along
//! with the static signature data the parser validates against:
//! canonical name, ordered argument specs and return kind. The
//! runtime bodies live in [`builtins`] and are plain pure functions
//! over evaluated argument values.
//!
//! Adding a function is one new entry in the `BUILTINS` table.

mod builtins;
mod catalog;

pub use catalog::{
    default_catalog, ArgKind, ArgSpec, FunctionCatalog, FunctionDef, FunctionError, BUILTINS,
};
