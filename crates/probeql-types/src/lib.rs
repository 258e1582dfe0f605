//! ProbeQL value model
//!
//! Runtime representation of every value the query language can touch:
//! event parameters, field accessor results and expression literals. All
//! of them are tagged with exactly one [`ValueKind`]; comparison and
//! function-argument checks operate on the kind tag, never on the host
//! type behind it.

mod compare;
mod value;

pub use compare::*;
pub use value::*;
