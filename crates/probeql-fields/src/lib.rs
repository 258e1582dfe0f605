//! ProbeQL field registry and namespace accessors
//!
//! A field is a dotted identifier (`net.dip`, `ps.parent.name`) resolved
//! at compile time against the immutable [`FieldRegistry`] into a
//! (namespace, declared kind) pair. At evaluation time the namespace tag
//! selects one of the [`Accessor`] implementations, which pulls the
//! typed value out of the event record or reports not-applicable.

mod accessors;
mod registry;

pub use accessors::*;
pub use registry::*;
