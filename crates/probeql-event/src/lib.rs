//! ProbeQL event record and process context contracts
//!
//! These are the two interfaces through which the engine consumes the
//! outside world: the [`Event`] record handed over per observed system
//! activity, and the [`ProcessInfo`] tree supplied by the external
//! process-state tracker. The engine only ever reads both; it never
//! owns, mutates or persists them.

mod event;
mod process;

pub use event::*;
pub use process::*;
