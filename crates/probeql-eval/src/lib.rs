//! Expression evaluator
//!
//! Walks a compiled expression against one event and produces a match
//! verdict. Evaluation never fails: a field that does not apply to the
//! event, a function body that rejects its runtime input, or even an
//! unexpected panic inside one evaluation all degrade to a non-match
//! for the affected sub-expression, logged but never propagated. The
//! expression tree is read-only here, so one compiled rule serves any
//! number of concurrent evaluators.

mod evaluator;

pub use evaluator::evaluate;
