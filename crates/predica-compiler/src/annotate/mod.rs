//! Interval annotation of predicate trees.
//!
//! Consumes the analyzer's output and produces [`PredicateTreeAnnotations`],
//! the record the index builder inserts.

mod annotations;
mod annotator;
mod trace;

#[cfg(test)]
mod properties_tests;

pub use annotations::PredicateTreeAnnotations;
pub use annotator::{Annotator, INTERVAL_BEGIN};
pub use trace::{Assignment, AssignmentRecorder, NoopTracer, Tracer};
