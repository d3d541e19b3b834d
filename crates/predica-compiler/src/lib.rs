//! Predica compiler: predicate tree analyzer and interval annotator.
//!
//! This crate turns a simplified predicate tree into the annotations the
//! predicate index stores:
//! - `analyze` - structural statistics and the min-feature lower bound
//! - `annotate` - interval assignment, including Z-star intervals for negated leaves
//! - `printer` - indented tree rendering with sizes and assigned ranges
//! - `dump` - human-readable listing of the annotation maps
//!
//! # Example
//!
//! ```
//! use predica_compiler::annotate;
//! use predica_core::{Predicate, hash_feature};
//!
//! let predicate = Predicate::and([
//!     Predicate::feature_set("gender", ["male"]),
//!     Predicate::feature_set("country", ["no", "se"]),
//! ]);
//!
//! let annotations = annotate(&predicate).expect("supported predicate");
//! assert_eq!(annotations.min_feature, 2);
//! assert!(annotations.interval_map.contains_key(&hash_feature("country", "se")));
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analyze;
pub mod annotate;
pub mod config;
pub mod dump;
pub mod printer;

mod invariants;

#[cfg(test)]
mod dump_tests;
#[cfg(test)]
pub mod test_utils;

use predica_core::Predicate;

pub use analyze::{Analyzer, AnalyzerResult, NodeId};
pub use annotate::{
    Annotator, Assignment, AssignmentRecorder, INTERVAL_BEGIN, NoopTracer,
    PredicateTreeAnnotations, Tracer,
};
pub use config::CompileConfig;
pub use dump::dump;
pub use printer::PredicatePrinter;

/// Errors that abort compilation of a predicate.
///
/// Compilation is all-or-nothing: no partial annotations are ever returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A node kind the passes cannot compile (e.g. an unfolded constant).
    #[error("unsupported predicate node kind: {0}")]
    UnsupportedNodeKind(&'static str),

    /// Recursion fuel exhausted (tree nested too deeply).
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    #[error("predicate tree too large: {0} interval slots (max 65535)")]
    TreeTooLarge(u32),

    #[error("edge partition `{0}` has bounds that cannot be encoded")]
    InvalidEdgeBounds(String),
}

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, Error>;

/// Analyze a predicate with the default configuration.
pub fn analyze(root: &Predicate) -> Result<AnalyzerResult> {
    Analyzer::new().analyze(root)
}

/// Analyze and annotate a predicate with the default configuration.
pub fn annotate(root: &Predicate) -> Result<PredicateTreeAnnotations> {
    Annotator::new().annotate(root)
}
