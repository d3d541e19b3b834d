//! Tree analysis.
//!
//! Two depth-first passes over the predicate tree, both tracking negation
//! parity:
//! - structure: tree size, per-conjunction-child subtree sizes, feature
//!   occurrence counts, and whether any leaf is negated
//! - min-feature: occurrence-discounted lower bound on true leaves

mod analyzer;


pub use analyzer::{Analyzer, AnalyzerResult, NodeId};

pub(crate) use analyzer::{AnalyzerContext, NodeIdGen};
