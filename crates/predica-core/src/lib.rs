#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for Predica predicate compilation.
//!
//! Two layers:
//! - **Tree layer**: the immutable predicate tree handed over by the
//!   upstream parser/simplifier (`Predicate` and its leaf payloads)
//! - **Identity layer**: stable feature hashing shared with the index
//!   (`FeatureHash`, `ConjunctionId`)

pub mod hash;
pub mod predicate;

#[cfg(test)]
mod hash_tests;

pub use hash::{
    ConjunctionId, FeatureHash, Z_STAR_FEATURE, hash_feature, hash_key, hash_label, z_star_hash,
};
pub use predicate::{
    EdgeBounds, FeatureConjunction, FeatureRange, FeatureSet, Predicate, RangeEdgePartition,
    RangePartition,
};
