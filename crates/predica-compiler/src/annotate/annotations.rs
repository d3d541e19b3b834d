//! Annotator output handed to the index builder.

use indexmap::IndexMap;
use predica_core::{ConjunctionId, FeatureHash, z_star_hash};
use predica_interval::{Interval, IntervalWithBounds};
use serde::{Deserialize, Serialize};

/// Everything the index needs to insert one predicate.
///
/// Maps preserve first-registration order, so annotating the same tree
/// twice yields identical values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateTreeAnnotations {
    /// Lower bound on leaves that must match before the predicate can.
    pub min_feature: u32,
    /// Last slot of the interval numbering; equals the analyzer's tree size.
    pub interval_end: u32,
    /// Plain and Z-star intervals, by feature hash.
    pub interval_map: IndexMap<FeatureHash, Vec<Interval>>,
    /// Edge-partition intervals with their bounds words.
    pub bounds_map: IndexMap<FeatureHash, Vec<IntervalWithBounds>>,
    pub feature_conjunctions: IndexMap<ConjunctionId, Vec<Interval>>,
}

impl PredicateTreeAnnotations {
    /// Intervals registered under a feature, Z-star or plain.
    pub fn intervals(&self, hash: FeatureHash) -> &[Interval] {
        self.interval_map.get(&hash).map(Vec::as_slice).unwrap_or_default()
    }

    /// Z-star intervals registered by negated leaves.
    pub fn z_star_intervals(&self) -> &[Interval] {
        self.intervals(z_star_hash())
    }

    pub fn bounds(&self, hash: FeatureHash) -> &[IntervalWithBounds] {
        self.bounds_map.get(&hash).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn conjunction_intervals(&self, id: ConjunctionId) -> &[Interval] {
        self.feature_conjunctions.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of registered intervals across all maps.
    pub fn interval_count(&self) -> usize {
        self.interval_map.values().map(Vec::len).sum::<usize>()
            + self.bounds_map.values().map(Vec::len).sum::<usize>()
            + self.feature_conjunctions.values().map(Vec::len).sum::<usize>()
    }
}
