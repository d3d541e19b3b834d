//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use predica_core::{ConjunctionId, FeatureHash};

use crate::analyze::{AnalyzerContext, AnalyzerResult, NodeId};

impl AnalyzerContext {
    pub(crate) fn ensure_feature_count(&self, hash: FeatureHash) -> u32 {
        self.feature_occurrences.get(&hash).copied().unwrap_or_else(|| {
            panic!(
                "Analyzer: feature {hash} has no occurrence count \
                 (structure pass must count every non-negated leaf)"
            )
        })
    }

    pub(crate) fn ensure_conjunction_count(&self, id: ConjunctionId) -> u32 {
        self.conjunction_occurrences.get(&id).copied().unwrap_or_else(|| {
            panic!(
                "Analyzer: feature conjunction {id} has no occurrence count \
                 (structure pass must count every non-negated leaf)"
            )
        })
    }
}

impl AnalyzerResult {
    pub(crate) fn ensure_sub_tree_size(&self, id: NodeId) -> u32 {
        self.sub_tree_sizes.get(&id).copied().unwrap_or_else(|| {
            panic!(
                "Annotator: conjunction child {id:?} has no subtree size \
                 (annotator must walk the tree the analyzer saw)"
            )
        })
    }
}
