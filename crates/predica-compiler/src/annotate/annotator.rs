//! Interval assignment.
//!
//! Slots are numbered `INTERVAL_BEGIN..=interval_end`. A conjunction splits
//! its range into contiguous, disjoint child ranges; a disjunction hands the
//! same range to every child. Negated leaves shrink their own interval to a
//! Z-star end and additionally register Z-star intervals under the reserved
//! Z-star feature.

use indexmap::IndexMap;
use predica_core::{
    ConjunctionId, FeatureConjunction, FeatureHash, FeatureRange, FeatureSet, Predicate,
    hash_feature, hash_label, z_star_hash,
};
use predica_interval::{Interval, IntervalWithBounds, MAX_SLOT};

use super::annotations::PredicateTreeAnnotations;
use super::trace::{NoopTracer, Tracer};
use crate::analyze::{Analyzer, AnalyzerResult, NodeId, NodeIdGen};
use crate::config::{CompileConfig, RecursionFuel};
use crate::{Error, Result};

/// First slot of the numbering. Slot 0 is only ever used as the lower
/// boundary of a Z-star interval (`begin - 1`).
pub const INTERVAL_BEGIN: u32 = 1;

/// Runs the analyzer, then assigns intervals to every leaf.
#[derive(Debug, Clone, Default)]
pub struct Annotator {
    config: CompileConfig,
}

impl Annotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CompileConfig) -> Self {
        Self { config }
    }

    /// Set recursion depth limit. None = infinite.
    pub fn with_recursion_fuel(mut self, limit: Option<u32>) -> Self {
        self.config.recursion_fuel = limit;
        self
    }

    pub fn annotate(&self, root: &Predicate) -> Result<PredicateTreeAnnotations> {
        self.annotate_traced(root, &mut NoopTracer)
    }

    /// Annotate while reporting every assignment to `tracer`.
    pub fn annotate_traced<T: Tracer>(
        &self,
        root: &Predicate,
        tracer: &mut T,
    ) -> Result<PredicateTreeAnnotations> {
        let analysis = Analyzer::with_config(self.config).analyze(root)?;
        self.annotate_analyzed(root, &analysis, tracer)
    }

    /// Annotate with a precomputed analysis.
    ///
    /// # Panics
    ///
    /// `analysis` must come from analyzing `root` itself. An analysis of any
    /// other tree panics on the first conjunction child it has no size for.
    pub fn annotate_analyzed<T: Tracer>(
        &self,
        root: &Predicate,
        analysis: &AnalyzerResult,
        tracer: &mut T,
    ) -> Result<PredicateTreeAnnotations> {
        if analysis.tree_size > u32::from(MAX_SLOT) {
            return Err(Error::TreeTooLarge(analysis.tree_size));
        }

        let mut ctx = AnnotatorContext::new(analysis, self.config, tracer);
        ctx.assign(root, INTERVAL_BEGIN, analysis.tree_size, false)?;
        let annotations = ctx.finish(analysis.min_feature);

        log::debug!(
            "annotated predicate: interval_end={} min_feature={} features={} bounds={} conjunctions={}",
            annotations.interval_end,
            annotations.min_feature,
            annotations.interval_map.len(),
            annotations.bounds_map.len(),
            annotations.feature_conjunctions.len(),
        );

        Ok(annotations)
    }
}

/// Leaf payload, borrowed from the tree.
#[derive(Clone, Copy)]
enum Leaf<'p> {
    Set(&'p FeatureSet),
    Range(&'p FeatureRange),
    Conjunction(&'p FeatureConjunction),
}

/// Mutable state of one annotation call.
struct AnnotatorContext<'a, T: Tracer> {
    analysis: &'a AnalyzerResult,
    tracer: &'a mut T,
    interval_end: u32,
    interval_map: IndexMap<FeatureHash, Vec<Interval>>,
    bounds_map: IndexMap<FeatureHash, Vec<IntervalWithBounds>>,
    feature_conjunctions: IndexMap<ConjunctionId, Vec<Interval>>,
    /// Leaves visited so far, across the whole tree.
    left_node_leaves: u32,
    /// Whether a negated leaf already claimed the final slot.
    final_range_used: bool,
    z_star: FeatureHash,
    node_ids: NodeIdGen,
    fuel: RecursionFuel,
}

impl<'a, T: Tracer> AnnotatorContext<'a, T> {
    fn new(analysis: &'a AnalyzerResult, config: CompileConfig, tracer: &'a mut T) -> Self {
        Self {
            analysis,
            tracer,
            interval_end: analysis.tree_size,
            interval_map: IndexMap::new(),
            bounds_map: IndexMap::new(),
            feature_conjunctions: IndexMap::new(),
            left_node_leaves: 0,
            final_range_used: false,
            z_star: z_star_hash(),
            node_ids: NodeIdGen::default(),
            fuel: RecursionFuel::new(config.recursion_fuel),
        }
    }

    fn finish(self, min_feature: u32) -> PredicateTreeAnnotations {
        PredicateTreeAnnotations {
            min_feature,
            interval_end: self.interval_end,
            interval_map: self.interval_map,
            bounds_map: self.bounds_map,
            feature_conjunctions: self.feature_conjunctions,
        }
    }

    fn assign(&mut self, node: &Predicate, begin: u32, end: u32, negated: bool) -> Result<()> {
        self.fuel.enter()?;
        let result = self.assign_node(node, begin, end, negated);
        self.fuel.exit();
        result
    }

    fn assign_node(&mut self, node: &Predicate, begin: u32, end: u32, negated: bool) -> Result<()> {
        let id = self.node_ids.claim();
        self.tracer.trace_assign(id, node, begin, end, negated);

        match node {
            Predicate::Conjunction(children) => self.assign_conjunction(children, begin, end, negated),
            Predicate::Disjunction(children) => {
                for child in children {
                    self.assign(child, begin, end, negated)?;
                }
                Ok(())
            }
            Predicate::Negation(operand) => self.assign(operand, begin, end, !negated),
            Predicate::FeatureSet(set) => self.leaf(id, Leaf::Set(set), begin, end, negated),
            Predicate::FeatureRange(range) => self.leaf(id, Leaf::Range(range), begin, end, negated),
            Predicate::FeatureConjunction(conj) => {
                self.leaf(id, Leaf::Conjunction(conj), begin, end, negated)
            }
            Predicate::Boolean(_) => Err(Error::UnsupportedNodeKind(node.kind_name())),
        }
    }

    /// Split `begin..=end` among children in order.
    ///
    /// The first child ends relative to the global leaf count, middle
    /// children take exactly their subtree size, and the last child takes
    /// whatever remains up to `end`.
    fn assign_conjunction(
        &mut self,
        children: &[Predicate],
        begin: u32,
        end: u32,
        negated: bool,
    ) -> Result<()> {
        let last = children.len().saturating_sub(1);
        let mut current = begin;

        for (i, child) in children.iter().enumerate() {
            if i == last {
                return self.assign(child, current, end, negated);
            }
            let size = self.analysis.ensure_sub_tree_size(self.node_ids.peek());
            let child_end = if i == 0 {
                self.left_node_leaves + size
            } else {
                current + size - 1
            };
            self.assign(child, current, child_end, negated)?;
            current = child_end + 1;
        }
        Ok(())
    }

    fn leaf(&mut self, id: NodeId, leaf: Leaf<'_>, begin: u32, end: u32, negated: bool) -> Result<()> {
        let z_star_end = if negated {
            self.z_star_interval_end(end)
        } else {
            end
        };
        let interval = Interval::from_boundaries(to_slot(begin)?, to_slot(z_star_end)?);

        match leaf {
            Leaf::Set(set) => {
                for value in &set.values {
                    self.register(id, hash_feature(&set.key, value), interval);
                }
            }
            Leaf::Range(range) => {
                for partition in &range.partitions {
                    self.register(id, hash_label(&partition.label), interval);
                }
                for edge in &range.edge_partitions {
                    let bounds = edge
                        .bounds
                        .encode()
                        .ok_or_else(|| Error::InvalidEdgeBounds(edge.label.clone()))?;
                    self.tracer.trace_register(id, interval);
                    self.bounds_map
                        .entry(hash_label(&edge.label))
                        .or_default()
                        .push(IntervalWithBounds::new(interval, bounds));
                }
            }
            Leaf::Conjunction(conj) => {
                self.tracer.trace_register(id, interval);
                self.feature_conjunctions
                    .entry(conj.id())
                    .or_default()
                    .push(interval);
            }
        }

        if negated {
            self.register_z_star(id, begin, end, z_star_end)?;
        }

        self.left_node_leaves += 1;
        Ok(())
    }

    /// End of a negated leaf's own interval.
    ///
    /// The first negated leaf reaching the final slot stops one short of it,
    /// leaving a single-slot second Z-star interval available somewhere in
    /// the tree. Every other negated leaf ends right after the leaves seen so far.
    fn z_star_interval_end(&mut self, end: u32) -> u32 {
        if end == self.interval_end && !self.final_range_used {
            self.final_range_used = true;
            return self.interval_end - 1;
        }
        self.left_node_leaves + 1
    }

    fn register_z_star(&mut self, id: NodeId, begin: u32, end: u32, z_star_end: u32) -> Result<()> {
        let first = Interval::from_z_star1_boundaries(to_slot(begin - 1)?, to_slot(z_star_end)?);
        self.register(id, self.z_star, first);
        log::trace!("negated leaf {id:?}: z-star {first}");

        if end != z_star_end + 1 {
            let second = Interval::from_z_star2_boundaries(to_slot(end)?);
            self.register(id, self.z_star, second);
            log::trace!("negated leaf {id:?}: z-star {second}");
        }
        Ok(())
    }

    fn register(&mut self, id: NodeId, hash: FeatureHash, interval: Interval) {
        self.tracer.trace_register(id, interval);
        self.interval_map.entry(hash).or_default().push(interval);
    }
}

fn to_slot(value: u32) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::TreeTooLarge(value))
}
