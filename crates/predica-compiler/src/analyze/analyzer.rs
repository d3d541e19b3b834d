//! Structural statistics and min-feature computation.

use std::collections::HashMap;

use indexmap::IndexMap;
use predica_core::{ConjunctionId, FeatureHash, Predicate, hash_feature, hash_key};

use crate::config::{CompileConfig, RecursionFuel};
use crate::{Error, Result};

/// Slots reserved by a negated leaf: its own interval plus a Z-star pair.
const NEGATED_LEAF_SIZE: u32 = 2;

/// Preorder index of a node within one predicate tree.
///
/// Every node of every kind gets an id, so two walks over the same tree
/// agree on ids as long as both visit all nodes in order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }
}

/// Hands out preorder ids during a walk.
#[derive(Debug, Default)]
pub(crate) struct NodeIdGen {
    next: u32,
}

impl NodeIdGen {
    /// Claim the id of the node being entered.
    pub(crate) fn claim(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Id the next claimed node will get.
    pub(crate) fn peek(&self) -> NodeId {
        NodeId(self.next)
    }
}

/// Output of the analyzer, consumed by the annotator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerResult {
    /// Number of interval slots the whole tree consumes.
    pub tree_size: u32,
    /// `ceil(raw min-feature)`, plus one if any leaf is negated.
    pub min_feature: u32,
    pub has_negation: bool,
    /// Subtree sizes of direct conjunction children.
    pub sub_tree_sizes: IndexMap<NodeId, u32>,
}

/// Runs both analysis passes over a predicate tree.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: CompileConfig,
}

impl Analyzer {
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

    pub fn analyze(&self, root: &Predicate) -> Result<AnalyzerResult> {
        let mut ctx = AnalyzerContext::new(self.config);

        let tree_size = ctx.structure(root, false)?;
        let raw_min_feature = ctx.min_feature(root, false)?;
        let min_feature = raw_min_feature.ceil() as u32 + u32::from(ctx.has_negation);

        log::trace!(
            "analyzed predicate: tree_size={tree_size} raw_min_feature={raw_min_feature} \
             has_negation={}",
            ctx.has_negation
        );

        Ok(AnalyzerResult {
            tree_size,
            min_feature,
            has_negation: ctx.has_negation,
            sub_tree_sizes: ctx.sub_tree_sizes,
        })
    }
}

/// Mutable state of one analysis call.
pub(crate) struct AnalyzerContext {
    pub(crate) feature_occurrences: HashMap<FeatureHash, u32>,
    pub(crate) conjunction_occurrences: HashMap<ConjunctionId, u32>,
    sub_tree_sizes: IndexMap<NodeId, u32>,
    has_negation: bool,
    node_ids: NodeIdGen,
    fuel: RecursionFuel,
}

impl AnalyzerContext {
    fn new(config: CompileConfig) -> Self {
        Self {
            feature_occurrences: HashMap::new(),
            conjunction_occurrences: HashMap::new(),
            sub_tree_sizes: IndexMap::new(),
            has_negation: false,
            node_ids: NodeIdGen::default(),
            fuel: RecursionFuel::new(config.recursion_fuel),
        }
    }

    fn structure(&mut self, node: &Predicate, negated: bool) -> Result<u32> {
        self.fuel.enter()?;
        let size = self.structure_node(node, negated);
        self.fuel.exit();
        size
    }

    fn structure_node(&mut self, node: &Predicate, negated: bool) -> Result<u32> {
        self.node_ids.claim();

        match node {
            Predicate::Conjunction(children) => {
                let mut size = 0u32;
                for child in children {
                    let child_id = self.node_ids.peek();
                    let child_size = self.structure(child, negated)?;
                    self.sub_tree_sizes.insert(child_id, child_size);
                    size = size.saturating_add(child_size);
                }
                Ok(size)
            }
            Predicate::Disjunction(children) => {
                let mut size = 0u32;
                for child in children {
                    size = size.saturating_add(self.structure(child, negated)?);
                }
                Ok(size)
            }
            Predicate::Negation(operand) => self.structure(operand, !negated),
            Predicate::FeatureConjunction(conj) => {
                if negated {
                    return Ok(self.negated_leaf());
                }
                *self.conjunction_occurrences.entry(conj.id()).or_default() += 1;
                Ok(1)
            }
            Predicate::FeatureSet(set) => {
                if negated {
                    return Ok(self.negated_leaf());
                }
                for value in &set.values {
                    self.count_feature(hash_feature(&set.key, value));
                }
                Ok(1)
            }
            Predicate::FeatureRange(range) => {
                if negated {
                    return Ok(self.negated_leaf());
                }
                self.count_feature(hash_key(&range.key));
                Ok(1)
            }
            Predicate::Boolean(_) => Err(Error::UnsupportedNodeKind(node.kind_name())),
        }
    }

    fn negated_leaf(&mut self) -> u32 {
        self.has_negation = true;
        NEGATED_LEAF_SIZE
    }

    fn count_feature(&mut self, hash: FeatureHash) {
        *self.feature_occurrences.entry(hash).or_default() += 1;
    }

    fn min_feature(&mut self, node: &Predicate, negated: bool) -> Result<f64> {
        self.fuel.enter()?;
        let value = self.min_feature_node(node, negated);
        self.fuel.exit();
        value
    }

    fn min_feature_node(&mut self, node: &Predicate, negated: bool) -> Result<f64> {
        match node {
            Predicate::Conjunction(children) => {
                let mut sum = 0.0;
                for child in children {
                    sum += self.min_feature(child, negated)?;
                }
                Ok(sum)
            }
            Predicate::Disjunction(children) => {
                let mut min: Option<f64> = None;
                for child in children {
                    let value = self.min_feature(child, negated)?;
                    min = Some(min.map_or(value, |m| m.min(value)));
                }
                Ok(min.unwrap_or(0.0))
            }
            Predicate::Negation(operand) => self.min_feature(operand, !negated),
            Predicate::FeatureConjunction(_) if negated => Ok(0.0),
            Predicate::FeatureConjunction(conj) => {
                Ok(1.0 / f64::from(self.ensure_conjunction_count(conj.id())))
            }
            Predicate::FeatureSet(_) if negated => Ok(0.0),
            Predicate::FeatureSet(set) => Ok(set
                .values
                .iter()
                .map(|value| 1.0 / f64::from(self.ensure_feature_count(hash_feature(&set.key, value))))
                .reduce(f64::min)
                .unwrap_or(0.0)),
            Predicate::FeatureRange(_) if negated => Ok(0.0),
            Predicate::FeatureRange(range) => {
                Ok(1.0 / f64::from(self.ensure_feature_count(hash_key(&range.key))))
            }
            Predicate::Boolean(_) => Err(Error::UnsupportedNodeKind(node.kind_name())),
        }
    }
}
