//! Predicate tree handed over by the upstream parser.
//!
//! The tree is expected to be simplified already: negations pushed down to
//! leaves and boolean constants folded. Compilation passes treat it as
//! read-only.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::hash::{self, ConjunctionId};

/// A boolean expression over named features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Conjunction(Vec<Predicate>),
    Disjunction(Vec<Predicate>),
    Negation(Box<Predicate>),
    FeatureSet(FeatureSet),
    FeatureRange(FeatureRange),
    FeatureConjunction(FeatureConjunction),
    /// Constant. Folded away by the simplifier; never compiled.
    Boolean(bool),
}

impl Predicate {
    pub fn and(children: impl IntoIterator<Item = Predicate>) -> Self {
        Self::Conjunction(children.into_iter().collect())
    }

    pub fn or(children: impl IntoIterator<Item = Predicate>) -> Self {
        Self::Disjunction(children.into_iter().collect())
    }

    pub fn not(operand: Predicate) -> Self {
        Self::Negation(Box::new(operand))
    }

    /// `key in [values...]`
    pub fn feature_set<S: Into<String>>(
        key: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::FeatureSet(FeatureSet::new(key, values))
    }

    pub fn range(range: FeatureRange) -> Self {
        Self::FeatureRange(range)
    }

    pub fn conjunction_of<K: Into<String>, V: Into<String>>(
        operands: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self::FeatureConjunction(FeatureConjunction::new(operands))
    }

    /// Node kind name used in diagnostics and dumps.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Conjunction(_) => "conjunction",
            Self::Disjunction(_) => "disjunction",
            Self::Negation(_) => "negation",
            Self::FeatureSet(_) => "feature_set",
            Self::FeatureRange(_) => "feature_range",
            Self::FeatureConjunction(_) => "feature_conjunction",
            Self::Boolean(_) => "boolean",
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Self::FeatureSet(_) | Self::FeatureRange(_) | Self::FeatureConjunction(_)
        )
    }

    /// Direct children, in order. Leaves have none.
    pub fn children(&self) -> &[Predicate] {
        match self {
            Self::Conjunction(children) | Self::Disjunction(children) => children,
            Self::Negation(operand) => std::slice::from_ref(operand.as_ref()),
            _ => &[],
        }
    }
}

/// Leaf: true if feature `key` equals any of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub key: String,
    pub values: IndexSet<String>,
}

impl FeatureSet {
    pub fn new<S: Into<String>>(key: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Leaf: true if numeric feature `key` falls in one of the partitions.
///
/// Partitioning of the numeric range happens upstream; this only carries
/// the resulting labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub key: String,
    pub partitions: Vec<RangePartition>,
    pub edge_partitions: Vec<RangeEdgePartition>,
}

impl FeatureRange {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            partitions: Vec::new(),
            edge_partitions: Vec::new(),
        }
    }

    pub fn with_partition(mut self, label: impl Into<String>) -> Self {
        self.partitions.push(RangePartition {
            label: label.into(),
        });
        self
    }

    pub fn with_edge(mut self, label: impl Into<String>, value: i64, bounds: EdgeBounds) -> Self {
        self.edge_partitions.push(RangeEdgePartition {
            label: label.into(),
            value,
            bounds,
        });
        self
    }
}

/// A whole partition of a range feature, e.g. `age=20-29`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangePartition {
    pub label: String,
}

/// A partially covered partition at the edge of a range, e.g. `age=30`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeEdgePartition {
    pub label: String,
    /// Start of the partition on the numeric axis.
    pub value: i64,
    pub bounds: EdgeBounds,
}

/// Covered offsets inside an edge partition, relative to its `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeBounds {
    /// Offsets `>= n`.
    AtLeast(u32),
    /// Offsets `<= n`.
    AtMost(u32),
    /// Offsets in `lower..=upper`.
    Between { lower: u32, upper: u32 },
}

impl EdgeBounds {
    const TAG_SHIFT: u32 = 30;
    const PAYLOAD_MASK: u32 = (1 << Self::TAG_SHIFT) - 1;
    const FIELD_BITS: u32 = 15;
    const FIELD_MASK: u32 = (1 << Self::FIELD_BITS) - 1;

    const TAG_AT_LEAST: u32 = 0b01;
    const TAG_AT_MOST: u32 = 0b10;
    const TAG_BETWEEN: u32 = 0b11;

    /// Pack into the bounds word stored next to an edge interval.
    ///
    /// Layout: `tag:2 | payload:30`. `Between` packs `lower:15 | upper:15`.
    /// Returns `None` if a value does not fit its field or `lower > upper`.
    pub fn encode(self) -> Option<u32> {
        match self {
            Self::AtLeast(n) if n <= Self::PAYLOAD_MASK => {
                Some(Self::TAG_AT_LEAST << Self::TAG_SHIFT | n)
            }
            Self::AtMost(n) if n <= Self::PAYLOAD_MASK => {
                Some(Self::TAG_AT_MOST << Self::TAG_SHIFT | n)
            }
            Self::Between { lower, upper }
                if lower <= upper && upper <= Self::FIELD_MASK =>
            {
                Some(Self::TAG_BETWEEN << Self::TAG_SHIFT | lower << Self::FIELD_BITS | upper)
            }
            _ => None,
        }
    }

    /// Inverse of [`encode`](Self::encode).
    pub fn decode(word: u32) -> Option<Self> {
        let payload = word & Self::PAYLOAD_MASK;
        match word >> Self::TAG_SHIFT {
            Self::TAG_AT_LEAST => Some(Self::AtLeast(payload)),
            Self::TAG_AT_MOST => Some(Self::AtMost(payload)),
            Self::TAG_BETWEEN => {
                let bounds = Self::Between {
                    lower: payload >> Self::FIELD_BITS,
                    upper: payload & Self::FIELD_MASK,
                };
                // Reject words `encode` would never produce.
                bounds.encode().map(|_| bounds)
            }
            _ => None,
        }
    }
}

/// Leaf: a pre-combined AND of `(key, value)` features, indexed as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureConjunction {
    pub operands: BTreeSet<(String, String)>,
}

impl FeatureConjunction {
    pub fn new<K: Into<String>, V: Into<String>>(operands: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            operands: operands
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Stable identity, independent of operand construction order.
    pub fn id(&self) -> ConjunctionId {
        hash::conjunction_id(self.operands.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conjunction(children) => write_joined(f, "and", children, |c| {
                matches!(c, Self::Disjunction(_))
            }),
            Self::Disjunction(children) => write_joined(f, "or", children, |c| {
                matches!(c, Self::Conjunction(_))
            }),
            Self::Negation(operand) => match operand.as_ref() {
                leaf if leaf.is_leaf() || matches!(leaf, Self::Boolean(_)) => {
                    write!(f, "not {leaf}")
                }
                inner => write!(f, "not ({inner})"),
            },
            Self::FeatureSet(set) => set.fmt(f),
            Self::FeatureRange(range) => range.fmt(f),
            Self::FeatureConjunction(conj) => conj.fmt(f),
            Self::Boolean(value) => write!(f, "{value}"),
        }
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    op: &str,
    children: &[Predicate],
    needs_parens: impl Fn(&Predicate) -> bool,
) -> fmt::Result {
    if children.is_empty() {
        return write!(f, "{op}()");
    }
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, " {op} ")?;
        }
        if needs_parens(child) {
            write!(f, "({child})")?;
        } else {
            write!(f, "{child}")?;
        }
    }
    Ok(())
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in [", self.key)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{value}'")?;
        }
        f.write_str("]")
    }
}

impl fmt::Display for FeatureRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in range[", self.key)?;
        let labels = self
            .partitions
            .iter()
            .map(|p| format!("'{}'", p.label))
            .chain(
                self.edge_partitions
                    .iter()
                    .map(|e| format!("'{}'@{}{}", e.label, e.value, e.bounds)),
            );
        for (i, label) in labels.enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&label)?;
        }
        f.write_str("]")
    }
}

impl fmt::Display for EdgeBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtLeast(n) => write!(f, ">={n}"),
            Self::AtMost(n) => write!(f, "<={n}"),
            Self::Between { lower, upper } => write!(f, "[{lower}..{upper}]"),
        }
    }
}

impl fmt::Display for FeatureConjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("conjunction(")?;
        for (i, (key, value)) in self.operands.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key} = '{value}'")?;
        }
        f.write_str(")")
    }
}
