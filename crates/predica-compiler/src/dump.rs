//! Human-readable listing of annotation maps.
//!
//! Hashes are resolved back to labels using the tree that produced the
//! annotations. Hashes the tree does not mention print in hex.

use std::collections::HashMap;
use std::fmt::{Display, Write};

use predica_core::{
    ConjunctionId, FeatureHash, Predicate, Z_STAR_FEATURE, hash_feature, hash_label, z_star_hash,
};

use crate::annotate::PredicateTreeAnnotations;

pub fn dump(annotations: &PredicateTreeAnnotations, root: &Predicate) -> String {
    let mut out = String::new();
    format(annotations, root, &mut out).expect("String write never fails");
    out
}

fn format(
    annotations: &PredicateTreeAnnotations,
    root: &Predicate,
    w: &mut impl Write,
) -> std::fmt::Result {
    let labels = Labels::collect(root);

    writeln!(w, "min_feature: {}", annotations.min_feature)?;
    writeln!(w, "interval_end: {}", annotations.interval_end)?;

    if !annotations.interval_map.is_empty() {
        writeln!(w, "[intervals]")?;
        for (hash, intervals) in &annotations.interval_map {
            write_entry(w, labels.feature(*hash), intervals)?;
        }
    }

    if !annotations.bounds_map.is_empty() {
        writeln!(w, "[bounds]")?;
        for (hash, bounds) in &annotations.bounds_map {
            write_entry(w, labels.feature(*hash), bounds)?;
        }
    }

    if !annotations.feature_conjunctions.is_empty() {
        writeln!(w, "[conjunctions]")?;
        for (id, intervals) in &annotations.feature_conjunctions {
            write_entry(w, labels.conjunction(*id), intervals)?;
        }
    }

    Ok(())
}

fn write_entry<T: Display>(w: &mut impl Write, label: String, items: &[T]) -> std::fmt::Result {
    write!(w, "{label}:")?;
    for (i, item) in items.iter().enumerate() {
        w.write_str(if i == 0 { " " } else { ", " })?;
        write!(w, "{item}")?;
    }
    writeln!(w)
}

struct Labels {
    features: HashMap<FeatureHash, String>,
    conjunctions: HashMap<ConjunctionId, String>,
}

impl Labels {
    fn collect(root: &Predicate) -> Self {
        let mut labels = Self {
            features: HashMap::new(),
            conjunctions: HashMap::new(),
        };
        labels
            .features
            .insert(z_star_hash(), Z_STAR_FEATURE.to_owned());
        labels.visit(root);
        labels
    }

    fn visit(&mut self, node: &Predicate) {
        match node {
            Predicate::FeatureSet(set) => {
                for value in &set.values {
                    self.features
                        .insert(hash_feature(&set.key, value), format!("{}={value}", set.key));
                }
            }
            Predicate::FeatureRange(range) => {
                let labels = range
                    .partitions
                    .iter()
                    .map(|p| &p.label)
                    .chain(range.edge_partitions.iter().map(|e| &e.label));
                for label in labels {
                    self.features.insert(hash_label(label), label.clone());
                }
            }
            Predicate::FeatureConjunction(conj) => {
                self.conjunctions.insert(conj.id(), conj.to_string());
            }
            _ => {
                for child in node.children() {
                    self.visit(child);
                }
            }
        }
    }

    fn feature(&self, hash: FeatureHash) -> String {
        self.features
            .get(&hash)
            .cloned()
            .unwrap_or_else(|| hash.to_string())
    }

    fn conjunction(&self, id: ConjunctionId) -> String {
        self.conjunctions
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}
