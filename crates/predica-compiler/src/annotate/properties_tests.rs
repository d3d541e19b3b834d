use predica_core::{EdgeBounds, FeatureRange, FeatureSet, Predicate};
use predica_interval::{Interval, IntervalKind};
use proptest::prelude::*;

use super::{Annotator, Assignment, AssignmentRecorder, PredicateTreeAnnotations};
use crate::analyze::{Analyzer, AnalyzerResult, NodeId};

const KEYS: [&str; 3] = ["a", "b", "c"];
const VALUES: [&str; 3] = ["x", "y", "z"];

fn arb_key() -> impl Strategy<Value = &'static str> {
    prop::sample::select(KEYS.to_vec())
}

fn arb_value() -> impl Strategy<Value = &'static str> {
    prop::sample::select(VALUES.to_vec())
}

fn arb_leaf() -> impl Strategy<Value = Predicate> {
    prop_oneof![
        4 => (arb_key(), prop::collection::vec(arb_value(), 0..3))
            .prop_map(|(key, values)| Predicate::FeatureSet(FeatureSet::new(key, values))),
        1 => prop::collection::vec((arb_key(), arb_value()), 1..3)
            .prop_map(|operands| Predicate::conjunction_of(operands)),
        1 => arb_value().prop_map(|v| {
            Predicate::range(FeatureRange::new("age").with_partition(format!("age={v}")))
        }),
        1 => (arb_value(), 0u32..16).prop_map(|(v, n)| {
            Predicate::range(FeatureRange::new("age").with_edge(
                format!("age={v}"),
                30,
                EdgeBounds::AtMost(n),
            ))
        }),
    ]
}

fn arb_predicate() -> impl Strategy<Value = Predicate> {
    arb_leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(|children| Predicate::and(children)),
            prop::collection::vec(inner.clone(), 1..4).prop_map(|children| Predicate::or(children)),
            inner.prop_map(Predicate::not),
        ]
    })
}

/// Node in preorder, with the reference size of its subtree.
struct Flat<'p> {
    node: &'p Predicate,
    negated: bool,
    size: u32,
    children: Vec<usize>,
}

fn flatten<'p>(node: &'p Predicate, negated: bool, out: &mut Vec<Flat<'p>>) -> usize {
    let id = out.len();
    out.push(Flat {
        node,
        negated,
        size: 0,
        children: Vec::new(),
    });

    let child_negated = negated ^ matches!(node, Predicate::Negation(_));
    let mut size = 0;
    let mut children = Vec::new();
    for child in node.children() {
        let child_id = flatten(child, child_negated, out);
        size += out[child_id].size;
        children.push(child_id);
    }
    if node.is_leaf() {
        size = if negated { 2 } else { 1 };
    }

    out[id].size = size;
    out[id].children = children;
    id
}

fn flat(root: &Predicate) -> Vec<Flat<'_>> {
    let mut out = Vec::new();
    flatten(root, false, &mut out);
    out
}

/// Leaf count of the cheapest satisfying path, negated leaves free.
fn naive_min(node: &Predicate, negated: bool) -> u32 {
    match node {
        Predicate::Conjunction(children) => children.iter().map(|c| naive_min(c, negated)).sum(),
        Predicate::Disjunction(children) => children
            .iter()
            .map(|c| naive_min(c, negated))
            .min()
            .unwrap_or(0),
        Predicate::Negation(operand) => naive_min(operand, !negated),
        _ if negated => 0,
        _ => 1,
    }
}

fn run(root: &Predicate) -> (AnalyzerResult, AssignmentRecorder, PredicateTreeAnnotations) {
    let analysis = Analyzer::new().analyze(root).unwrap();
    let mut recorder = AssignmentRecorder::new();
    let annotations = Annotator::new()
        .annotate_analyzed(root, &analysis, &mut recorder)
        .unwrap();
    (analysis, recorder, annotations)
}

fn assignment(recorder: &AssignmentRecorder, id: usize) -> &Assignment {
    recorder.get(NodeId::from_raw(id as u32)).unwrap()
}

proptest! {
    #[test]
    fn sizes_match_structure(root in arb_predicate()) {
        let (analysis, _, _) = run(&root);
        let nodes = flat(&root);

        prop_assert_eq!(analysis.tree_size, nodes[0].size);
        prop_assert_eq!(analysis.has_negation, nodes.iter().any(|n| n.node.is_leaf() && n.negated));

        for n in nodes.iter().filter(|n| matches!(n.node, Predicate::Conjunction(_))) {
            let mut sum = 0;
            for &child in &n.children {
                let size = analysis.sub_tree_sizes.get(&NodeId::from_raw(child as u32)).copied();
                prop_assert_eq!(size, Some(nodes[child].size));
                sum += nodes[child].size;
            }
            prop_assert_eq!(sum, n.size);
        }
    }

    #[test]
    fn recorder_visits_preorder(root in arb_predicate()) {
        let (_, recorder, _) = run(&root);
        let nodes = flat(&root);

        prop_assert_eq!(recorder.assignments.len(), nodes.len());
        for (a, n) in recorder.assignments.iter().zip(&nodes) {
            prop_assert_eq!(a.kind, n.node.kind_name());
            prop_assert_eq!(a.negated, n.negated);
        }
    }

    #[test]
    fn conjunction_children_tile_parent(root in arb_predicate()) {
        let (_, recorder, _) = run(&root);
        let nodes = flat(&root);

        for (id, n) in nodes.iter().enumerate() {
            let parent = assignment(&recorder, id);
            match n.node {
                Predicate::Conjunction(_) => {
                    let first = assignment(&recorder, n.children[0]);
                    let last = assignment(&recorder, n.children[n.children.len() - 1]);
                    prop_assert_eq!(first.begin, parent.begin);
                    prop_assert_eq!(last.end, parent.end);

                    for pair in n.children.windows(2) {
                        let prev = assignment(&recorder, pair[0]);
                        let next = assignment(&recorder, pair[1]);
                        prop_assert_eq!(next.begin, prev.end + 1);
                    }

                    let middle = &n.children[1..n.children.len().saturating_sub(1).max(1)];
                    for &child in middle {
                        let a = assignment(&recorder, child);
                        prop_assert_eq!(a.end + 1 - a.begin, nodes[child].size);
                    }
                }
                Predicate::Disjunction(_) | Predicate::Negation(_) => {
                    for &child in &n.children {
                        let a = assignment(&recorder, child);
                        prop_assert_eq!((a.begin, a.end), (parent.begin, parent.end));
                    }
                }
                _ => {}
            }
        }
    }

    #[test]
    fn intervals_stay_in_range(root in arb_predicate()) {
        let (analysis, _, annotations) = run(&root);

        prop_assert_eq!(annotations.interval_end, analysis.tree_size);
        prop_assert_eq!(annotations.min_feature, analysis.min_feature);

        let intervals = annotations
            .interval_map
            .values()
            .chain(annotations.feature_conjunctions.values())
            .flatten()
            .chain(annotations.bounds_map.values().flatten().map(|b| &b.interval));
        for interval in intervals {
            prop_assert!(u32::from(interval.end()) <= annotations.interval_end, "{interval}");
        }
    }

    #[test]
    fn negated_leaves_carry_z_star(root in arb_predicate()) {
        let (_, recorder, annotations) = run(&root);
        let nodes = flat(&root);

        let mut expected_z_star = 0;
        for (id, n) in nodes.iter().enumerate().filter(|(_, n)| n.node.is_leaf()) {
            let a = assignment(&recorder, id);
            let (z_star, own): (Vec<&Interval>, Vec<&Interval>) =
                a.intervals.iter().partition(|i| i.is_z_star());

            for interval in &own {
                prop_assert_eq!(u32::from(interval.begin()), a.begin);
            }

            if !n.negated {
                prop_assert!(z_star.is_empty());
                for interval in &own {
                    prop_assert_eq!(u32::from(interval.end()), a.end);
                }
                continue;
            }

            let first = z_star[0];
            prop_assert_eq!(first.kind(), IntervalKind::ZStar1);
            prop_assert_eq!(u32::from(first.begin()) + 1, a.begin);
            for interval in &own {
                prop_assert_eq!(interval.end(), first.end());
            }

            let needs_second = a.end != u32::from(first.end()) + 1;
            prop_assert_eq!(z_star.len(), if needs_second { 2 } else { 1 });
            if needs_second {
                prop_assert_eq!(z_star[1].kind(), IntervalKind::ZStar2);
                prop_assert_eq!(u32::from(z_star[1].end()), a.end);
            }
            expected_z_star += z_star.len();
        }

        prop_assert_eq!(annotations.z_star_intervals().len(), expected_z_star);
    }

    #[test]
    fn min_feature_bounded_by_naive_count(root in arb_predicate()) {
        let (analysis, _, _) = run(&root);
        let bound = naive_min(&root, false) + u32::from(analysis.has_negation);

        prop_assert!(analysis.min_feature <= bound);
    }

    #[test]
    fn annotation_is_idempotent(root in arb_predicate()) {
        let annotator = Annotator::new();
        prop_assert_eq!(annotator.annotate(&root).unwrap(), annotator.annotate(&root).unwrap());
    }
}
