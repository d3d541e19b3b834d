//! Test helpers.

use predica_core::Predicate;

use crate::{Analyzer, Annotator, AssignmentRecorder, PredicatePrinter, dump};

/// Single-value feature set leaf.
pub fn fs(key: &str, value: &str) -> Predicate {
    Predicate::feature_set(key, [value])
}

/// `depth` nested compounds, alternating and/or, over one leaf.
pub fn compound_chain(depth: usize) -> Predicate {
    (0..depth).fold(fs("a", "1"), |p, i| {
        if i % 2 == 0 {
            Predicate::and([p])
        } else {
            Predicate::or([p])
        }
    })
}

/// Tree rendered with sizes and assignments.
pub fn print_annotated(root: &Predicate) -> String {
    let analysis = Analyzer::new().analyze(root).expect("valid predicate");
    let mut recorder = AssignmentRecorder::new();
    Annotator::new()
        .annotate_analyzed(root, &analysis, &mut recorder)
        .expect("valid predicate");
    PredicatePrinter::new(root)
        .with_sizes(&analysis)
        .with_assignments(&recorder)
        .dump()
}

/// Annotation maps of a tree, labels resolved.
pub fn dump_annotated(root: &Predicate) -> String {
    let annotations = Annotator::new().annotate(root).expect("valid predicate");
    dump(&annotations, root)
}
