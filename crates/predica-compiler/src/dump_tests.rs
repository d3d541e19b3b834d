use predica_core::{EdgeBounds, FeatureRange, FeatureSet, Predicate};

use crate::test_utils::{dump_annotated, fs};
use crate::{annotate, dump};

#[test]
fn negated_conjunction_child() {
    let p = Predicate::and([fs("a", "1"), Predicate::not(fs("b", "1"))]);

    insta::assert_snapshot!(dump_annotated(&p), @r"
    min_feature: 2
    interval_end: 3
    [intervals]
    a=1: [1..1]
    b=1: [2..2]
    z-star: z1[1..2]
    ");
}

#[test]
fn all_sections() {
    let range = FeatureRange::new("age")
        .with_partition("age=20-29")
        .with_edge("age=30", 30, EdgeBounds::AtMost(4));
    let p = Predicate::and([
        Predicate::range(range),
        Predicate::conjunction_of([("b", "2"), ("a", "1")]),
    ]);

    insta::assert_snapshot!(dump_annotated(&p), @r"
    min_feature: 2
    interval_end: 2
    [intervals]
    age=20-29: [1..1]
    [bounds]
    age=30: [1..1] bounds=0x80000004
    [conjunctions]
    conjunction(a = '1', b = '2'): [2..2]
    ");
}

#[test]
fn unknown_hash_prints_hex() {
    let annotations = annotate(&fs("color", "red")).unwrap();

    insta::assert_snapshot!(dump(&annotations, &fs("size", "xl")), @r"
    min_feature: 1
    interval_end: 1
    [intervals]
    0x12d43430132e22bf: [1..1]
    ");
}

#[test]
fn empty_sections_are_omitted() {
    let p = Predicate::FeatureSet(FeatureSet::new("k", Vec::<String>::new()));

    insta::assert_snapshot!(dump_annotated(&p), @r"
    min_feature: 0
    interval_end: 1
    ");
}
