use crate::{
    FeatureConjunction, FeatureHash, Z_STAR_FEATURE, hash_feature, hash_key, hash_label,
    z_star_hash,
};

#[test]
fn feature_hash_is_pinned() {
    // Stored postings depend on these exact values.
    assert_eq!(hash_feature("color", "red").as_u64(), 0x12d4_3430_132e_22bf);
    assert_eq!(z_star_hash().as_u64(), 0xe25a_41ae_1c82_6f6f);
    assert_eq!(hash_key("age").as_u64(), 0x8fde_5e53_74b3_f5a2);
}

#[test]
fn conjunction_id_is_pinned() {
    let conj = FeatureConjunction::new([("a", "1"), ("b", "2")]);
    assert_eq!(conj.id().as_u64(), 0xcdf6_7d8a_bb92_302e);
}

#[test]
fn feature_hash_is_label_hash() {
    assert_eq!(hash_feature("color", "red"), hash_label("color=red"));
    assert_eq!(hash_key("age"), hash_label("age"));
    assert_eq!(z_star_hash(), hash_label(Z_STAR_FEATURE));
}

#[test]
fn distinct_values_hash_differently() {
    assert_ne!(hash_feature("color", "red"), hash_feature("color", "blue"));
    assert_ne!(hash_feature("color", "red"), hash_feature("colour", "red"));
    assert_ne!(hash_key("age"), hash_feature("age", ""));
}

#[test]
fn conjunction_id_ignores_operand_order() {
    let left = FeatureConjunction::new([("a", "1"), ("b", "2")]);
    let right = FeatureConjunction::new([("b", "2"), ("a", "1")]);
    assert_eq!(left, right);
    assert_eq!(left.id(), right.id());
}

#[test]
fn conjunction_id_is_framed() {
    // Without length framing these would concatenate to the same bytes.
    let left = FeatureConjunction::new([("ab", "c")]);
    let right = FeatureConjunction::new([("a", "bc")]);
    assert_ne!(left.id(), right.id());
}

#[test]
fn raw_roundtrip() {
    let hash = FeatureHash::from_raw(0xdead_beef);
    assert_eq!(hash.as_u64(), 0xdead_beef);
    assert_eq!(hash.to_string(), "0x00000000deadbeef");
}
