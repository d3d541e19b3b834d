//! Stable feature identities.
//!
//! The index looks postings up by the same hashes the compiler registers,
//! so these functions are part of the on-disk contract: a digest prefix of
//! a domain-tagged, length-framed SHA-256 envelope. Changing the framing or
//! the domain tags invalidates every stored predicate.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Reserved feature name carrying Z-star intervals of negated leaves.
pub const Z_STAR_FEATURE: &str = "z-star";

const FEATURE_DOMAIN_TAG: &[u8] = b"predica:feature:v1";
const CONJUNCTION_DOMAIN_TAG: &[u8] = b"predica:conjunction:v1";

/// Hash of a feature label (`key=value`, a range key, or a partition label).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureHash(u64);

impl FeatureHash {
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Create from a raw value. Use only for deserialization.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for FeatureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeatureHash({:#018x})", self.0)
    }
}

impl fmt::Display for FeatureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Identity of a feature conjunction, derived from its sorted operand set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConjunctionId(u64);

impl ConjunctionId {
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for ConjunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConjunctionId({:#018x})", self.0)
    }
}

impl fmt::Display for ConjunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Hash an arbitrary feature label.
pub fn hash_label(label: &str) -> FeatureHash {
    let mut hasher = Sha256::new();
    hasher.update(FEATURE_DOMAIN_TAG);
    write_framed(&mut hasher, label.as_bytes());
    FeatureHash(digest_prefix(hasher))
}

/// Hash a discrete feature value, as registered by `FeatureSet` leaves.
pub fn hash_feature(key: &str, value: &str) -> FeatureHash {
    hash_label(&format!("{key}={value}"))
}

/// Hash a bare feature key, as counted by `FeatureRange` leaves.
pub fn hash_key(key: &str) -> FeatureHash {
    hash_label(key)
}

/// The reserved Z-star identity.
pub fn z_star_hash() -> FeatureHash {
    hash_label(Z_STAR_FEATURE)
}

/// Derive a conjunction identity from `(key, value)` operands.
///
/// Operands must be yielded in canonical (sorted, deduplicated) order;
/// `FeatureConjunction` stores them in a `BTreeSet` for that reason.
pub(crate) fn conjunction_id<'a>(
    operands: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> ConjunctionId {
    let mut hasher = Sha256::new();
    hasher.update(CONJUNCTION_DOMAIN_TAG);
    for (key, value) in operands {
        write_framed(&mut hasher, key.as_bytes());
        write_framed(&mut hasher, value.as_bytes());
    }
    ConjunctionId(digest_prefix(hasher))
}

fn write_framed(hasher: &mut Sha256, bytes: &[u8]) {
    let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
    hasher.update(len.to_be_bytes());
    hasher.update(bytes);
}

/// Leading 64 bits of the digest, big-endian.
fn digest_prefix(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}
