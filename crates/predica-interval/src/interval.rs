//! Interval packing.
//!
//! Layout of the 64-bit word (low to high):
//!
//! ```text
//! bits  0..16  end
//! bits 16..32  begin
//! bits 32..34  kind tag (0 plain, 1 z-star first, 2 z-star second)
//! bits 34..64  zero
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest slot number an interval boundary can hold.
pub const MAX_SLOT: u16 = u16::MAX;

const END_SHIFT: u32 = 0;
const BEGIN_SHIFT: u32 = 16;
const KIND_SHIFT: u32 = 32;
const FIELD_MASK: u64 = 0xFFFF;
const KIND_MASK: u64 = 0b11;
const USED_BITS: u64 = (1 << 34) - 1;

/// Which matching semantics the index applies to an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum IntervalKind {
    /// Ordinary leaf interval.
    Plain = 0,
    /// First Z-star interval of a negated leaf.
    ZStar1 = 1,
    /// Second Z-star interval, marking a single slot.
    ZStar2 = 2,
}

impl IntervalKind {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Plain),
            1 => Some(Self::ZStar1),
            2 => Some(Self::ZStar2),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntervalError {
    #[error("invalid interval kind tag {0}")]
    InvalidKind(u8),

    #[error("interval word {0:#x} has bits set above the kind tag")]
    StrayBits(u64),
}

/// A `(begin, end)` slot range tagged with its kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u64", try_from = "u64")]
pub struct Interval(u64);

impl Interval {
    #[inline]
    const fn pack(kind: IntervalKind, begin: u16, end: u16) -> Self {
        Self(
            (kind as u64) << KIND_SHIFT
                | (begin as u64) << BEGIN_SHIFT
                | (end as u64) << END_SHIFT,
        )
    }

    /// Plain leaf interval.
    pub const fn from_boundaries(begin: u16, end: u16) -> Self {
        Self::pack(IntervalKind::Plain, begin, end)
    }

    /// First Z-star interval, spanning `begin..=end`.
    pub const fn from_z_star1_boundaries(begin: u16, end: u16) -> Self {
        Self::pack(IntervalKind::ZStar1, begin, end)
    }

    /// Second Z-star interval. Only `end` is meaningful; `begin` mirrors it.
    pub const fn from_z_star2_boundaries(end: u16) -> Self {
        Self::pack(IntervalKind::ZStar2, end, end)
    }

    /// Validate and wrap a stored word.
    pub fn from_raw(raw: u64) -> Result<Self, IntervalError> {
        if raw & !USED_BITS != 0 {
            return Err(IntervalError::StrayBits(raw));
        }
        let tag = ((raw >> KIND_SHIFT) & KIND_MASK) as u8;
        IntervalKind::from_tag(tag).ok_or(IntervalError::InvalidKind(tag))?;
        Ok(Self(raw))
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn begin(self) -> u16 {
        ((self.0 >> BEGIN_SHIFT) & FIELD_MASK) as u16
    }

    #[inline]
    pub const fn end(self) -> u16 {
        ((self.0 >> END_SHIFT) & FIELD_MASK) as u16
    }

    #[inline]
    pub fn kind(self) -> IntervalKind {
        match (self.0 >> KIND_SHIFT) & KIND_MASK {
            0 => IntervalKind::Plain,
            1 => IntervalKind::ZStar1,
            _ => IntervalKind::ZStar2,
        }
    }

    pub fn is_z_star(self) -> bool {
        self.kind() != IntervalKind::Plain
    }
}

impl From<Interval> for u64 {
    fn from(interval: Interval) -> Self {
        interval.0
    }
}

impl TryFrom<u64> for Interval {
    type Error = IntervalError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl fmt::Debug for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interval({self})")
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            IntervalKind::Plain => write!(f, "[{}..{}]", self.begin(), self.end()),
            IntervalKind::ZStar1 => write!(f, "z1[{}..{}]", self.begin(), self.end()),
            IntervalKind::ZStar2 => write!(f, "z2[{}]", self.end()),
        }
    }
}

/// Edge-partition interval together with its verbatim bounds word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntervalWithBounds {
    pub interval: Interval,
    pub bounds: u32,
}

impl IntervalWithBounds {
    pub fn new(interval: Interval, bounds: u32) -> Self {
        Self { interval, bounds }
    }
}

impl fmt::Display for IntervalWithBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bounds={:#010x}", self.interval, self.bounds)
    }
}
