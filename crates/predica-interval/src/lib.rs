//! Packed interval format for Predica.
//!
//! This crate contains the interval encoding shared by the compiler, which
//! produces intervals, and the index, which stores and matches them.

pub mod interval;


pub use interval::{Interval, IntervalError, IntervalKind, IntervalWithBounds, MAX_SLOT};
