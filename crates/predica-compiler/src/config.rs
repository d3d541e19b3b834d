//! Compilation limits.

use crate::{Error, Result};

/// The deepest accepted tree must fit a 2 MiB thread stack in debug builds.
pub const DEFAULT_RECURSION_FUEL: u32 = 512;

/// Settings shared by the analyzer and the annotator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileConfig {
    /// Maximum tree depth. `None` = unlimited.
    pub recursion_fuel: Option<u32>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            recursion_fuel: Some(DEFAULT_RECURSION_FUEL),
        }
    }
}

impl CompileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set recursion depth limit. None = infinite.
    ///
    /// Recursion fuel restores when exiting recursion. It protects against
    /// deeply nested trees overflowing the stack.
    pub fn with_recursion_fuel(mut self, limit: Option<u32>) -> Self {
        self.recursion_fuel = limit;
        self
    }
}

/// Depth tracking for one recursive walk.
#[derive(Debug)]
pub(crate) struct RecursionFuel {
    depth: u32,
    limit: Option<u32>,
}

impl RecursionFuel {
    pub(crate) fn new(limit: Option<u32>) -> Self {
        Self { depth: 0, limit }
    }

    pub(crate) fn enter(&mut self) -> Result<()> {
        if let Some(limit) = self.limit
            && self.depth >= limit
        {
            return Err(Error::RecursionLimitExceeded);
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
