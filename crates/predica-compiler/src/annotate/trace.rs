//! Observation hooks for interval assignment.
//!
//! The annotator is generic over a [`Tracer`]. With [`NoopTracer`] every
//! hook is an empty inline function and compiles away; no tracing state
//! lives in the annotator itself. [`AssignmentRecorder`] keeps a preorder
//! log of every node's inbound range and the intervals each leaf registered,
//! which is what the printer and the property tests consume.

use predica_core::Predicate;
use predica_interval::Interval;

use crate::analyze::NodeId;

pub trait Tracer {
    /// Called when a node receives its inbound range, before its children.
    fn trace_assign(&mut self, id: NodeId, node: &Predicate, begin: u32, end: u32, negated: bool);

    /// Called for every interval a leaf registers, Z-star intervals included.
    fn trace_register(&mut self, id: NodeId, interval: Interval);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_assign(&mut self, _: NodeId, _: &Predicate, _: u32, _: u32, _: bool) {}

    #[inline(always)]
    fn trace_register(&mut self, _: NodeId, _: Interval) {}
}

/// Inbound range of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub id: NodeId,
    pub kind: &'static str,
    pub begin: u32,
    pub end: u32,
    pub negated: bool,
    /// Intervals registered by this node, in registration order. Empty for
    /// compound nodes.
    pub intervals: Vec<Interval>,
}

/// Records every assignment in visiting (preorder) order.
#[derive(Debug, Clone, Default)]
pub struct AssignmentRecorder {
    pub assignments: Vec<Assignment>,
}

impl AssignmentRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assignment of a node, if it was visited.
    pub fn get(&self, id: NodeId) -> Option<&Assignment> {
        self.assignments
            .get(id.as_u32() as usize)
            .filter(|a| a.id == id)
    }
}

impl Tracer for AssignmentRecorder {
    fn trace_assign(&mut self, id: NodeId, node: &Predicate, begin: u32, end: u32, negated: bool) {
        self.assignments.push(Assignment {
            id,
            kind: node.kind_name(),
            begin,
            end,
            negated,
            intervals: Vec::new(),
        });
    }

    fn trace_register(&mut self, id: NodeId, interval: Interval) {
        // Leaves register right after their own assignment.
        if let Some(last) = self.assignments.last_mut()
            && last.id == id
        {
            last.intervals.push(interval);
        }
    }
}
