//! Indented rendering of a predicate tree, optionally annotated with
//! analyzer sizes and annotator assignments.

use std::fmt::Write;

use predica_core::Predicate;

use crate::analyze::{AnalyzerResult, NodeIdGen};
use crate::annotate::AssignmentRecorder;

pub struct PredicatePrinter<'a> {
    root: &'a Predicate,
    sizes: Option<&'a AnalyzerResult>,
    assignments: Option<&'a AssignmentRecorder>,
}

impl<'a> PredicatePrinter<'a> {
    pub fn new(root: &'a Predicate) -> Self {
        Self {
            root,
            sizes: None,
            assignments: None,
        }
    }

    /// Show the tree size on the root and subtree sizes on conjunction children.
    pub fn with_sizes(mut self, analysis: &'a AnalyzerResult) -> Self {
        self.sizes = Some(analysis);
        self
    }

    /// Show each node's inbound range and the intervals each leaf registered.
    pub fn with_assignments(mut self, recorder: &'a AssignmentRecorder) -> Self {
        self.assignments = Some(recorder);
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let mut ids = NodeIdGen::default();
        self.format_node(self.root, 0, &mut ids, w)
    }

    fn format_node(
        &self,
        node: &Predicate,
        depth: usize,
        ids: &mut NodeIdGen,
        w: &mut impl Write,
    ) -> std::fmt::Result {
        let id = ids.claim();

        write!(w, "{:width$}", "", width = depth * 2)?;
        match node {
            Predicate::Conjunction(_) => w.write_str("and")?,
            Predicate::Disjunction(_) => w.write_str("or")?,
            Predicate::Negation(_) => w.write_str("not")?,
            leaf => write!(w, "{leaf}")?,
        }

        if let Some(analysis) = self.sizes {
            let size = if depth == 0 {
                Some(analysis.tree_size)
            } else {
                analysis.sub_tree_sizes.get(&id).copied()
            };
            if let Some(size) = size {
                write!(w, " size={size}")?;
            }
        }

        if let Some(assignment) = self.assignments.and_then(|r| r.get(id)) {
            write!(w, " [{}..{}]", assignment.begin, assignment.end)?;
            if assignment.negated {
                w.write_str(" negated")?;
            }
            for (i, interval) in assignment.intervals.iter().enumerate() {
                w.write_str(if i == 0 { " => " } else { ", " })?;
                write!(w, "{interval}")?;
            }
        }

        writeln!(w)?;

        for child in node.children() {
            self.format_node(child, depth + 1, ids, w)?;
        }
        Ok(())
    }
}
