//! Validation report types: structured diagnostics plus the aggregated
//! report the checks feed into.

use canopy_graph::{Edge, NodeId};
use serde::Serialize;
use std::fmt;

/// The invariant a diagnostic reports against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// Terminal with no incoming edge.
    OrphanTerminal,
    /// Terminal with more than one incoming edge.
    ReentrantTerminal,
    /// Top-level unit that is neither the root nor a linkage node.
    ExtraRoot,
    /// A node was reached again while still on the traversal path.
    Cycle,
    /// Unit with more than one non-remote, non-linkage incoming edge.
    MultipleIncoming,
    /// Punctuation-tagged edge and punctuation-unit child disagree.
    PunctuationEdgeMismatch,
    /// Punctuation unit and punctuation-terminal child disagree.
    PunctuationNodeMismatch,
}

/// One invariant violation. The message is the human-readable form;
/// kind and node support programmatic consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// The offending node, where one node is clearly at fault.
    pub node: Option<NodeId>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Aggregated validation result. Re-running `validate` on an unchanged
/// passage yields an identical report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub findings: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// The diagnostic messages in report order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.findings.iter().map(|d| d.message.as_str())
    }

    /// Findings of one kind, for targeted assertions.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.findings.iter().filter(move |d| d.kind == kind)
    }
}

/// Comma-join edges for diagnostic messages.
pub(crate) fn join_edges<'a>(edges: impl IntoIterator<Item = &'a Edge>) -> String {
    edges
        .into_iter()
        .map(Edge::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
