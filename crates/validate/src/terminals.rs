//! Terminal attachment checks: every terminal hangs under exactly one
//! parent.

use canopy_graph::{NodeKind, Passage};

use crate::report::{join_edges, Diagnostic, DiagnosticKind};

/// Report terminals with no incoming edge (orphans) and terminals with
/// more than one (reentrant), in token order.
pub fn check_terminals(passage: &Passage) -> Vec<Diagnostic> {
    let mut findings = Vec::new();
    for node in passage.terminals() {
        let text = match &node.kind {
            NodeKind::Terminal { text, .. } => text.as_str(),
            NodeKind::Unit { .. } => continue,
        };
        if node.incoming.is_empty() {
            findings.push(Diagnostic {
                kind: DiagnosticKind::OrphanTerminal,
                node: Some(node.id),
                message: format!("orphan terminal ({}) '{}'", node.id, text),
            });
        } else if node.incoming.len() > 1 {
            let edges = join_edges(node.incoming.iter().map(|&eid| passage.edge(eid)));
            findings.push(Diagnostic {
                kind: DiagnosticKind::ReentrantTerminal,
                node: Some(node.id),
                message: format!("reentrant terminal ({}) '{}'", edges, text),
            });
        }
    }
    findings
}
