//! Depth-first walk from the heads: cycle detection plus the per-unit
//! checks that need the traversal's reachability (single primary
//! parent, punctuation consistency).
//!
//! The walk keeps two sets: `visited` holds nodes fully processed and
//! never re-expanded; `in_path` holds the current ancestry and shrinks
//! on backtrack. Only meeting an `in_path` node means a real cycle --
//! meeting a `visited` one is ordinary reentrancy.

use std::collections::BTreeSet;

use canopy_graph::{tags, Node, NodeId, Passage, UnitTag};

use crate::report::{join_edges, Diagnostic, DiagnosticKind};

pub fn check_traversal(passage: &Passage) -> Vec<Diagnostic> {
    let mut findings = Vec::new();
    let mut visited: BTreeSet<NodeId> = BTreeSet::new();
    let mut in_path: BTreeSet<NodeId> = BTreeSet::new();
    let mut path: Vec<NodeId> = Vec::new();

    for head in passage.heads() {
        if !visited.contains(&head.id) {
            dfs(
                passage,
                head.id,
                &mut visited,
                &mut in_path,
                &mut path,
                &mut findings,
            );
        }
    }
    findings
}

fn dfs(
    passage: &Passage,
    id: NodeId,
    visited: &mut BTreeSet<NodeId>,
    in_path: &mut BTreeSet<NodeId>,
    path: &mut Vec<NodeId>,
    findings: &mut Vec<Diagnostic>,
) {
    path.push(id);
    in_path.insert(id);

    if let Some(node) = passage.node(id) {
        if !node.is_terminal() {
            check_unit(passage, node, findings);
        }
        for &eid in &node.outgoing {
            let child = passage.edge(eid).child;
            if in_path.contains(&child) {
                let rendered: Vec<String> = path.iter().map(NodeId::to_string).collect();
                findings.push(Diagnostic {
                    kind: DiagnosticKind::Cycle,
                    node: Some(child),
                    message: format!("cycle detected ({})", rendered.join("->")),
                });
            } else if !visited.contains(&child) {
                dfs(passage, child, visited, in_path, path, findings);
            }
        }
    }

    in_path.remove(&id);
    visited.insert(id);
    path.pop();
}

/// Per-unit checks, run once when the traversal first reaches the unit.
fn check_unit(passage: &Passage, node: &Node, findings: &mut Vec<Diagnostic>) {
    // A unit may be reached through several remote or linkage edges,
    // but must have a single primary parent.
    let primary: Vec<_> = node
        .incoming
        .iter()
        .map(|&eid| passage.edge(eid))
        .filter(|e| !e.remote && e.tag != tags::LINK_RELATION && e.tag != tags::LINK_ARGUMENT)
        .collect();
    if primary.len() > 1 {
        findings.push(Diagnostic {
            kind: DiagnosticKind::MultipleIncoming,
            node: Some(node.id),
            message: format!(
                "multiple incoming non-remote ({})",
                join_edges(primary.iter().copied())
            ),
        });
    }

    let node_is_punct = node.unit_tag() == Some(UnitTag::Punctuation);
    for &eid in &node.outgoing {
        let edge = passage.edge(eid);
        let Some(child) = passage.node(edge.child) else {
            continue;
        };
        let edge_is_punct = edge.tag == tags::PUNCTUATION;
        let child_is_punct_unit = child.unit_tag() == Some(UnitTag::Punctuation);
        if edge_is_punct != child_is_punct_unit {
            findings.push(Diagnostic {
                kind: DiagnosticKind::PunctuationEdgeMismatch,
                node: Some(child.id),
                message: format!("{} edge ({}) with {} child", edge.tag, edge, child.describe()),
            });
        }
        if node_is_punct != child.is_punct_terminal() {
            findings.push(Diagnostic {
                kind: DiagnosticKind::PunctuationNodeMismatch,
                node: Some(node.id),
                message: format!(
                    "{} node ({}) with {} child ({})",
                    node.describe(),
                    node.id,
                    child.describe(),
                    child.id
                ),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_graph::{PassageBuilder, UnitTag};

    #[test]
    fn cycle_is_reported_with_its_path() {
        let mut b = PassageBuilder::new("p");
        let root = b.add_root().unwrap();
        let a = b.add_unit(UnitTag::Unit, false); // 1.2
        let bb = b.add_unit(UnitTag::Unit, false); // 1.3
        let c = b.add_unit(UnitTag::Unit, false); // 1.4
        b.add_edge(root, a, tags::PARALLEL_SCENE).unwrap();
        b.add_edge(a, bb, tags::ELABORATOR).unwrap();
        b.add_edge(bb, c, tags::CENTER).unwrap();
        b.add_edge(c, a, tags::ELABORATOR).unwrap();
        let passage = b.build().unwrap();

        let findings = check_traversal(&passage);
        let cycles: Vec<_> = findings
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Cycle)
            .collect();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].message, "cycle detected (1.1->1.2->1.3->1.4)");
        assert!(cycles[0].message.contains("1.2->1.3->1.4"));
    }

    #[test]
    fn reentrancy_through_remote_edges_is_not_a_cycle() {
        let mut b = PassageBuilder::new("p");
        let root = b.add_root().unwrap();
        let scene_a = b.add_unit(UnitTag::Unit, false);
        let scene_b = b.add_unit(UnitTag::Unit, false);
        let shared = b.add_unit(UnitTag::Unit, false);
        b.add_edge(root, scene_a, tags::PARALLEL_SCENE).unwrap();
        b.add_edge(root, scene_b, tags::PARALLEL_SCENE).unwrap();
        b.add_edge(scene_a, shared, tags::PARTICIPANT).unwrap();
        b.add_remote_edge(scene_b, shared, tags::PARTICIPANT).unwrap();
        let passage = b.build().unwrap();

        assert!(check_traversal(&passage).is_empty());
    }

    #[test]
    fn second_primary_parent_is_reported() {
        let mut b = PassageBuilder::new("p");
        let root = b.add_root().unwrap();
        let scene_a = b.add_unit(UnitTag::Unit, false); // 1.2
        let scene_b = b.add_unit(UnitTag::Unit, false); // 1.3
        let shared = b.add_unit(UnitTag::Unit, false); // 1.4
        b.add_edge(root, scene_a, tags::PARALLEL_SCENE).unwrap();
        b.add_edge(root, scene_b, tags::PARALLEL_SCENE).unwrap();
        b.add_edge(scene_a, shared, tags::PARTICIPANT).unwrap();
        b.add_edge(scene_b, shared, tags::PARTICIPANT).unwrap();
        let passage = b.build().unwrap();

        let findings = check_traversal(&passage);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, DiagnosticKind::MultipleIncoming);
        assert_eq!(
            findings[0].message,
            "multiple incoming non-remote (1.2->1.4 [A], 1.3->1.4 [A])"
        );
    }

    #[test]
    fn linkage_edges_do_not_count_as_primary_parents() {
        let mut b = PassageBuilder::new("p");
        let root = b.add_root().unwrap();
        let scene = b.add_unit(UnitTag::Unit, false);
        let link = b.add_unit(UnitTag::Linkage, false);
        b.add_edge(root, scene, tags::PARALLEL_SCENE).unwrap();
        b.add_edge(link, scene, tags::LINK_ARGUMENT).unwrap();
        let passage = b.build().unwrap();

        assert!(check_traversal(&passage).is_empty());
    }

    #[test]
    fn punctuation_edge_requires_punctuation_unit_child() {
        let mut b = PassageBuilder::new("p");
        let root = b.add_root().unwrap();
        let plain = b.add_unit(UnitTag::Unit, false); // 1.2
        b.add_edge(root, plain, tags::PUNCTUATION).unwrap();
        let passage = b.build().unwrap();

        let findings = check_traversal(&passage);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, DiagnosticKind::PunctuationEdgeMismatch);
        assert_eq!(findings[0].message, "U edge (1.1->1.2 [U]) with unit child");
    }

    #[test]
    fn punctuation_unit_requires_punctuation_terminals() {
        let mut b = PassageBuilder::new("p");
        let root = b.add_root().unwrap();
        let punct = b.add_unit(UnitTag::Punctuation, false); // 1.2
        let word = b.add_terminal("word", false);
        b.add_edge(root, punct, tags::PUNCTUATION).unwrap();
        b.add_edge(punct, word, tags::TERMINAL).unwrap();
        let passage = b.build().unwrap();

        let findings = check_traversal(&passage);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, DiagnosticKind::PunctuationNodeMismatch);
        assert_eq!(
            findings[0].message,
            "punctuation node (1.2) with word child (0.1)"
        );
    }

    #[test]
    fn punctuation_terminal_under_plain_unit_is_reported() {
        let mut b = PassageBuilder::new("p");
        let root = b.add_root().unwrap();
        let plain = b.add_unit(UnitTag::Unit, false); // 1.2
        let stop = b.add_terminal(".", true);
        b.add_edge(root, plain, tags::PARALLEL_SCENE).unwrap();
        b.add_edge(plain, stop, tags::TERMINAL).unwrap();
        let passage = b.build().unwrap();

        let findings = check_traversal(&passage);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, DiagnosticKind::PunctuationNodeMismatch);
        assert_eq!(findings[0].message, "unit node (1.2) with punct child (0.1)");
    }

    #[test]
    fn well_formed_punctuation_is_clean() {
        let mut b = PassageBuilder::new("p");
        let root = b.add_root().unwrap();
        let scene = b.add_unit(UnitTag::Unit, false);
        let punct = b.add_unit(UnitTag::Punctuation, false);
        let word = b.add_terminal("go", false);
        let stop = b.add_terminal(".", true);
        b.add_edge(root, scene, tags::PARALLEL_SCENE).unwrap();
        b.add_edge(root, punct, tags::PUNCTUATION).unwrap();
        b.add_edge(scene, word, tags::TERMINAL).unwrap();
        b.add_edge(punct, stop, tags::TERMINAL).unwrap();
        let passage = b.build().unwrap();

        assert!(check_traversal(&passage).is_empty());
    }
}
