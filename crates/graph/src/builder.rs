//! Passage construction with shape checking.
//!
//! The builder is the only way to obtain a [`Passage`]; it validates
//! endpoint resolution as edges are added and keeps the incoming and
//! outgoing indices consistent, so the algorithms never see a dangling
//! reference.

use std::collections::BTreeMap;

use crate::error::GraphError;
use crate::passage::{Edge, EdgeId, Layer, Node, NodeId, NodeKind, Passage, UnitTag, ROOT_ID};

pub struct PassageBuilder {
    id: String,
    nodes: BTreeMap<NodeId, Node>,
    edges: Vec<Edge>,
    next_terminal: u32,
    next_unit: u32,
}

impl PassageBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        PassageBuilder {
            id: id.into(),
            nodes: BTreeMap::new(),
            edges: Vec::new(),
            next_terminal: 1,
            next_unit: 1,
        }
    }

    /// Create the root unit at the fixed top-of-foliage id.
    pub fn add_root(&mut self) -> Result<NodeId, GraphError> {
        self.insert_unit(ROOT_ID, UnitTag::Unit, false)
    }

    /// Append a terminal with the next free terminal index.
    pub fn add_terminal(&mut self, text: impl Into<String>, punct: bool) -> NodeId {
        while self.nodes.contains_key(&NodeId::terminal(self.next_terminal)) {
            self.next_terminal += 1;
        }
        let id = NodeId::terminal(self.next_terminal);
        self.next_terminal += 1;
        // Cannot fail: the id is free and in the right layer.
        let _ = self.insert_terminal(id, text, punct);
        id
    }

    /// Append a unit with the next free foliage index, skipping the
    /// root slot.
    pub fn add_unit(&mut self, tag: UnitTag, implicit: bool) -> NodeId {
        while NodeId::unit(self.next_unit) == ROOT_ID
            || self.nodes.contains_key(&NodeId::unit(self.next_unit))
        {
            self.next_unit += 1;
        }
        let id = NodeId::unit(self.next_unit);
        self.next_unit += 1;
        let _ = self.insert_unit(id, tag, implicit);
        id
    }

    /// Insert a terminal under an explicit id, as when reproducing an
    /// existing passage.
    pub fn insert_terminal(
        &mut self,
        id: NodeId,
        text: impl Into<String>,
        punct: bool,
    ) -> Result<NodeId, GraphError> {
        if id.layer != Layer::Terminal {
            return Err(GraphError::LayerMismatch {
                id,
                expected: Layer::Terminal,
            });
        }
        self.insert(
            id,
            NodeKind::Terminal {
                text: text.into(),
                punct,
            },
        )
    }

    /// Insert a unit under an explicit id.
    pub fn insert_unit(
        &mut self,
        id: NodeId,
        tag: UnitTag,
        implicit: bool,
    ) -> Result<NodeId, GraphError> {
        if id.layer != Layer::Foliage {
            return Err(GraphError::LayerMismatch {
                id,
                expected: Layer::Foliage,
            });
        }
        self.insert(id, NodeKind::Unit { tag, implicit })
    }

    fn insert(&mut self, id: NodeId, kind: NodeKind) -> Result<NodeId, GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode { id });
        }
        self.nodes.insert(
            id,
            Node {
                id,
                kind,
                outgoing: Vec::new(),
                incoming: Vec::new(),
            },
        );
        Ok(id)
    }

    /// Add a primary edge. Both endpoints must already exist.
    pub fn add_edge(
        &mut self,
        parent: NodeId,
        child: NodeId,
        tag: impl Into<String>,
    ) -> Result<EdgeId, GraphError> {
        self.attach(parent, child, tag.into(), false)
    }

    /// Add a remote edge: a secondary parent link for a child whose
    /// primary parent is elsewhere.
    pub fn add_remote_edge(
        &mut self,
        parent: NodeId,
        child: NodeId,
        tag: impl Into<String>,
    ) -> Result<EdgeId, GraphError> {
        self.attach(parent, child, tag.into(), true)
    }

    fn attach(
        &mut self,
        parent: NodeId,
        child: NodeId,
        tag: String,
        remote: bool,
    ) -> Result<EdgeId, GraphError> {
        // Terminals are leaves: only foliage nodes may parent an edge.
        if parent.layer != Layer::Foliage {
            return Err(GraphError::LayerMismatch {
                id: parent,
                expected: Layer::Foliage,
            });
        }
        if !self.nodes.contains_key(&parent) {
            return Err(GraphError::UnknownEndpoint { id: parent });
        }
        if !self.nodes.contains_key(&child) {
            return Err(GraphError::UnknownEndpoint { id: child });
        }
        let eid = self.edges.len();
        self.edges.push(Edge {
            parent,
            child,
            tag,
            remote,
        });
        // Both lookups succeed: checked above.
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.outgoing.push(eid);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.incoming.push(eid);
        }
        Ok(eid)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn build(self) -> Result<Passage, GraphError> {
        if !self.nodes.contains_key(&ROOT_ID) {
            return Err(GraphError::MissingRoot { passage: self.id });
        }
        Ok(Passage {
            id: self.id,
            nodes: self.nodes,
            edges: self.edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passage::tags;

    #[test]
    fn builds_a_minimal_passage() {
        let mut b = PassageBuilder::new("p1");
        let root = b.add_root().unwrap();
        let scene = b.add_unit(UnitTag::Unit, false);
        let word = b.add_terminal("dogs", false);
        b.add_edge(root, scene, tags::PARALLEL_SCENE).unwrap();
        b.add_edge(scene, word, tags::TERMINAL).unwrap();
        let passage = b.build().unwrap();

        assert_eq!(passage.node_count(), 3);
        assert_eq!(passage.edge_count(), 2);
        assert_eq!(passage.root().unwrap().id, ROOT_ID);
        assert_eq!(passage.terminals().count(), 1);
        assert_eq!(passage.heads().count(), 1);

        let scene_node = passage.node(scene).unwrap();
        assert_eq!(scene_node.incoming.len(), 1);
        assert_eq!(scene_node.outgoing.len(), 1);
        assert_eq!(passage.edge(scene_node.incoming[0]).parent, root);
    }

    #[test]
    fn auto_ids_skip_the_root_slot() {
        let mut b = PassageBuilder::new("p1");
        b.add_root().unwrap();
        let first = b.add_unit(UnitTag::Unit, false);
        assert_eq!(first, NodeId::unit(2));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut b = PassageBuilder::new("p1");
        b.add_root().unwrap();
        let err = b.add_root().unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode { id: ROOT_ID });
    }

    #[test]
    fn rejects_edges_to_unknown_nodes() {
        let mut b = PassageBuilder::new("p1");
        let root = b.add_root().unwrap();
        let err = b
            .add_edge(root, NodeId::terminal(7), tags::TERMINAL)
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownEndpoint {
                id: NodeId::terminal(7)
            }
        );
    }

    #[test]
    fn rejects_terminal_parents() {
        let mut b = PassageBuilder::new("p1");
        b.add_root().unwrap();
        let t1 = b.add_terminal("a", false);
        let t2 = b.add_terminal("b", false);
        let err = b.add_edge(t1, t2, tags::TERMINAL).unwrap_err();
        assert_eq!(
            err,
            GraphError::LayerMismatch {
                id: t1,
                expected: Layer::Foliage
            }
        );
    }

    #[test]
    fn rejects_wrong_layer_inserts() {
        let mut b = PassageBuilder::new("p1");
        assert!(b
            .insert_unit(NodeId::terminal(1), UnitTag::Unit, false)
            .is_err());
        assert!(b.insert_terminal(NodeId::unit(2), "x", false).is_err());
    }

    #[test]
    fn build_requires_a_root() {
        let mut b = PassageBuilder::new("p1");
        b.add_terminal("stray", false);
        let err = b.build().unwrap_err();
        assert_eq!(
            err,
            GraphError::MissingRoot {
                passage: "p1".to_string()
            }
        );
    }

    #[test]
    fn remote_edges_carry_the_flag() {
        let mut b = PassageBuilder::new("p1");
        let root = b.add_root().unwrap();
        let scene_a = b.add_unit(UnitTag::Unit, false);
        let scene_b = b.add_unit(UnitTag::Unit, false);
        let shared = b.add_unit(UnitTag::Unit, false);
        b.add_edge(root, scene_a, tags::PARALLEL_SCENE).unwrap();
        b.add_edge(root, scene_b, tags::PARALLEL_SCENE).unwrap();
        b.add_edge(scene_a, shared, tags::PARTICIPANT).unwrap();
        let remote = b
            .add_remote_edge(scene_b, shared, tags::PARTICIPANT)
            .unwrap();
        let passage = b.build().unwrap();

        assert!(passage.edge(remote).remote);
        assert_eq!(passage.node(shared).unwrap().incoming.len(), 2);
    }

    #[test]
    fn explicit_inserts_accept_unit_tags() {
        let mut b = PassageBuilder::new("p1");
        b.add_root().unwrap();
        let u = b.add_unit(UnitTag::Punctuation, false);
        let passage = b.build().unwrap();
        assert_eq!(
            passage.node(u).unwrap().unit_tag(),
            Some(UnitTag::Punctuation)
        );
    }
}
