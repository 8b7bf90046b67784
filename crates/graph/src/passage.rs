//! Shared passage types for the canopy toolkit.
//!
//! These types are produced by the builder and consumed by the oracle
//! and the validator. They live here so that both algorithms can import
//! them without depending on ingestion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::GraphError;

// ──────────────────────────────────────────────
// Layers and identifiers
// ──────────────────────────────────────────────

/// Annotation layer a node belongs to. The terminal layer holds one
/// node per input token; the foliage layer holds the structural units
/// built over them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Terminal,
    Foliage,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Terminal => write!(f, "0"),
            Layer::Foliage => write!(f, "1"),
        }
    }
}

/// Stable composite node key: layer plus a local index, rendered as
/// `"0.3"` or `"1.1"`. Ids are how edges reference their endpoints --
/// nodes never hold owning pointers to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    pub layer: Layer,
    pub index: u32,
}

/// Id of the designated root node, the top of the foliage layer.
pub const ROOT_ID: NodeId = NodeId {
    layer: Layer::Foliage,
    index: 1,
};

impl NodeId {
    pub fn terminal(index: u32) -> Self {
        NodeId {
            layer: Layer::Terminal,
            index,
        }
    }

    pub fn unit(index: u32) -> Self {
        NodeId {
            layer: Layer::Foliage,
            index,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.layer, self.index)
    }
}

impl FromStr for NodeId {
    type Err = GraphError;

    fn from_str(raw: &str) -> Result<Self, GraphError> {
        let invalid = || GraphError::InvalidNodeId {
            raw: raw.to_string(),
        };
        let (layer, index) = raw.split_once('.').ok_or_else(invalid)?;
        let layer = match layer {
            "0" => Layer::Terminal,
            "1" => Layer::Foliage,
            _ => return Err(invalid()),
        };
        let index: u32 = index.parse().map_err(|_| invalid())?;
        Ok(NodeId { layer, index })
    }
}

impl Serialize for NodeId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ──────────────────────────────────────────────
// Edge categories
// ──────────────────────────────────────────────

/// Edge categories of the annotation scheme. Tags are open strings on
/// [`Edge`]; the constants here are the ones the algorithms and the
/// validator special-case, plus the common categories used in fixtures.
pub mod tags {
    pub const PARALLEL_SCENE: &str = "H";
    pub const PARTICIPANT: &str = "A";
    pub const PROCESS: &str = "P";
    pub const STATE: &str = "S";
    pub const ADVERBIAL: &str = "D";
    pub const CENTER: &str = "C";
    pub const ELABORATOR: &str = "E";
    pub const FUNCTION: &str = "F";
    pub const CONNECTOR: &str = "N";
    pub const RELATOR: &str = "R";
    /// Relation of a linkage unit to the scenes it links.
    pub const LINK_RELATION: &str = "LR";
    pub const LINK_ARGUMENT: &str = "LA";
    /// Attaches a punctuation unit to its parent.
    pub const PUNCTUATION: &str = "U";
    /// Attaches a terminal to the unit that covers it.
    pub const TERMINAL: &str = "T";
}

// ──────────────────────────────────────────────
// Nodes and edges
// ──────────────────────────────────────────────

/// Index into a passage's edge arena.
pub type EdgeId = usize;

/// Directed tagged edge from a parent unit to a child node. Endpoints
/// are ids resolved through the owning [`Passage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub parent: NodeId,
    pub child: NodeId,
    pub tag: String,
    /// A remote edge is a secondary parent link; the child has its
    /// primary, non-remote parent elsewhere.
    pub remote: bool,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.remote { "*" } else { "" };
        write!(f, "{}->{} [{}{}]", self.parent, self.child, self.tag, marker)
    }
}

/// Tag of a foliage-layer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitTag {
    /// Ordinary structural unit.
    Unit,
    /// Coordination node permitted beside the root at the top level.
    Linkage,
    /// Unit grouping punctuation terminals.
    Punctuation,
}

impl fmt::Display for UnitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitTag::Unit => write!(f, "unit"),
            UnitTag::Linkage => write!(f, "linkage"),
            UnitTag::Punctuation => write!(f, "punctuation"),
        }
    }
}

/// What a node is: a terminal anchored to one token, or a structural
/// unit (possibly implicit, i.e. with no textual anchor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Terminal { text: String, punct: bool },
    Unit { tag: UnitTag, implicit: bool },
}

/// One node of a passage. The outgoing list is owned; incoming is the
/// back-reference index maintained by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub outgoing: Vec<EdgeId>,
    pub incoming: Vec<EdgeId>,
}

impl Node {
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, NodeKind::Terminal { .. })
    }

    /// True for a punctuation terminal (not a punctuation unit).
    pub fn is_punct_terminal(&self) -> bool {
        matches!(self.kind, NodeKind::Terminal { punct: true, .. })
    }

    pub fn is_implicit(&self) -> bool {
        matches!(self.kind, NodeKind::Unit { implicit: true, .. })
    }

    pub fn unit_tag(&self) -> Option<UnitTag> {
        match self.kind {
            NodeKind::Unit { tag, .. } => Some(tag),
            NodeKind::Terminal { .. } => None,
        }
    }

    /// Short description used in diagnostics: the unit tag, or the
    /// terminal kind ("word"/"punct").
    pub fn describe(&self) -> String {
        match &self.kind {
            NodeKind::Terminal { punct: true, .. } => "punct".to_string(),
            NodeKind::Terminal { punct: false, .. } => "word".to_string(),
            NodeKind::Unit { tag, .. } => tag.to_string(),
        }
    }
}

// ──────────────────────────────────────────────
// Passage
// ──────────────────────────────────────────────

/// One fully annotated unit: the terminal and foliage node sets plus
/// the edge arena. Immutable once built; the oracle and validator only
/// read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    pub id: String,
    pub(crate) nodes: BTreeMap<NodeId, Node>,
    pub(crate) edges: Vec<Edge>,
}

impl Passage {
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn layer_nodes(&self, layer: Layer) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.id.layer == layer)
    }

    /// Terminal nodes in token order.
    pub fn terminals(&self) -> impl Iterator<Item = &Node> {
        self.layer_nodes(Layer::Terminal)
    }

    pub fn units(&self) -> impl Iterator<Item = &Node> {
        self.layer_nodes(Layer::Foliage)
    }

    /// Top-level foliage nodes: units with no incoming edges.
    pub fn heads(&self) -> impl Iterator<Item = &Node> {
        self.units().filter(|n| n.incoming.is_empty())
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.get(&ROOT_ID)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        0..self.edges.len()
    }

    /// Edge tuples `(parent, tag, child, remote)` sorted for
    /// order-insensitive comparison of two passages.
    pub fn sorted_edges(&self) -> Vec<(NodeId, String, NodeId, bool)> {
        let mut out: Vec<_> = self
            .edges
            .iter()
            .map(|e| (e.parent, e.tag.clone(), e.child, e.remote))
            .collect();
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_roundtrips_through_display() {
        let id: NodeId = "1.12".parse().unwrap();
        assert_eq!(id, NodeId::unit(12));
        assert_eq!(id.to_string(), "1.12");
        assert_eq!("0.3".parse::<NodeId>().unwrap(), NodeId::terminal(3));
    }

    #[test]
    fn node_id_rejects_malformed() {
        assert!("2.1".parse::<NodeId>().is_err());
        assert!("1".parse::<NodeId>().is_err());
        assert!("1.x".parse::<NodeId>().is_err());
        assert!("".parse::<NodeId>().is_err());
    }

    #[test]
    fn node_id_orders_terminals_before_units() {
        assert!(NodeId::terminal(99) < NodeId::unit(1));
        assert!(NodeId::unit(1) < NodeId::unit(2));
    }

    #[test]
    fn node_id_serde_as_string() {
        let id = NodeId::unit(4);
        assert_eq!(serde_json::to_value(id).unwrap(), serde_json::json!("1.4"));
        let back: NodeId = serde_json::from_value(serde_json::json!("1.4")).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn edge_display_marks_remote() {
        let edge = Edge {
            parent: NodeId::unit(2),
            child: NodeId::unit(5),
            tag: tags::PARTICIPANT.to_string(),
            remote: true,
        };
        assert_eq!(edge.to_string(), "1.2->1.5 [A*]");
    }
}
