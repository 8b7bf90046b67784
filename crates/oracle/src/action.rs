//! Parser actions -- the vocabulary the oracle emits and the applier
//! consumes.

use canopy_graph::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One parser action. Each variant carries only the fields meaningful
/// for its kind, so there is no null-field ambiguity in serialized
/// training data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Action {
    /// Advance the buffer front onto the stack.
    Shift,
    /// Pop the stack top; it has no remaining work.
    Reduce,
    /// Materialize a new structural parent over the buffer front.
    Node { tag: String, node: NodeId },
    /// Attach the stack top directly under the root.
    Root { tag: String },
    /// Attach an implicit (textless) child to the stack top without
    /// consuming the buffer.
    Implicit { tag: String, node: NodeId },
    /// Edge from the buffer front to the stack top.
    LeftEdge { tag: String },
    /// Edge from the stack top to the buffer front.
    RightEdge { tag: String },
    /// Remote variant of [`Action::LeftEdge`].
    LeftRemote { tag: String },
    /// Remote variant of [`Action::RightEdge`].
    RightRemote { tag: String },
    /// Reorder the stack to resolve crossing structure. The distance is
    /// present only under compound swap; a plain swap always moves one
    /// element.
    Swap { distance: Option<u32> },
    /// Cycle stack contents back to the buffer for another pass.
    Wrap,
    /// Terminal action: the parse is complete.
    Finish,
}

impl Action {
    /// The edge tag carried by the action, if its kind has one.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Action::Node { tag, .. }
            | Action::Root { tag }
            | Action::Implicit { tag, .. }
            | Action::LeftEdge { tag }
            | Action::RightEdge { tag }
            | Action::LeftRemote { tag }
            | Action::RightRemote { tag } => Some(tag),
            _ => None,
        }
    }

    /// The node the action materializes, if its kind has one.
    pub fn target(&self) -> Option<NodeId> {
        match self {
            Action::Node { node, .. } | Action::Implicit { node, .. } => Some(*node),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift => write!(f, "SHIFT"),
            Action::Reduce => write!(f, "REDUCE"),
            Action::Node { tag, node } => write!(f, "NODE-{}({})", tag, node),
            Action::Root { tag } => write!(f, "ROOT-{}", tag),
            Action::Implicit { tag, node } => write!(f, "IMPLICIT-{}({})", tag, node),
            Action::LeftEdge { tag } => write!(f, "LEFT-EDGE-{}", tag),
            Action::RightEdge { tag } => write!(f, "RIGHT-EDGE-{}", tag),
            Action::LeftRemote { tag } => write!(f, "LEFT-REMOTE-{}", tag),
            Action::RightRemote { tag } => write!(f, "RIGHT-REMOTE-{}", tag),
            Action::Swap { distance: None } => write!(f, "SWAP"),
            Action::Swap {
                distance: Some(d),
            } => write!(f, "SWAP-{}", d),
            Action::Wrap => write!(f, "WRAP"),
            Action::Finish => write!(f, "FINISH"),
        }
    }
}
