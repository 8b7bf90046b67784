use crate::passage::{Layer, NodeId};

/// All errors that can be raised while assembling or ingesting a
/// passage. Shape errors are caught here, before the algorithms run;
/// a built [`crate::Passage`] is structurally addressable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A node id string does not parse as `<layer>.<index>`.
    #[error("invalid node id '{raw}': expected <layer>.<index>")]
    InvalidNodeId { raw: String },

    /// A node with this id was already added.
    #[error("duplicate node id {id}")]
    DuplicateNode { id: NodeId },

    /// The node id's layer does not match the kind being inserted.
    #[error("node {id} does not belong to layer {expected}")]
    LayerMismatch { id: NodeId, expected: Layer },

    /// An edge endpoint references a node that was never added.
    #[error("edge references unknown node {id}")]
    UnknownEndpoint { id: NodeId },

    /// The passage has no root node at the top of the foliage layer.
    #[error("passage '{passage}' has no root node")]
    MissingRoot { passage: String },

    /// A passage document is missing a required field or has the wrong
    /// shape at the given field.
    #[error("passage document field '{field}' is missing or malformed")]
    MalformedDocument { field: String },
}
