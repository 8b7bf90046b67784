//! canopy-graph: layered semantic-graph passage model.
//!
//! A passage is one annotated unit: a terminal layer of token nodes
//! under a foliage layer of structural units, connected by tagged
//! directed edges with bounded reentrancy via remote edges.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`Passage`] -- the immutable node+edge set for one annotated unit
//! - [`PassageBuilder`] -- shape-checked construction
//! - [`from_json`] / [`to_json`] -- interchange document loading
//! - [`GraphError`] -- ingestion error type
//! - Graph types: [`Node`], [`Edge`], [`NodeId`], [`NodeKind`],
//!   [`UnitTag`], [`Layer`]

pub mod builder;
pub mod error;
pub mod json;
pub mod passage;

pub use builder::PassageBuilder;
pub use error::GraphError;
pub use json::{from_json, to_json};
pub use passage::{
    tags, Edge, EdgeId, Layer, Node, NodeId, NodeKind, Passage, ROOT_ID, UnitTag,
};
