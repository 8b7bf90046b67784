//! Passage interchange JSON.
//!
//! The main entry point is [`from_json`], which takes a
//! `&serde_json::Value` document and produces a [`Passage`] through the
//! builder (so every shape check applies). [`to_json`] writes the same
//! document form back out.
//!
//! Document shape:
//!
//! ```json
//! {
//!   "id": "passage-120",
//!   "nodes": [
//!     {"id": "0.1", "text": "dogs", "punct": false},
//!     {"id": "1.1", "tag": "unit"},
//!     {"id": "1.2", "tag": "unit", "implicit": false}
//!   ],
//!   "edges": [
//!     {"parent": "1.1", "child": "1.2", "tag": "H"},
//!     {"parent": "1.2", "child": "0.1", "tag": "T", "remote": false}
//!   ]
//! }
//! ```
//!
//! The node's layer comes from its id prefix: terminal entries carry
//! `text`/`punct`, unit entries carry `tag`/`implicit`. Unknown fields
//! are ignored for forward compatibility.

use serde_json::Value;

use crate::builder::PassageBuilder;
use crate::error::GraphError;
use crate::passage::{Layer, NodeId, NodeKind, Passage, UnitTag};

/// Load a passage from an interchange JSON document.
pub fn from_json(doc: &Value) -> Result<Passage, GraphError> {
    let id = required_str(doc, "id")?;
    let mut builder = PassageBuilder::new(id);

    let nodes = doc
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("nodes"))?;
    for entry in nodes {
        let node_id: NodeId = required_str(entry, "nodes[].id")?.parse()?;
        match node_id.layer {
            Layer::Terminal => {
                let text = required_str(entry, "nodes[].text")?;
                let punct = optional_bool(entry, "punct");
                builder.insert_terminal(node_id, text, punct)?;
            }
            Layer::Foliage => {
                let tag = parse_unit_tag(entry)?;
                let implicit = optional_bool(entry, "implicit");
                builder.insert_unit(node_id, tag, implicit)?;
            }
        }
    }

    let edges = doc
        .get("edges")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("edges"))?;
    for entry in edges {
        let parent: NodeId = required_str(entry, "edges[].parent")?.parse()?;
        let child: NodeId = required_str(entry, "edges[].child")?.parse()?;
        let tag = required_str(entry, "edges[].tag")?;
        if optional_bool(entry, "remote") {
            builder.add_remote_edge(parent, child, tag)?;
        } else {
            builder.add_edge(parent, child, tag)?;
        }
    }

    builder.build()
}

/// Write a passage back to its interchange JSON document. Nodes come
/// out in id order and edges in arena order, so output is stable.
pub fn to_json(passage: &Passage) -> Value {
    let nodes: Vec<Value> = passage
        .nodes()
        .map(|node| match &node.kind {
            NodeKind::Terminal { text, punct } => serde_json::json!({
                "id": node.id,
                "text": text,
                "punct": punct,
            }),
            NodeKind::Unit { tag, implicit } => serde_json::json!({
                "id": node.id,
                "tag": tag,
                "implicit": implicit,
            }),
        })
        .collect();

    let edges: Vec<Value> = passage
        .edge_ids()
        .map(|eid| {
            let edge = passage.edge(eid);
            serde_json::json!({
                "parent": edge.parent,
                "child": edge.child,
                "tag": &edge.tag,
                "remote": edge.remote,
            })
        })
        .collect();

    serde_json::json!({
        "id": &passage.id,
        "nodes": nodes,
        "edges": edges,
    })
}

// ── Parsing helpers ─────────────────────────────────────────────────

fn malformed(field: &str) -> GraphError {
    GraphError::MalformedDocument {
        field: field.to_string(),
    }
}

fn required_str(obj: &Value, field: &str) -> Result<String, GraphError> {
    let key = field.rsplit('.').next().unwrap_or(field);
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| malformed(field))
}

fn optional_bool(obj: &Value, field: &str) -> bool {
    obj.get(field).and_then(Value::as_bool).unwrap_or(false)
}

fn parse_unit_tag(entry: &Value) -> Result<UnitTag, GraphError> {
    match entry.get("tag").and_then(Value::as_str) {
        None | Some("unit") => Ok(UnitTag::Unit),
        Some("linkage") => Ok(UnitTag::Linkage),
        Some("punctuation") => Ok(UnitTag::Punctuation),
        Some(_) => Err(malformed("nodes[].tag")),
    }
}
