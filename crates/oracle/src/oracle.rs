//! Transition oracle: derives the gold action sequence that rebuilds an
//! annotated passage incrementally from left to right.
//!
//! The oracle is stateful across calls within one parse. It tracks the
//! structural nodes and edges not yet accounted for by earlier actions,
//! plus the stack pairs already reordered since the last buffer
//! exhaustion. Each `get_action` call must see a parser state consistent
//! with every action returned so far; the oracle reads that state and
//! never mutates it.

use std::collections::BTreeSet;

use canopy_graph::{EdgeId, Node, NodeId, Passage, ROOT_ID};
use serde::Deserialize;

use crate::action::Action;
use crate::state::ParserState;

// ──────────────────────────────────────────────
// Configuration and errors
// ──────────────────────────────────────────────

/// Oracle settings, deserializable from a pipeline manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Allow swap actions that move several stack elements at once.
    /// Disabled, every swap moves exactly one element.
    pub compound_swap: bool,
}

/// Contract violations. The oracle never fails on a well-formed passage
/// driven in order; these are caller bugs and surface loudly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// `get_action` was called again after it returned FINISH.
    #[error("get_action called after FINISH")]
    AlreadyFinished,

    /// The supplied parser state references a node the passage does not
    /// contain -- the state belongs to a different parse.
    #[error("parser state references node {id}, which passage '{passage}' does not contain")]
    UnknownNode { passage: String, id: NodeId },
}

// ──────────────────────────────────────────────
// Oracle
// ──────────────────────────────────────────────

/// Gold-action oracle for one passage. Create one per parse and discard
/// it afterwards; distinct parses are fully independent.
pub struct Oracle<'a> {
    passage: &'a Passage,
    /// Structural nodes not yet materialized by an action. Starts as
    /// every unit except the root and only shrinks.
    nodes_left: BTreeSet<NodeId>,
    /// Edges not yet attached by an action. Starts full and only
    /// shrinks; the parse is complete when it empties.
    edges_left: BTreeSet<EdgeId>,
    /// Unordered stack pairs already reordered since the last wrap.
    swapped: BTreeSet<(NodeId, NodeId)>,
    compound_swap: bool,
    finished: bool,
}

impl<'a> Oracle<'a> {
    pub fn new(passage: &'a Passage, config: OracleConfig) -> Self {
        Oracle {
            nodes_left: passage
                .units()
                .map(|n| n.id)
                .filter(|&id| id != ROOT_ID)
                .collect(),
            edges_left: passage.edge_ids().collect(),
            swapped: BTreeSet::new(),
            compound_swap: config.compound_swap,
            finished: false,
            passage,
        }
    }

    /// Determine the next gold action for the given parser state.
    pub fn get_action(&mut self, state: &ParserState) -> Result<Action, OracleError> {
        let action = self.decide(state)?;
        tracing::debug!(
            action = %action,
            stack = state.stack.len(),
            buffer = state.buffer.len(),
            edges_left = self.edges_left.len(),
            "derived action"
        );
        Ok(action)
    }

    /// Edges not yet attached by a returned action.
    pub fn edges_remaining(&self) -> usize {
        self.edges_left.len()
    }

    /// Structural nodes not yet materialized by a returned action.
    pub fn nodes_remaining(&self) -> usize {
        self.nodes_left.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The decision procedure, evaluated in strict priority order.
    fn decide(&mut self, state: &ParserState) -> Result<Action, OracleError> {
        if self.finished {
            return Err(OracleError::AlreadyFinished);
        }
        if self.edges_left.is_empty() {
            self.finished = true;
            return Ok(Action::Finish);
        }

        if let Some(s_id) = state.stack_top() {
            let s = self.node(s_id)?;
            let touching: Vec<EdgeId> = s
                .incoming
                .iter()
                .chain(s.outgoing.iter())
                .copied()
                .filter(|eid| self.edges_left.contains(eid))
                .collect();
            if touching.is_empty() {
                return Ok(Action::Reduce);
            }
            if let [only] = touching[..] {
                let edge = self.passage.edge(only);
                if edge.parent == ROOT_ID {
                    self.edges_left.remove(&only);
                    return Ok(Action::Root {
                        tag: edge.tag.clone(),
                    });
                }
            }
        }

        let Some(b_id) = state.buffer_front() else {
            // Buffer exhausted: signal a wrap. Pairs swapped during the
            // finished pass may swap again on the next one.
            self.swapped.clear();
            return Ok(Action::Wrap);
        };
        let b = self.node(b_id)?;

        // Materialize a new structural parent over the buffer front.
        // Remote edges never materialize their parent.
        for eid in b.incoming.iter().copied() {
            if !self.edges_left.contains(&eid) {
                continue;
            }
            let edge = self.passage.edge(eid);
            if self.nodes_left.contains(&edge.parent) && !edge.remote {
                self.edges_left.remove(&eid);
                self.nodes_left.remove(&edge.parent);
                return Ok(Action::Node {
                    tag: edge.tag.clone(),
                    node: edge.parent,
                });
            }
        }

        if let Some(s_id) = state.stack_top() {
            let s = self.node(s_id)?;
            for eid in s.outgoing.iter().copied() {
                if !self.edges_left.contains(&eid) {
                    continue;
                }
                let edge = self.passage.edge(eid);
                if edge.child == b_id {
                    self.edges_left.remove(&eid);
                    let tag = edge.tag.clone();
                    return Ok(if edge.remote {
                        Action::RightRemote { tag }
                    } else {
                        Action::RightEdge { tag }
                    });
                }
                if self.is_implicit(edge.child) {
                    self.edges_left.remove(&eid);
                    self.nodes_left.remove(&edge.child);
                    return Ok(Action::Implicit {
                        tag: edge.tag.clone(),
                        node: edge.child,
                    });
                }
            }
            for eid in b.outgoing.iter().copied() {
                if !self.edges_left.contains(&eid) {
                    continue;
                }
                let edge = self.passage.edge(eid);
                if edge.child == s_id {
                    self.edges_left.remove(&eid);
                    let tag = edge.tag.clone();
                    return Ok(if edge.remote {
                        Action::LeftRemote { tag }
                    } else {
                        Action::LeftEdge { tag }
                    });
                }
            }
            let distance = self.check_swap_distance(s_id, state)?;
            if distance > 0 {
                return Ok(Action::Swap {
                    distance: if self.compound_swap {
                        Some(distance)
                    } else {
                        None
                    },
                });
            }
        }

        Ok(Action::Shift)
    }

    /// Check whether a swap is required, and to what distance (how many
    /// stack elements to move back to the buffer).
    ///
    /// Walks down from the element under the stack top. A deeper
    /// element `s2` blocks progress when its unresolved neighbours are
    /// split across stack and buffer; the already-swapped set stops the
    /// same pair from being reordered twice in one pass.
    fn check_swap_distance(
        &mut self,
        s_id: NodeId,
        state: &ParserState,
    ) -> Result<u32, OracleError> {
        let mut distance: usize = 0;
        while state.stack.len() > distance + 1 && (self.compound_swap || distance < 1) {
            let s2_id = state.stack[state.stack.len() - distance - 2];
            let pair = ordered(s_id, s2_id);
            if self.swapped.contains(&pair) {
                break;
            }
            let s2 = self.node(s2_id)?;
            let children: Vec<NodeId> = s2
                .outgoing
                .iter()
                .filter(|eid| self.edges_left.contains(eid))
                .map(|&eid| self.passage.edge(eid).child)
                .collect();
            let parents: Vec<NodeId> = s2
                .incoming
                .iter()
                .filter(|eid| self.edges_left.contains(eid))
                .map(|&eid| self.passage.edge(eid).parent)
                .collect();
            let buffer_has_child = state.buffer.iter().any(|id| children.contains(id));
            let stack_has_child = state.stack.iter().any(|id| children.contains(id));
            let stack_has_parent = state.stack.iter().any(|id| parents.contains(id));
            let buffer_has_parent = state.buffer.iter().any(|id| parents.contains(id));
            // Three-clause disjunction, deliberately asymmetric: a
            // child on the stack with none in the buffer never
            // triggers a swap.
            if (buffer_has_child && !stack_has_child)
                || (stack_has_parent && !buffer_has_parent)
                || (buffer_has_parent && !stack_has_parent)
            {
                self.swapped.insert(pair);
                distance += 1;
            } else {
                break;
            }
        }
        Ok(distance as u32)
    }

    fn node(&self, id: NodeId) -> Result<&'a Node, OracleError> {
        self.passage.node(id).ok_or_else(|| OracleError::UnknownNode {
            passage: self.passage.id.clone(),
            id,
        })
    }

    fn is_implicit(&self, id: NodeId) -> bool {
        self.passage.node(id).map(Node::is_implicit).unwrap_or(false)
    }
}

fn ordered(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
