//! Parser state: the stack and buffer the action-applier owns.
//!
//! The oracle only reads this; every mutation happens in the applier
//! (or whatever external component drives the parse).

use canopy_graph::{NodeId, Passage};
use std::collections::VecDeque;

/// Ordered stack and buffer of node references. The stack top is the
/// last element; the buffer front is the next node to be processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserState {
    pub stack: Vec<NodeId>,
    pub buffer: VecDeque<NodeId>,
}

impl ParserState {
    /// Empty stack, empty buffer.
    pub fn new() -> Self {
        ParserState::default()
    }

    /// The canonical starting state for a passage: empty stack, all
    /// terminals in the buffer in token order.
    pub fn initial(passage: &Passage) -> Self {
        ParserState {
            stack: Vec::new(),
            buffer: passage.terminals().map(|n| n.id).collect(),
        }
    }

    pub fn stack_top(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    pub fn buffer_front(&self) -> Option<NodeId> {
        self.buffer.front().copied()
    }
}
