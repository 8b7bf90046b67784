//! Reference action application.
//!
//! The oracle only decides; applying an action to the parser state and
//! the partially built passage is the applier's job. This is the
//! deterministic reference used by training pipelines and by the
//! round-trip tests: replaying a full oracle sequence from the initial
//! state reconstructs a passage isomorphic to the input.

use canopy_graph::{
    tags, GraphError, NodeId, NodeKind, Passage, PassageBuilder, ROOT_ID, UnitTag,
};

use crate::action::Action;
use crate::oracle::{Oracle, OracleConfig, OracleError};
use crate::state::ParserState;

/// Errors raised while applying actions. Like the oracle's, these are
/// contract violations: a gold sequence applied in order never hits
/// them.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// The action needs a buffer front but the buffer is empty.
    #[error("{action} with an empty buffer")]
    EmptyBuffer { action: String },

    /// The action needs a stack top but the stack is empty.
    #[error("{action} with an empty stack")]
    EmptyStack { action: String },

    /// A swap asked for more elements than sit under the stack top.
    #[error("swap distance {distance} exceeds stack depth {depth}")]
    SwapTooDeep { distance: usize, depth: usize },

    /// The parse exceeded its step bound without finishing; the input
    /// passage is not reconstructible.
    #[error("parse stalled after {steps} steps")]
    Stalled { steps: usize },
}

/// Owns the parser state and the passage under reconstruction, and
/// mutates both by applying actions.
pub struct Applier {
    builder: PassageBuilder,
    state: ParserState,
}

impl Applier {
    /// Start a parse of the given passage: root and terminals
    /// pre-created, empty stack, all terminals in the buffer.
    pub fn new(source: &Passage) -> Result<Self, ReplayError> {
        let mut builder = PassageBuilder::new(source.id.clone());
        builder.insert_unit(ROOT_ID, UnitTag::Unit, false)?;
        for terminal in source.terminals() {
            if let NodeKind::Terminal { text, punct } = &terminal.kind {
                builder.insert_terminal(terminal.id, text.clone(), *punct)?;
            }
        }
        Ok(Applier {
            builder,
            state: ParserState::initial(source),
        })
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Apply one action to the state and the passage under
    /// construction.
    pub fn apply(&mut self, action: &Action) -> Result<(), ReplayError> {
        match action {
            Action::Shift => {
                let front = self.buffer_front(action)?;
                self.state.buffer.pop_front();
                self.state.stack.push(front);
            }
            Action::Reduce => {
                self.stack_top(action)?;
                self.state.stack.pop();
            }
            Action::Node { tag, node } => {
                let front = self.buffer_front(action)?;
                self.builder.insert_unit(*node, UnitTag::Unit, false)?;
                self.builder.add_edge(*node, front, tag.clone())?;
                self.state.buffer.push_front(*node);
            }
            Action::Root { tag } => {
                let top = self.stack_top(action)?;
                self.builder.add_edge(ROOT_ID, top, tag.clone())?;
            }
            Action::Implicit { tag, node } => {
                let top = self.stack_top(action)?;
                self.builder.insert_unit(*node, UnitTag::Unit, true)?;
                self.builder.add_edge(top, *node, tag.clone())?;
            }
            Action::LeftEdge { tag } => {
                let (top, front) = self.both(action)?;
                self.builder.add_edge(front, top, tag.clone())?;
            }
            Action::RightEdge { tag } => {
                let (top, front) = self.both(action)?;
                self.builder.add_edge(top, front, tag.clone())?;
            }
            Action::LeftRemote { tag } => {
                let (top, front) = self.both(action)?;
                self.builder.add_remote_edge(front, top, tag.clone())?;
            }
            Action::RightRemote { tag } => {
                let (top, front) = self.both(action)?;
                self.builder.add_remote_edge(top, front, tag.clone())?;
            }
            Action::Swap { distance } => {
                let moved = distance.unwrap_or(1) as usize;
                let top = self.stack_top(action)?;
                self.state.stack.pop();
                let depth = self.state.stack.len();
                if moved > depth {
                    return Err(ReplayError::SwapTooDeep {
                        distance: moved,
                        depth,
                    });
                }
                let tail: Vec<_> = self.state.stack.split_off(depth - moved);
                self.state.stack.push(top);
                for id in tail.into_iter().rev() {
                    self.state.buffer.push_front(id);
                }
            }
            Action::Wrap => {
                let drained: Vec<_> = self.state.stack.drain(..).collect();
                for id in drained {
                    self.state.buffer.push_back(id);
                }
            }
            Action::Finish => {}
        }
        Ok(())
    }

    /// Close the parse and return the reconstructed passage. Unit tags
    /// that are only knowable from attachment categories are derived
    /// here: punctuation parents and linkage units.
    pub fn finish(self) -> Result<Passage, ReplayError> {
        // The builder cannot know a unit is punctuation or linkage at
        // creation time; the incoming U edge or outgoing LR/LA edges
        // arrive later.
        let passage = self.builder.build()?;
        let mut rebuilt = PassageBuilder::new(passage.id.clone());
        for node in passage.nodes() {
            match &node.kind {
                NodeKind::Terminal { text, punct } => {
                    rebuilt.insert_terminal(node.id, text.clone(), *punct)?;
                }
                NodeKind::Unit { implicit, .. } => {
                    let punct_parent = node
                        .incoming
                        .iter()
                        .any(|&eid| passage.edge(eid).tag == tags::PUNCTUATION);
                    let links = node.outgoing.iter().any(|&eid| {
                        let tag = passage.edge(eid).tag.as_str();
                        tag == tags::LINK_RELATION || tag == tags::LINK_ARGUMENT
                    });
                    let tag = if punct_parent {
                        UnitTag::Punctuation
                    } else if links {
                        UnitTag::Linkage
                    } else {
                        UnitTag::Unit
                    };
                    rebuilt.insert_unit(node.id, tag, *implicit)?;
                }
            }
        }
        for eid in passage.edge_ids() {
            let edge = passage.edge(eid);
            if edge.remote {
                rebuilt.add_remote_edge(edge.parent, edge.child, edge.tag.clone())?;
            } else {
                rebuilt.add_edge(edge.parent, edge.child, edge.tag.clone())?;
            }
        }
        Ok(rebuilt.build()?)
    }

    fn buffer_front(&self, action: &Action) -> Result<NodeId, ReplayError> {
        self.state
            .buffer_front()
            .ok_or_else(|| ReplayError::EmptyBuffer {
                action: action.to_string(),
            })
    }

    fn stack_top(&self, action: &Action) -> Result<NodeId, ReplayError> {
        self.state
            .stack_top()
            .ok_or_else(|| ReplayError::EmptyStack {
                action: action.to_string(),
            })
    }

    fn both(&self, action: &Action) -> Result<(NodeId, NodeId), ReplayError> {
        Ok((self.stack_top(action)?, self.buffer_front(action)?))
    }
}

/// Drive oracle and applier from the initial state until FINISH and
/// return the reconstructed passage together with the action sequence.
///
/// The step bound is quadratic in the passage size; a well-formed
/// passage finishes well inside it, so hitting the bound means the
/// input is not reconstructible (for instance a unit unreachable from
/// the terminals).
pub fn replay(
    source: &Passage,
    config: OracleConfig,
) -> Result<(Passage, Vec<Action>), ReplayError> {
    let mut oracle = Oracle::new(source, config);
    let mut applier = Applier::new(source)?;
    let mut actions = Vec::new();

    let size = source.node_count() + source.edge_count() + 2;
    let limit = size * size;

    loop {
        let action = oracle.get_action(applier.state())?;
        applier.apply(&action)?;
        let done = action == Action::Finish;
        actions.push(action);
        if done {
            break;
        }
        if actions.len() >= limit {
            return Err(ReplayError::Stalled {
                steps: actions.len(),
            });
        }
    }
    Ok((applier.finish()?, actions))
}
