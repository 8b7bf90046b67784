//! canopy-oracle: transition-system oracle for canopy passages.
//!
//! Given a fully annotated passage, the oracle derives the unique
//! sequence of parser actions that reconstructs it incrementally from
//! left to right -- the gold supervision a transition-based parser
//! trains on. The crate also carries the reference action applier, so
//! the derived sequences can be replayed and checked end to end.
//!
//! # Public API
//!
//! - [`Oracle`] -- per-parse gold-action derivation
//! - [`Action`] -- the action vocabulary
//! - [`ParserState`] -- caller-owned stack and buffer
//! - [`Applier`] / [`replay`] -- reference action application
//! - [`OracleConfig`] / [`OracleError`] / [`ReplayError`]

pub mod action;
pub mod apply;
pub mod oracle;
pub mod state;

pub use action::Action;
pub use apply::{replay, Applier, ReplayError};
pub use oracle::{Oracle, OracleConfig, OracleError};
pub use state::ParserState;
