//! canopy-validate: structural validator for canopy passages.
//!
//! Checks a passage against the well-formedness invariants of the
//! annotation scheme and reports every violation as data -- nothing
//! here is fatal; the caller decides whether to reject the passage.
//! Validation is a pure read of the passage: running it twice yields
//! identical reports, and it is safe to run before every parse.
//!
//! Checks, in report order:
//!
//! - every terminal has exactly one incoming edge
//! - top-level units are the root or linkage nodes
//! - the reachable graph is acyclic (remote edges included)
//! - every reachable unit has a single primary parent
//! - punctuation edges, units, and terminals agree

pub mod heads;
pub mod report;
pub mod terminals;
pub mod traversal;

pub use report::{Diagnostic, DiagnosticKind, ValidationReport};

use canopy_graph::Passage;

/// Run every check and aggregate the findings.
pub fn validate(passage: &Passage) -> ValidationReport {
    let mut findings = Vec::new();
    findings.extend(terminals::check_terminals(passage));
    findings.extend(heads::check_heads(passage));
    findings.extend(traversal::check_traversal(passage));
    tracing::debug!(
        passage = %passage.id,
        findings = findings.len(),
        "validation finished"
    );
    ValidationReport { findings }
}
