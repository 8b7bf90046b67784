//! Top-level check: the only units allowed to stand without a parent
//! are the root and linkage nodes.

use canopy_graph::{Passage, UnitTag, ROOT_ID};

use crate::report::{Diagnostic, DiagnosticKind};

pub fn check_heads(passage: &Passage) -> Vec<Diagnostic> {
    passage
        .heads()
        .filter(|n| n.id != ROOT_ID && n.unit_tag() != Some(UnitTag::Linkage))
        .map(|n| Diagnostic {
            kind: DiagnosticKind::ExtraRoot,
            node: Some(n.id),
            message: format!("extra root ({})", n.id),
        })
        .collect()
}
