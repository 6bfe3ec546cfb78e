//! Reference Resolution
//!
//! Binds `bulletRef`, `actionRef` and `fireRef` nodes to the labelled
//! definition they name. Lookup always starts at the document root and the
//! result is memoized on the reference node, so task-tree construction never
//! searches the tree again.

pub mod error;

pub use error::{ReferenceError, ReferenceResult};

use crate::ast::{NodeId, PatternTree};
use crate::log_debug;

/// Resolve one reference node, reusing an earlier result when present
pub fn resolve(tree: &mut PatternTree, id: NodeId) -> ReferenceResult<NodeId> {
    let node = tree.node(id);
    if let Some(target) = node.resolved() {
        return Ok(target);
    }

    let target_kind = node.kind.referenced_kind().ok_or(ReferenceError::NotAReference {
        kind: node.kind,
        span: node.span,
    })?;
    let label = node.label().ok_or(ReferenceError::MissingLabel {
        reference: node.kind,
        span: node.span,
    })?;

    let target = tree
        .find_label_node(tree.root(), label, target_kind)
        .ok_or_else(|| ReferenceError::unresolved(node.kind, label, target_kind, node.span))?;

    log_debug!("Reference resolved",
        "reference" => node.kind,
        "label" => label,
        "target" => target
    );

    tree.node_mut(id).resolved = Some(target);
    Ok(target)
}

/// Resolved target of an already validated reference node
pub fn referenced(tree: &PatternTree, id: NodeId) -> Option<NodeId> {
    tree.get(id).and_then(|node| node.resolved())
}
