//! A loaded, validated pattern

use crate::ast::{NodeId, NodeKind, Orientation, PatternTree};
use crate::config::constants::compile_time::references::{MAX_NUMBERED_ENTRY_POINTS, TOP_LABEL};
use serde::Serialize;
use std::path::PathBuf;

/// Validated pattern tree plus document metadata
///
/// Immutable once loaded. Share it behind an `Arc` between every entity
/// driven by the pattern.
#[derive(Debug, Clone, Serialize)]
pub struct Pattern {
    tree: PatternTree,
    orientation: Orientation,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<PathBuf>,
}

impl Pattern {
    pub(crate) fn new(tree: PatternTree, orientation: Orientation) -> Self {
        Self {
            tree,
            orientation,
            filename: None,
        }
    }

    pub(crate) fn with_filename(mut self, filename: PathBuf) -> Self {
        self.filename = Some(filename);
        self
    }

    pub fn tree(&self) -> &PatternTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn filename(&self) -> Option<&std::path::Path> {
        self.filename.as_deref()
    }

    /// The `top` action alone, otherwise every `top1`..`top9` found, in order
    pub fn entry_points(&self) -> Vec<NodeId> {
        let root = self.tree.root();
        if let Some(top) = self.tree.find_label_node(root, TOP_LABEL, NodeKind::Action) {
            return vec![top];
        }

        (1..=MAX_NUMBERED_ENTRY_POINTS)
            .filter_map(|n| {
                let label = format!("{}{}", TOP_LABEL, n);
                self.tree.find_label_node(root, &label, NodeKind::Action)
            })
            .collect()
    }

    pub fn pattern_name(&self, id: NodeId) -> Option<&str> {
        self.tree.pattern_name(id)
    }

    /// Memoized target of a reference node
    pub fn referenced(&self, id: NodeId) -> Option<NodeId> {
        crate::reference_resolution::referenced(&self.tree, id)
    }

    /// Bullet description a fire node spawns
    pub fn bullet_of(&self, fire: NodeId) -> Option<NodeId> {
        self.tree.get(fire).and_then(|node| node.bullet_description())
    }
}
