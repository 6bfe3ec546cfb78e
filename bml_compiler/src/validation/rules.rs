//! Kind-specific validation rules

use super::error::{ValidationError, ValidationResult};
use crate::ast::{NodeId, NodeKind, PatternTree};
use crate::reference_resolution::resolve;

/// Counters gathered during one validation walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub nodes_validated: usize,
    pub references_resolved: usize,
    pub fires_bound: usize,
}

pub struct Validator<'t> {
    tree: &'t mut PatternTree,
    stats: ValidationStats,
}

impl<'t> Validator<'t> {
    pub fn new(tree: &'t mut PatternTree) -> Self {
        Self {
            tree,
            stats: ValidationStats::default(),
        }
    }

    pub fn run(mut self) -> ValidationResult<ValidationStats> {
        let root = self.tree.root();
        self.validate_node(root)?;
        Ok(self.stats)
    }

    fn validate_node(&mut self, id: NodeId) -> ValidationResult<()> {
        self.stats.nodes_validated += 1;

        match self.tree.node(id).kind {
            NodeKind::Action => {
                self.bind_parent_repeat(id)?;
                self.validate_children(id)
            }
            NodeKind::ActionRef => {
                self.bind_parent_repeat(id)?;
                self.validate_children(id)?;
                self.resolve(id)
            }
            // Arguments only; the referenced fire is validated where it is defined
            NodeKind::FireRef => self.resolve(id),
            NodeKind::Fire => {
                self.validate_children(id)?;
                self.bind_bullet(id)
            }
            NodeKind::BulletRef => {
                self.validate_children(id)?;
                self.resolve(id)
            }
            _ => self.validate_children(id),
        }
    }

    fn validate_children(&mut self, id: NodeId) -> ValidationResult<()> {
        let children = self.tree.children(id).to_vec();
        for child in children {
            self.validate_node(child)?;
        }
        Ok(())
    }

    fn resolve(&mut self, id: NodeId) -> ValidationResult<()> {
        resolve(self.tree, id)?;
        self.stats.references_resolved += 1;
        Ok(())
    }

    /// Only a direct `<repeat>` parent counts
    fn bind_parent_repeat(&mut self, id: NodeId) -> ValidationResult<()> {
        let node = self.tree.node(id);
        let parent = node.parent.ok_or(ValidationError::OrphanedAction {
            kind: node.kind,
            span: node.span,
        })?;

        if self.tree.node(parent).kind == NodeKind::Repeat {
            self.tree.node_mut(id).parent_repeat = Some(parent);
        }
        Ok(())
    }

    fn bind_bullet(&mut self, id: NodeId) -> ValidationResult<()> {
        let bullet = match self.tree.get_child(id, NodeKind::Bullet) {
            Some(bullet) => Some(bullet),
            None => self
                .tree
                .get_child(id, NodeKind::BulletRef)
                .and_then(|reference| self.tree.node(reference).resolved()),
        };

        let bullet = bullet.ok_or(ValidationError::MissingBulletDescription {
            span: self.tree.node(id).span,
        })?;

        self.tree.node_mut(id).bullet_description = Some(bullet);
        self.stats.fires_bound += 1;
        Ok(())
    }
}
