//! Node arena with structural queries

use super::kind::NodeKind;
use super::node::{Node, NodeId};
use crate::expression::ExpressionContext;
use serde::Serialize;

/// All nodes of one document; the root is always `NodeId(0)`
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatternTree {
    nodes: Vec<Node>,
}

impl PatternTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and link it under its parent
    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(p.0)) {
            parent.children.push(id);
        }
        self.nodes.push(node);
        id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Panics on an id from another tree
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Labelled node of `kind` below `start`
    ///
    /// Every direct child is checked before any grandchild, so top-level
    /// definitions win over nested ones with the same label.
    pub fn find_label_node(&self, start: NodeId, label: &str, kind: NodeKind) -> Option<NodeId> {
        let children = self.children(start);

        children
            .iter()
            .copied()
            .find(|&child| {
                let node = self.node(child);
                node.kind == kind && node.has_label(label)
            })
            .or_else(|| {
                children
                    .iter()
                    .find_map(|&child| self.find_label_node(child, label, kind))
            })
    }

    /// Nearest strict ancestor of `kind`
    pub fn find_parent_node(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            let node = self.node(parent);
            if node.kind == kind {
                return Some(parent);
            }
            current = node.parent;
        }
        None
    }

    /// First direct child of `kind`
    pub fn get_child(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.node(child).kind == kind)
    }

    pub fn children_of_kind(
        &self,
        id: NodeId,
        kind: NodeKind,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.node(child).kind == kind)
    }

    /// Value of the first child of `kind`, 0 when there is none
    pub fn get_child_value(
        &self,
        id: NodeId,
        kind: NodeKind,
        ctx: &mut dyn ExpressionContext,
    ) -> f32 {
        self.get_child(id, kind)
            .map(|child| self.value(child, ctx))
            .unwrap_or(0.0)
    }

    pub fn value(&self, id: NodeId, ctx: &mut dyn ExpressionContext) -> f32 {
        self.node(id).expression.evaluate(ctx)
    }

    /// Own `name`, else the nearest ancestor's
    pub fn pattern_name(&self, id: NodeId) -> Option<&str> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if let Some(name) = node.pattern_name.as_deref() {
                return Some(name);
            }
            current = node.parent;
        }
        None
    }

    /// Pre-order walk from the root
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{Expression, SimpleContext};
    use crate::utils::Span;

    fn add(
        tree: &mut PatternTree,
        kind: NodeKind,
        parent: Option<NodeId>,
        label: Option<&str>,
    ) -> NodeId {
        let mut node = Node::new(kind, parent, Span::dummy());
        node.label = label.map(str::to_string);
        tree.push(node)
    }

    #[test]
    fn test_direct_children_checked_first() {
        let mut tree = PatternTree::new();
        let root = add(&mut tree, NodeKind::Bulletml, None, None);
        let outer = add(&mut tree, NodeKind::Action, Some(root), Some("a"));
        let nested = add(&mut tree, NodeKind::Action, Some(outer), Some("x"));
        let top_level = add(&mut tree, NodeKind::Action, Some(root), Some("x"));

        assert_eq!(tree.find_label_node(root, "x", NodeKind::Action), Some(top_level));
        assert_eq!(tree.find_label_node(outer, "x", NodeKind::Action), Some(nested));
        assert_eq!(tree.find_label_node(root, "x", NodeKind::Bullet), None);
    }

    #[test]
    fn test_parent_and_child_queries() {
        let mut tree = PatternTree::new();
        let root = add(&mut tree, NodeKind::Bulletml, None, None);
        let repeat = add(&mut tree, NodeKind::Repeat, Some(root), None);
        let times = add(&mut tree, NodeKind::Times, Some(repeat), None);
        let action = add(&mut tree, NodeKind::Action, Some(repeat), None);
        let wait = add(&mut tree, NodeKind::Wait, Some(action), None);
        tree.node_mut(times).expression = Expression::parse("2 + $1").unwrap();

        assert_eq!(tree.find_parent_node(wait, NodeKind::Repeat), Some(repeat));
        assert_eq!(tree.find_parent_node(repeat, NodeKind::Repeat), None);
        assert_eq!(tree.get_child(repeat, NodeKind::Action), Some(action));

        let mut ctx = SimpleContext::new(vec![3.0], 0.0, Default::default());
        assert_eq!(tree.get_child_value(repeat, NodeKind::Times, &mut ctx), 5.0);
        assert_eq!(tree.get_child_value(repeat, NodeKind::Speed, &mut ctx), 0.0);
    }

    #[test]
    fn test_pattern_name_inherited() {
        let mut tree = PatternTree::new();
        let root = add(&mut tree, NodeKind::Bulletml, None, None);
        let bullet = add(&mut tree, NodeKind::Bullet, Some(root), None);
        let action = add(&mut tree, NodeKind::Action, Some(bullet), None);
        tree.node_mut(bullet).pattern_name = Some("spark".to_string());

        assert_eq!(tree.pattern_name(action), Some("spark"));
        assert_eq!(tree.pattern_name(root), None);
    }
}
