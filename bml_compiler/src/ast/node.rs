//! Pattern nodes

use super::kind::{NodeKind, NodeType};
use crate::expression::Expression;
use crate::utils::Span;
use serde::Serialize;
use std::fmt;

/// Index of a node inside its [`PatternTree`](super::PatternTree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One element of a pattern document
///
/// Structure is fixed when the tree is built. The link fields at the bottom
/// are filled in once by validation and read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_name: Option<String>,
    #[serde(skip_serializing_if = "Expression::is_empty")]
    pub expression: Expression,
    pub children: Vec<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(skip)]
    pub span: Span,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) resolved: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) bullet_description: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) parent_repeat: Option<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind, parent: Option<NodeId>, span: Span) -> Self {
        Self {
            kind,
            node_type: NodeType::None,
            label: None,
            pattern_name: None,
            expression: Expression::empty(),
            children: Vec::new(),
            parent,
            span,
            resolved: None,
            bullet_description: None,
            parent_repeat: None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.label.as_deref() == Some(label)
    }

    /// Target of a reference node once validated
    pub fn resolved(&self) -> Option<NodeId> {
        self.resolved
    }

    /// Bullet a fire node spawns, inline or through its bulletRef
    pub fn bullet_description(&self) -> Option<NodeId> {
        self.bullet_description
    }

    /// Repeat node directly enclosing an action
    pub fn parent_repeat(&self) -> Option<NodeId> {
        self.parent_repeat
    }
}
