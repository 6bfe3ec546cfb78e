//! Error types for the task interpreter

use bml_compiler::ast::{NodeId, NodeKind};
use bml_compiler::logging::{codes, Code};
use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Failures while building a task tree
///
/// None of these happen for a validated pattern driven by a correct host;
/// they indicate an engine defect or a pathological pattern.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    #[error("Internal error: <{kind}> {node} was never resolved")]
    Internal { kind: NodeKind, node: NodeId },

    #[error("Task tree exceeds {limit} tasks")]
    TaskLimitExceeded { limit: usize },

    #[error("Reference expansion deeper than {limit} at {node}")]
    ReferenceDepthExceeded { node: NodeId, limit: usize },
}

impl RuntimeError {
    pub fn unresolved(kind: NodeKind, node: NodeId) -> Self {
        Self::Internal { kind, node }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Internal { .. } => codes::runtime::UNRESOLVED_AT_RUNTIME,
            Self::TaskLimitExceeded { .. } | Self::ReferenceDepthExceeded { .. } => {
                codes::runtime::TASK_LIMIT_EXCEEDED
            }
        }
    }
}
