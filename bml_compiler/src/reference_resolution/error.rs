//! Error types for reference resolution

use crate::ast::NodeKind;
use crate::logging::codes;
use crate::utils::Span;
use thiserror::Error;

pub type ReferenceResult<T> = Result<T, ReferenceError>;

#[derive(Debug, Clone, Error)]
pub enum ReferenceError {
    /// No node of the expected kind carries the label
    #[error("Unresolved <{reference}> '{label}': no <{target}> with that label at {span}")]
    Unresolved {
        reference: NodeKind,
        label: String,
        target: NodeKind,
        span: Span,
    },

    #[error("<{reference}> without a label at {span}")]
    MissingLabel { reference: NodeKind, span: Span },

    /// Resolution requested on a node that does not reference anything
    #[error("<{kind}> is not a reference node")]
    NotAReference { kind: NodeKind, span: Span },
}

impl ReferenceError {
    pub fn unresolved(reference: NodeKind, label: &str, target: NodeKind, span: Span) -> Self {
        Self::Unresolved {
            reference,
            label: label.to_string(),
            target,
            span,
        }
    }

    pub fn error_code(&self) -> codes::Code {
        match self {
            Self::Unresolved { .. } | Self::MissingLabel { .. } => {
                codes::references::UNRESOLVED_REFERENCE
            }
            Self::NotAReference { .. } => codes::system::INTERNAL_ERROR,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Unresolved { span, .. }
            | Self::MissingLabel { span, .. }
            | Self::NotAReference { span, .. } => *span,
        }
    }

    /// Label the reference asked for, if any
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Unresolved { label, .. } => Some(label),
            _ => None,
        }
    }
}
