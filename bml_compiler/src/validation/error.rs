//! Error types for structural validation

use crate::ast::NodeKind;
use crate::logging::codes;
use crate::reference_resolution::ReferenceError;
use crate::utils::Span;
use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// `<fire>` with neither a `<bullet>` nor a resolvable `<bulletRef>`
    #[error("<fire> without a bullet description at {span}")]
    MissingBulletDescription { span: Span },

    /// Action-like node with no parent outside the document root
    #[error("<{kind}> has no parent node at {span}")]
    OrphanedAction { kind: NodeKind, span: Span },

    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

impl ValidationError {
    pub fn error_code(&self) -> codes::Code {
        match self {
            Self::MissingBulletDescription { .. } => codes::validation::MISSING_BULLET_DESCRIPTION,
            Self::OrphanedAction { .. } => codes::validation::ORPHANED_ACTION,
            Self::Reference(error) => error.error_code(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::MissingBulletDescription { span } | Self::OrphanedAction { span, .. } => *span,
            Self::Reference(error) => error.span(),
        }
    }
}
