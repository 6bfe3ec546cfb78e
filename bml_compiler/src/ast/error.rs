//! Errors raised while turning the element tree into pattern nodes

use crate::expression::ExpressionError;
use crate::logging::codes;
use crate::utils::Span;
use thiserror::Error;

pub type AstResult<T> = Result<T, FormatError>;

/// Markup that is well-formed but not a pattern document
#[derive(Debug, Clone, Error)]
pub enum FormatError {
    #[error("Root element must be <{expected}>, found <{found}> at {span}")]
    WrongRootElement {
        expected: &'static str,
        found: String,
        span: Span,
    },

    #[error("Unknown element <{name}> at {span}")]
    UnknownElement { name: String, span: Span },

    #[error("Invalid type '{value}' on <{element}> at {span}")]
    InvalidTypeQualifier {
        element: String,
        value: String,
        span: Span,
    },

    #[error("Invalid orientation '{value}' at {span}")]
    InvalidOrientation { value: String, span: Span },

    #[error("Label of {length} characters exceeds {max_length} at {span}")]
    LabelTooLong {
        length: usize,
        max_length: usize,
        span: Span,
    },

    #[error("Invalid expression in <{element}> at {span}: {error}")]
    InvalidExpression {
        element: String,
        span: Span,
        #[source]
        error: ExpressionError,
    },
}

impl FormatError {
    pub fn unknown_element(name: &str, span: Span) -> Self {
        Self::UnknownElement {
            name: name.to_string(),
            span,
        }
    }

    pub fn invalid_type(element: &str, value: &str, span: Span) -> Self {
        Self::InvalidTypeQualifier {
            element: element.to_string(),
            value: value.to_string(),
            span,
        }
    }

    pub fn error_code(&self) -> codes::Code {
        match self {
            Self::WrongRootElement { .. } => codes::ast::WRONG_ROOT_ELEMENT,
            Self::UnknownElement { .. } => codes::ast::UNKNOWN_ELEMENT,
            Self::InvalidTypeQualifier { .. } => codes::ast::INVALID_TYPE_QUALIFIER,
            Self::InvalidOrientation { .. } => codes::ast::INVALID_ORIENTATION,
            Self::LabelTooLong { .. } => codes::references::LABEL_TOO_LONG,
            Self::InvalidExpression { error, .. } => error.error_code(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::WrongRootElement { span, .. }
            | Self::UnknownElement { span, .. }
            | Self::InvalidTypeQualifier { span, .. }
            | Self::InvalidOrientation { span, .. }
            | Self::LabelTooLong { span, .. }
            | Self::InvalidExpression { span, .. } => *span,
        }
    }
}
