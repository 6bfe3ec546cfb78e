//! Element tree construction errors

use crate::logging::{codes, Code};
use crate::utils::Span;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unexpected token: expected {expected}, found {found} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Mismatched end tag: expected </{expected}>, found </{found}> at {span}")]
    MismatchedEndTag {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Element <{name}> opened at {span} is never closed")]
    UnclosedElement { name: String, span: Span },

    #[error("Document has more than one root element; second root <{name}> at {span}")]
    MultipleRoots { name: String, span: Span },

    #[error("Document has no root element")]
    MissingRoot,

    #[error("Character data outside the root element at {span}")]
    TextOutsideRoot { span: Span },

    #[error("Duplicate attribute '{name}' at {span}")]
    DuplicateAttribute { name: String, span: Span },

    #[error("Maximum nesting depth {max_depth} exceeded at {span}")]
    MaxNestingDepth { max_depth: usize, span: Span },

    #[error("Element <{element}> has more than {max_attributes} attributes at {span}")]
    TooManyAttributes {
        element: String,
        max_attributes: usize,
        span: Span,
    },
}

impl SyntaxError {
    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn mismatched_end_tag(expected: &str, found: &str, span: Span) -> Self {
        Self::MismatchedEndTag {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn unclosed_element(name: &str, span: Span) -> Self {
        Self::UnclosedElement {
            name: name.to_string(),
            span,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::MismatchedEndTag { .. } => codes::syntax::MISMATCHED_END_TAG,
            Self::UnclosedElement { .. } => codes::syntax::UNCLOSED_ELEMENT,
            Self::MultipleRoots { .. } => codes::syntax::MULTIPLE_ROOTS,
            Self::MissingRoot => codes::syntax::MISSING_ROOT,
            Self::TextOutsideRoot { .. } => codes::syntax::TEXT_OUTSIDE_ROOT,
            Self::DuplicateAttribute { .. } => codes::syntax::DUPLICATE_ATTRIBUTE,
            Self::MaxNestingDepth { .. } => codes::syntax::MAX_NESTING_DEPTH,
            Self::TooManyAttributes { .. } => codes::syntax::TOO_MANY_ATTRIBUTES,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::MismatchedEndTag { span, .. }
            | Self::UnclosedElement { span, .. }
            | Self::MultipleRoots { span, .. }
            | Self::TextOutsideRoot { span }
            | Self::DuplicateAttribute { span, .. }
            | Self::MaxNestingDepth { span, .. }
            | Self::TooManyAttributes { span, .. } => Some(*span),
            Self::MissingRoot => None,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }
}
