use crate::config::constants::compile_time::expression::*;
use crate::logging::{codes, Code};

pub type ExpressionResult<T> = Result<T, ExpressionError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpressionError {
    #[error("Invalid expression '{source_text}': {message} at offset {offset}")]
    Parse {
        source_text: String,
        message: String,
        offset: usize,
    },

    #[error("Expression too long: {length} characters (max {MAX_EXPRESSION_LENGTH})")]
    TooLong { length: usize },

    #[error("Expression '{source_text}' nests deeper than {MAX_EXPRESSION_DEPTH} levels")]
    TooDeep { source_text: String },

    /// `$index` has no value anywhere in the parameter scope
    #[error("Parameter ${index} is not bound")]
    UnboundParameter { index: usize },
}

impl ExpressionError {
    pub fn parse(source_text: &str, message: impl Into<String>, offset: usize) -> Self {
        Self::Parse {
            source_text: source_text.to_string(),
            message: message.into(),
            offset,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Parse { .. } | Self::TooDeep { .. } => codes::expression::PARSE_ERROR,
            Self::TooLong { .. } => codes::expression::EXPRESSION_TOO_LONG,
            Self::UnboundParameter { .. } => codes::expression::UNBOUND_PARAMETER,
        }
    }

    /// Unbound parameters evaluate to 0 outside strict evaluation
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnboundParameter { .. })
    }
}
