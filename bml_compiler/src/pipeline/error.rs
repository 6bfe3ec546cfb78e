use crate::ast::FormatError;
use crate::file_processor::FileProcessorError;
use crate::lexical::LexerError;
use crate::logging::Code;
use crate::syntax::SyntaxError;
use crate::validation::ValidationError;

/// Any failure while loading a pattern
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Syntax analysis failed: {0}")]
    SyntaxAnalysis(#[from] SyntaxError),

    #[error("Invalid pattern document: {0}")]
    Format(#[from] FormatError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl PipelineError {
    /// Input that is not a well-formed pattern document
    pub fn is_format_error(&self) -> bool {
        !self.is_validation_error()
    }

    /// Well-formed document with broken references or structure
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::FileProcessing(error) => error.error_code(),
            Self::LexicalAnalysis(error) => error.error_code(),
            Self::SyntaxAnalysis(error) => error.error_code(),
            Self::Format(error) => error.error_code(),
            Self::Validation(error) => error.error_code(),
        }
    }
}
