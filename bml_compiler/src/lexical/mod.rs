//! Lexical analysis: script text to markup tokens

mod analyzer;

pub use analyzer::{decode_entities, LexerError, LexerResult, LexicalAnalyzer, LexicalMetrics};

use crate::file_processor::FileProcessingResult;
use crate::tokens::TokenStream;

/// Tokenize script text with a fresh analyzer
pub fn tokenize(source: &str) -> LexerResult<TokenStream> {
    LexicalAnalyzer::new().tokenize(source)
}

/// Tokenize the output of the file processor
pub fn tokenize_file_result(file_result: &FileProcessingResult) -> LexerResult<TokenStream> {
    LexicalAnalyzer::new().tokenize_file_result(file_result)
}
