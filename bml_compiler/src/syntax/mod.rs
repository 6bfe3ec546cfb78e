//! Syntax analysis: markup tokens to an element tree
//!
//! Only well-formedness is checked here. Element names and attributes are
//! interpreted by the AST builder.

mod element;
mod error;
mod parser;

pub use element::{Attribute, Content, Document, Element};
pub use error::{SyntaxError, SyntaxResult};
pub use parser::MarkupParser;

use crate::logging::codes;
use crate::tokens::TokenStream;
use crate::{log_debug, log_error, log_success};

/// Parse a token stream into a document with logging
pub fn parse_document(token_stream: TokenStream) -> SyntaxResult<Document> {
    log_debug!("Starting syntax analysis", "tokens" => token_stream.len());

    match parser::parse_token_stream(token_stream) {
        Ok((document, max_depth)) => {
            log_success!(
                codes::success::ELEMENT_TREE_COMPLETE,
                "Element tree built",
                "root" => document.root.name,
                "elements" => document.root.element_count(),
                "max_depth" => max_depth
            );
            Ok(document)
        }
        Err(error) => {
            log_error!(error.error_code(), &error.to_string(),
                span = parser::error_span(&error)
            );
            Err(error)
        }
    }
}
