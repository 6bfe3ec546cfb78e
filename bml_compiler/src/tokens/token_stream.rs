//! Span-accurate token stream for the markup parser
//!
//! Keeps every token (comments and declarations included) with its original
//! span, and walks only the significant ones.

use crate::tokens::token::Token;
use crate::utils::{SourceMap, Span, Spanned};

/// A token with span information
pub type SpannedToken = Spanned<Token>;

#[derive(Debug, Clone)]
pub struct TokenStream {
    /// All tokens with original spans
    all_tokens: Vec<SpannedToken>,
    /// Indices into all_tokens for non-trivia tokens
    significant_indices: Vec<usize>,
    /// Current position in significant_indices
    position: usize,
    source_map: Option<SourceMap>,
}

impl TokenStream {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        let significant_indices = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.value.is_trivia())
            .map(|(index, _)| index)
            .collect();

        Self {
            all_tokens: tokens,
            significant_indices,
            position: 0,
            source_map: None,
        }
    }

    pub fn with_source_map(tokens: Vec<SpannedToken>, source_map: SourceMap) -> Self {
        let mut stream = Self::new(tokens);
        stream.source_map = Some(source_map);
        stream
    }

    pub fn current(&self) -> Option<&SpannedToken> {
        self.significant_indices
            .get(self.position)
            .and_then(|&index| self.all_tokens.get(index))
    }

    pub fn current_token(&self) -> Option<&Token> {
        self.current().map(|t| &t.value)
    }

    /// Span of the current token, or of the last token once exhausted
    pub fn current_span(&self) -> Span {
        self.current()
            .or_else(|| self.all_tokens.last())
            .map(|t| t.span)
            .unwrap_or_else(Span::dummy)
    }

    pub fn peek(&self) -> Option<&SpannedToken> {
        self.significant_indices
            .get(self.position + 1)
            .and_then(|&index| self.all_tokens.get(index))
    }

    /// Take the current token and move past it
    pub fn advance(&mut self) -> Option<SpannedToken> {
        let token = self.current().cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    pub fn is_at_end(&self) -> bool {
        matches!(self.current_token(), None | Some(Token::Eof))
    }

    /// Number of significant tokens
    pub fn len(&self) -> usize {
        self.significant_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.significant_indices.is_empty()
    }

    pub fn all_tokens(&self) -> &[SpannedToken] {
        &self.all_tokens
    }

    pub fn iter_significant(&self) -> impl Iterator<Item = &SpannedToken> {
        self.significant_indices
            .iter()
            .filter_map(move |&index| self.all_tokens.get(index))
    }

    pub fn source_map(&self) -> Option<&SourceMap> {
        self.source_map.as_ref()
    }

    /// Render `message` against the source when a source map is attached
    pub fn format_error(&self, span: Span, message: &str) -> String {
        match &self.source_map {
            Some(map) => map.render(&span, message),
            None => format!("error: {} at {}", message, span),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    fn spanned(token: Token, offset: usize) -> SpannedToken {
        let start = Position::new(offset, 1, offset as u32 + 1);
        Spanned::new(token, Span::new(start, Position::new(offset + 1, 1, offset as u32 + 2)))
    }

    #[test]
    fn test_trivia_is_skipped() {
        let stream = TokenStream::new(vec![
            spanned(Token::Declaration("xml version=\"1.0\"".into()), 0),
            spanned(Token::StartTagOpen("bulletml".into()), 1),
            spanned(Token::Text("\n  ".into()), 2),
            spanned(Token::Comment(" c ".into()), 3),
            spanned(Token::EmptyTagClose, 4),
            spanned(Token::Eof, 5),
        ]);

        assert_eq!(stream.len(), 3);
        assert_eq!(stream.all_tokens().len(), 6);
        assert_eq!(
            stream.current_token(),
            Some(&Token::StartTagOpen("bulletml".into()))
        );
        assert_eq!(stream.peek().map(|t| &t.value), Some(&Token::EmptyTagClose));
    }

    #[test]
    fn test_advance_to_end() {
        let mut stream = TokenStream::new(vec![
            spanned(Token::TagClose, 0),
            spanned(Token::Eof, 1),
        ]);

        assert!(!stream.is_at_end());
        assert_eq!(stream.advance().map(|t| t.value), Some(Token::TagClose));
        assert!(stream.is_at_end());
        assert_eq!(stream.current_span().start.offset, 1);
    }

    #[test]
    fn test_format_error_without_source() {
        let stream = TokenStream::new(vec![]);
        let message = stream.format_error(Span::dummy(), "boom");
        assert!(message.contains("boom"));
        assert!(stream.is_at_end());
    }
}
