//! Markup tokenizer for pattern scripts
//!
//! Splits script text into tags, attributes, character data, CDATA sections,
//! comments and declarations. Entities are decoded here so later stages only
//! ever see plain text.

use crate::config::constants::compile_time::lexical::*;
use crate::file_processor::FileProcessingResult;
use crate::logging::codes;
use crate::tokens::{SpannedToken, Token, TokenStream};
use crate::utils::{Position, SourceMap, Span, Spanned};
use crate::{log_debug, log_error, log_success};

/// Lexical analysis errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character '{character}' at {position}")]
    InvalidCharacter { character: char, position: Position },

    #[error("Unterminated {construct} starting at {position}")]
    UnterminatedConstruct {
        construct: &'static str,
        position: Position,
    },

    #[error("Unknown entity '&{entity};' at {position}")]
    UnknownEntity { entity: String, position: Position },

    #[error("Name too long: {length} characters (max {MAX_NAME_LENGTH})")]
    NameTooLong { length: usize, position: Position },

    #[error("Text too large: {size} bytes (max {limit})")]
    TextTooLarge {
        size: usize,
        limit: usize,
        position: Position,
    },

    #[error("Comment too long: {length} characters (max {MAX_COMMENT_LENGTH})")]
    CommentTooLong { length: usize, position: Position },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedConstruct { .. } => codes::lexical::UNTERMINATED_CONSTRUCT,
            LexerError::UnknownEntity { .. } => codes::lexical::UNKNOWN_ENTITY,
            LexerError::NameTooLong { .. } => codes::lexical::NAME_TOO_LONG,
            LexerError::TextTooLarge { .. } => codes::lexical::TEXT_TOO_LARGE,
            LexerError::CommentTooLong { .. } => codes::lexical::COMMENT_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            LexerError::InvalidCharacter { position, .. }
            | LexerError::UnterminatedConstruct { position, .. }
            | LexerError::UnknownEntity { position, .. }
            | LexerError::NameTooLong { position, .. }
            | LexerError::TextTooLarge { position, .. }
            | LexerError::CommentTooLong { position, .. } => Some(*position),
            LexerError::TooManyTokens { .. } => None,
        }
    }
}

pub type LexerResult<T> = Result<T, LexerError>;

/// Counters gathered during one tokenization
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub element_count: usize,
    pub attribute_count: usize,
    pub text_runs: usize,
    pub comment_count: usize,
    pub max_text_length: usize,
}

impl LexicalMetrics {
    fn record_token(&mut self, token: &Token) {
        self.total_tokens += 1;
        match token {
            Token::StartTagOpen(_) => self.element_count += 1,
            Token::Attribute { .. } => self.attribute_count += 1,
            Token::Comment(_) => self.comment_count += 1,
            Token::Text(text) | Token::CData(text) if !text.trim().is_empty() => {
                self.text_runs += 1;
                self.max_text_length = self.max_text_length.max(text.len());
            }
            _ => {}
        }
    }
}

// ============================================================================
// CURSOR
// ============================================================================

/// Character cursor that keeps line/column positions current
struct Cursor<'a> {
    source: &'a str,
    pos: Position,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: Position::start(),
        }
    }

    fn rest(&self) -> &'a str {
        self.source.get(self.pos.offset..).unwrap_or("")
    }

    fn is_eof(&self) -> bool {
        self.pos.offset >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos = self.pos.advance(ch);
        Some(ch)
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos = self.pos.advance_str(s);
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn take_while<F: Fn(char) -> bool>(&mut self, predicate: F) -> &'a str {
        let start = self.pos.offset;
        while matches!(self.peek(), Some(c) if predicate(c)) {
            self.bump();
        }
        self.source.get(start..self.pos.offset).unwrap_or("")
    }

    /// Consume through `delimiter`, returning the text before it
    fn take_until(&mut self, delimiter: &str) -> Option<&'a str> {
        let rest = self.rest();
        let index = rest.find(delimiter)?;
        let content = &rest[..index];
        self.pos = self.pos.advance_str(content).advance_str(delimiter);
        Some(content)
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')
}

// ============================================================================
// ENTITIES
// ============================================================================

fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(decimal) = entity.strip_prefix('#') {
                decimal.parse().ok()?
            } else {
                return None;
            };
            char::from_u32(code)
        }
    }
}

/// Replace entity references in `raw`, which starts at `start` in the source
pub fn decode_entities(raw: &str, start: Position) -> LexerResult<String> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }

    let mut decoded = String::with_capacity(raw.len());
    let mut pos = start;
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        let (before, after) = rest.split_at(amp);
        decoded.push_str(before);
        pos = pos.advance_str(before);

        let end = after.find(';').filter(|&i| i <= 12).ok_or_else(|| {
            LexerError::UnknownEntity {
                entity: after
                    .chars()
                    .skip(1)
                    .take_while(|c| c.is_alphanumeric() || *c == '#')
                    .collect(),
                position: pos,
            }
        })?;
        let entity = &after[1..end];
        let ch = resolve_entity(entity).ok_or_else(|| LexerError::UnknownEntity {
            entity: entity.to_string(),
            position: pos,
        })?;
        decoded.push(ch);

        pos = pos.advance_str(&after[..=end]);
        rest = &after[end + 1..];
    }

    decoded.push_str(rest);
    Ok(decoded)
}

// ============================================================================
// ANALYZER
// ============================================================================

pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self {
            metrics: LexicalMetrics::default(),
        }
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Tokenize the source of a file read by the file processor
    pub fn tokenize_file_result(
        &mut self,
        file_result: &FileProcessingResult,
    ) -> LexerResult<TokenStream> {
        log_debug!("Starting lexical analysis",
            "file" => file_result.metadata.path.display(),
            "line_count" => file_result.metadata.line_count,
            "file_size_bytes" => file_result.metadata.size
        );
        self.tokenize(&file_result.source)
    }

    /// Tokenize script text
    pub fn tokenize(&mut self, source: &str) -> LexerResult<TokenStream> {
        self.metrics = LexicalMetrics::default();

        match self.tokenize_all(source) {
            Ok(tokens) => {
                log_success!(
                    codes::success::TOKENIZATION_COMPLETE,
                    "Tokenization completed",
                    "tokens" => self.metrics.total_tokens,
                    "elements" => self.metrics.element_count,
                    "attributes" => self.metrics.attribute_count,
                    "text_runs" => self.metrics.text_runs
                );
                Ok(TokenStream::with_source_map(tokens, SourceMap::new(source)))
            }
            Err(error) => {
                match error.position() {
                    Some(position) => log_error!(error.error_code(), &error.to_string(),
                        span = Span::point(position)
                    ),
                    None => log_error!(error.error_code(), &error.to_string()),
                }
                Err(error)
            }
        }
    }

    fn tokenize_all(&mut self, source: &str) -> LexerResult<Vec<SpannedToken>> {
        let mut cursor = Cursor::new(source);
        let mut tokens = Vec::new();

        while !cursor.is_eof() {
            if tokens.len() >= MAX_TOKEN_COUNT {
                return Err(LexerError::TooManyTokens {
                    count: tokens.len(),
                });
            }

            if cursor.starts_with("<!--") {
                self.lex_comment(&mut cursor, &mut tokens)?;
            } else if cursor.starts_with("<![CDATA[") {
                self.lex_cdata(&mut cursor, &mut tokens)?;
            } else if cursor.starts_with("<!DOCTYPE") {
                self.lex_doctype(&mut cursor, &mut tokens)?;
            } else if cursor.starts_with("<?") {
                self.lex_declaration(&mut cursor, &mut tokens)?;
            } else if cursor.starts_with("</") {
                self.lex_end_tag(&mut cursor, &mut tokens)?;
            } else if cursor.starts_with("<") {
                self.lex_start_tag(&mut cursor, &mut tokens)?;
            } else {
                self.lex_text(&mut cursor, &mut tokens)?;
            }
        }

        tokens.push(Spanned::new(Token::Eof, Span::point(cursor.pos)));
        Ok(tokens)
    }

    fn push(
        &mut self,
        tokens: &mut Vec<SpannedToken>,
        token: Token,
        start: Position,
        end: Position,
    ) {
        self.metrics.record_token(&token);
        tokens.push(Spanned::new(token, Span::new(start, end)));
    }

    fn lex_comment(
        &mut self,
        cursor: &mut Cursor,
        tokens: &mut Vec<SpannedToken>,
    ) -> LexerResult<()> {
        let start = cursor.pos;
        cursor.eat("<!--");
        let content = cursor
            .take_until("-->")
            .ok_or(LexerError::UnterminatedConstruct {
                construct: "comment",
                position: start,
            })?;

        let length = content.chars().count();
        if length > MAX_COMMENT_LENGTH {
            return Err(LexerError::CommentTooLong {
                length,
                position: start,
            });
        }

        self.push(tokens, Token::Comment(content.to_string()), start, cursor.pos);
        Ok(())
    }

    fn lex_cdata(
        &mut self,
        cursor: &mut Cursor,
        tokens: &mut Vec<SpannedToken>,
    ) -> LexerResult<()> {
        let start = cursor.pos;
        cursor.eat("<![CDATA[");
        let content = cursor
            .take_until("]]>")
            .ok_or(LexerError::UnterminatedConstruct {
                construct: "CDATA section",
                position: start,
            })?;

        if content.len() > MAX_TEXT_LENGTH {
            return Err(LexerError::TextTooLarge {
                size: content.len(),
                limit: MAX_TEXT_LENGTH,
                position: start,
            });
        }

        self.push(tokens, Token::CData(content.to_string()), start, cursor.pos);
        Ok(())
    }

    /// Doctype content is kept verbatim, internal subset included
    fn lex_doctype(
        &mut self,
        cursor: &mut Cursor,
        tokens: &mut Vec<SpannedToken>,
    ) -> LexerResult<()> {
        let start = cursor.pos;
        cursor.eat("<!DOCTYPE");
        let content_start = cursor.pos.offset;

        let mut bracket_depth = 0usize;
        let mut quote: Option<char> = None;
        loop {
            let content_end = cursor.pos.offset;
            let ch = cursor.bump().ok_or(LexerError::UnterminatedConstruct {
                construct: "doctype",
                position: start,
            })?;

            match (quote, ch) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"') | (None, '\'') => quote = Some(ch),
                (None, '[') => bracket_depth += 1,
                (None, ']') => bracket_depth = bracket_depth.saturating_sub(1),
                (None, '>') if bracket_depth == 0 => {
                    let content = cursor.source.get(content_start..content_end).unwrap_or("");
                    self.push(tokens, Token::Doctype(content.to_string()), start, cursor.pos);
                    return Ok(());
                }
                _ => {}
            }
        }
    }

    fn lex_declaration(
        &mut self,
        cursor: &mut Cursor,
        tokens: &mut Vec<SpannedToken>,
    ) -> LexerResult<()> {
        let start = cursor.pos;
        cursor.eat("<?");
        let content = cursor
            .take_until("?>")
            .ok_or(LexerError::UnterminatedConstruct {
                construct: "declaration",
                position: start,
            })?;

        self.push(tokens, Token::Declaration(content.to_string()), start, cursor.pos);
        Ok(())
    }

    fn lex_name(
        &mut self,
        cursor: &mut Cursor,
        construct: &'static str,
        start: Position,
    ) -> LexerResult<String> {
        let name_start = cursor.pos;
        match cursor.peek() {
            None => {
                return Err(LexerError::UnterminatedConstruct {
                    construct,
                    position: start,
                })
            }
            Some(c) if !is_name_start(c) => {
                return Err(LexerError::InvalidCharacter {
                    character: c,
                    position: name_start,
                })
            }
            Some(_) => {}
        }

        let name = cursor.take_while(is_name_char);
        let length = name.chars().count();
        if length > MAX_NAME_LENGTH {
            return Err(LexerError::NameTooLong {
                length,
                position: name_start,
            });
        }
        Ok(name.to_string())
    }

    /// Expect `>` after optional whitespace
    fn expect_close(
        cursor: &mut Cursor,
        construct: &'static str,
        start: Position,
    ) -> LexerResult<()> {
        cursor.skip_whitespace();
        if cursor.eat(">") {
            return Ok(());
        }
        Err(match cursor.peek() {
            Some(character) => LexerError::InvalidCharacter {
                character,
                position: cursor.pos,
            },
            None => LexerError::UnterminatedConstruct {
                construct,
                position: start,
            },
        })
    }

    fn lex_end_tag(
        &mut self,
        cursor: &mut Cursor,
        tokens: &mut Vec<SpannedToken>,
    ) -> LexerResult<()> {
        let start = cursor.pos;
        cursor.eat("</");
        let name = self.lex_name(cursor, "end tag", start)?;
        Self::expect_close(cursor, "end tag", start)?;

        self.push(tokens, Token::EndTag(name), start, cursor.pos);
        Ok(())
    }

    fn lex_start_tag(
        &mut self,
        cursor: &mut Cursor,
        tokens: &mut Vec<SpannedToken>,
    ) -> LexerResult<()> {
        let start = cursor.pos;
        cursor.eat("<");
        let name = self.lex_name(cursor, "start tag", start)?;
        self.push(tokens, Token::StartTagOpen(name), start, cursor.pos);

        loop {
            cursor.skip_whitespace();
            let at = cursor.pos;

            if cursor.eat("/>") {
                self.push(tokens, Token::EmptyTagClose, at, cursor.pos);
                return Ok(());
            }
            if cursor.eat(">") {
                self.push(tokens, Token::TagClose, at, cursor.pos);
                return Ok(());
            }

            self.lex_attribute(cursor, tokens, start)?;
        }
    }

    fn lex_attribute(
        &mut self,
        cursor: &mut Cursor,
        tokens: &mut Vec<SpannedToken>,
        tag_start: Position,
    ) -> LexerResult<()> {
        let start = cursor.pos;
        let name = self.lex_name(cursor, "start tag", tag_start)?;

        cursor.skip_whitespace();
        if !cursor.eat("=") {
            return Err(match cursor.peek() {
                Some(character) => LexerError::InvalidCharacter {
                    character,
                    position: cursor.pos,
                },
                None => LexerError::UnterminatedConstruct {
                    construct: "start tag",
                    position: tag_start,
                },
            });
        }
        cursor.skip_whitespace();

        let quote_pos = cursor.pos;
        let quote = match cursor.bump() {
            Some(q @ ('"' | '\'')) => q,
            Some(character) => {
                return Err(LexerError::InvalidCharacter {
                    character,
                    position: quote_pos,
                })
            }
            None => {
                return Err(LexerError::UnterminatedConstruct {
                    construct: "attribute value",
                    position: quote_pos,
                })
            }
        };

        let value_start = cursor.pos;
        let raw = cursor
            .take_until(if quote == '"' { "\"" } else { "'" })
            .ok_or(LexerError::UnterminatedConstruct {
                construct: "attribute value",
                position: quote_pos,
            })?;

        if raw.len() > MAX_ATTRIBUTE_VALUE_LENGTH {
            return Err(LexerError::TextTooLarge {
                size: raw.len(),
                limit: MAX_ATTRIBUTE_VALUE_LENGTH,
                position: value_start,
            });
        }
        if let Some(index) = raw.find('<') {
            return Err(LexerError::InvalidCharacter {
                character: '<',
                position: value_start.advance_str(&raw[..index]),
            });
        }

        let value = decode_entities(raw, value_start)?;
        self.push(tokens, Token::Attribute { name, value }, start, cursor.pos);
        Ok(())
    }

    fn lex_text(&mut self, cursor: &mut Cursor, tokens: &mut Vec<SpannedToken>) -> LexerResult<()> {
        let start = cursor.pos;
        let raw = cursor.take_while(|c| c != '<');

        if raw.len() > MAX_TEXT_LENGTH {
            return Err(LexerError::TextTooLarge {
                size: raw.len(),
                limit: MAX_TEXT_LENGTH,
                position: start,
            });
        }

        let text = decode_entities(raw, start)?;
        self.push(tokens, Token::Text(text), start, cursor.pos);
        Ok(())
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn significant(source: &str) -> Vec<Token> {
        LexicalAnalyzer::new()
            .tokenize(source)
            .unwrap()
            .iter_significant()
            .map(|t| t.value.clone())
            .collect()
    }

    #[test]
    fn test_tokenize_simple_document() {
        let tokens = significant(
            "<?xml version=\"1.0\" ?>\n<bulletml type='vertical'>\n  <wait>10</wait>\n  <vanish/>\n</bulletml>\n",
        );

        assert_eq!(
            tokens,
            vec![
                Token::StartTagOpen("bulletml".into()),
                Token::Attribute {
                    name: "type".into(),
                    value: "vertical".into()
                },
                Token::TagClose,
                Token::StartTagOpen("wait".into()),
                Token::TagClose,
                Token::Text("10".into()),
                Token::EndTag("wait".into()),
                Token::StartTagOpen("vanish".into()),
                Token::EmptyTagClose,
                Token::EndTag("bulletml".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_entities_decoded() {
        let tokens = significant("<a label=\"x&amp;y\">1 &lt; 2 &#65;&#x42;</a>");
        assert!(tokens.contains(&Token::Attribute {
            name: "label".into(),
            value: "x&y".into()
        }));
        assert!(tokens.contains(&Token::Text("1 < 2 AB".into())));
    }

    #[test]
    fn test_unknown_entity_position() {
        let result = LexicalAnalyzer::new().tokenize("<a>\n  &bogus;</a>");
        assert_matches!(
            result,
            Err(LexerError::UnknownEntity { ref entity, position }) if entity == "bogus" && position.line == 2 && position.column == 3
        );
    }

    #[test]
    fn test_doctype_with_internal_subset() {
        let source = "<!DOCTYPE bulletml SYSTEM \"bulletml.dtd\" [<!ENTITY x \"]>\">]>\n<bulletml/>";
        let tokens = LexicalAnalyzer::new().tokenize(source).unwrap();

        assert_matches!(tokens.all_tokens()[0].value, Token::Doctype(_));
        assert_eq!(
            tokens.current_token(),
            Some(&Token::StartTagOpen("bulletml".into()))
        );
    }

    #[test]
    fn test_cdata_kept_verbatim() {
        let tokens = significant("<speed><![CDATA[$1 < 2 & 3]]></speed>");
        assert!(tokens.contains(&Token::CData("$1 < 2 & 3".into())));
    }

    #[test]
    fn test_unterminated_comment() {
        let result = LexicalAnalyzer::new().tokenize("<a><!-- never closed</a>");
        assert_matches!(
            result,
            Err(LexerError::UnterminatedConstruct { construct: "comment", .. })
        );
    }

    #[test]
    fn test_invalid_name_start() {
        let result = LexicalAnalyzer::new().tokenize("<1a/>");
        assert_matches!(
            result,
            Err(LexerError::InvalidCharacter { character: '1', .. })
        );
    }

    #[test]
    fn test_unquoted_attribute_rejected() {
        let result = LexicalAnalyzer::new().tokenize("<a type=aim/>");
        assert_matches!(
            result,
            Err(LexerError::InvalidCharacter { character: 'a', .. })
        );
    }

    #[test]
    fn test_metrics_and_spans() {
        let mut analyzer = LexicalAnalyzer::new();
        let stream = analyzer.tokenize("<a>\n<b x='1'/></a>").unwrap();

        assert_eq!(analyzer.metrics().element_count, 2);
        assert_eq!(analyzer.metrics().attribute_count, 1);

        let b = stream
            .iter_significant()
            .find(|t| t.value == Token::StartTagOpen("b".into()))
            .unwrap();
        assert_eq!(b.span.start.line, 2);
        assert_eq!(b.span.start.column, 1);
    }
}
