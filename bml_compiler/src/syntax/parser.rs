//! Recursive-descent parser from markup tokens to an element tree

use crate::config::constants::compile_time::syntax::*;
use crate::syntax::element::{Attribute, Content, Document, Element};
use crate::syntax::error::{SyntaxError, SyntaxResult};
use crate::tokens::{Token, TokenStream};
use crate::utils::Span;
use crate::log_debug;

pub struct MarkupParser {
    tokens: TokenStream,
    max_depth_seen: usize,
}

impl MarkupParser {
    pub fn new(tokens: TokenStream) -> Self {
        log_debug!("Creating markup parser", "tokens" => tokens.len());
        Self {
            tokens,
            max_depth_seen: 0,
        }
    }

    pub fn max_depth_seen(&self) -> usize {
        self.max_depth_seen
    }

    /// Parse exactly one root element, allowing trivia around it
    pub fn parse_document(&mut self) -> SyntaxResult<Document> {
        let mut root: Option<Element> = None;

        while let Some(token) = self.tokens.current().cloned() {
            match &token.value {
                Token::Eof => break,
                Token::StartTagOpen(name) => {
                    if root.is_some() {
                        return Err(SyntaxError::MultipleRoots {
                            name: name.clone(),
                            span: token.span,
                        });
                    }
                    root = Some(self.parse_element(1)?);
                }
                Token::Text(_) | Token::CData(_) => {
                    return Err(SyntaxError::TextOutsideRoot { span: token.span });
                }
                other => {
                    return Err(SyntaxError::unexpected_token(
                        "start tag",
                        &other.describe(),
                        token.span,
                    ));
                }
            }
        }

        root.map(|root| Document { root })
            .ok_or(SyntaxError::MissingRoot)
    }

    fn parse_element(&mut self, depth: usize) -> SyntaxResult<Element> {
        let open = self.tokens.advance().ok_or(SyntaxError::MissingRoot)?;
        let name = match open.value {
            Token::StartTagOpen(name) => name,
            other => {
                return Err(SyntaxError::unexpected_token(
                    "start tag",
                    &other.describe(),
                    open.span,
                ))
            }
        };

        if depth > MAX_NESTING_DEPTH {
            return Err(SyntaxError::MaxNestingDepth {
                max_depth: MAX_NESTING_DEPTH,
                span: open.span,
            });
        }
        self.max_depth_seen = self.max_depth_seen.max(depth);

        let mut element = Element::new(name, open.span);

        // Attributes up to '>' or '/>'
        loop {
            let token = self
                .tokens
                .advance()
                .ok_or_else(|| SyntaxError::unclosed_element(&element.name, open.span))?;

            match token.value {
                Token::Attribute { name, value } => {
                    if element.attributes.iter().any(|a| a.name == name) {
                        return Err(SyntaxError::DuplicateAttribute {
                            name,
                            span: token.span,
                        });
                    }
                    if element.attributes.len() >= MAX_ATTRIBUTES_PER_ELEMENT {
                        return Err(SyntaxError::TooManyAttributes {
                            element: element.name.clone(),
                            max_attributes: MAX_ATTRIBUTES_PER_ELEMENT,
                            span: token.span,
                        });
                    }
                    element.attributes.push(Attribute {
                        name,
                        value,
                        span: token.span,
                    });
                }
                Token::EmptyTagClose => {
                    element.span = open.span.merge(token.span);
                    return Ok(element);
                }
                Token::TagClose => break,
                Token::Eof => return Err(SyntaxError::unclosed_element(&element.name, open.span)),
                other => {
                    return Err(SyntaxError::unexpected_token(
                        "attribute or '>'",
                        &other.describe(),
                        token.span,
                    ))
                }
            }
        }

        // Content up to the matching end tag
        loop {
            let token = match self.tokens.current().cloned() {
                Some(token) => token,
                None => return Err(SyntaxError::unclosed_element(&element.name, open.span)),
            };

            match token.value {
                Token::StartTagOpen(_) => {
                    let child = self.parse_element(depth + 1)?;
                    element.children.push(Content::Element(child));
                }
                Token::Text(text) | Token::CData(text) => {
                    self.tokens.advance();
                    if !text.trim().is_empty() {
                        element.children.push(Content::Text {
                            text,
                            span: token.span,
                        });
                    }
                }
                Token::EndTag(found) => {
                    self.tokens.advance();
                    if found != element.name {
                        return Err(SyntaxError::mismatched_end_tag(
                            &element.name,
                            &found,
                            token.span,
                        ));
                    }
                    element.span = open.span.merge(token.span);
                    return Ok(element);
                }
                Token::Eof => return Err(SyntaxError::unclosed_element(&element.name, open.span)),
                other => {
                    return Err(SyntaxError::unexpected_token(
                        "content or end tag",
                        &other.describe(),
                        token.span,
                    ))
                }
            }
        }
    }
}

/// Parse a token stream into a document
pub fn parse_token_stream(tokens: TokenStream) -> SyntaxResult<(Document, usize)> {
    let mut parser = MarkupParser::new(tokens);
    let document = parser.parse_document()?;
    Ok((document, parser.max_depth_seen()))
}

/// Span used when an error carries none
pub(crate) fn error_span(error: &SyntaxError) -> Span {
    error.span().unwrap_or_else(Span::dummy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use assert_matches::assert_matches;

    fn parse(source: &str) -> SyntaxResult<Document> {
        MarkupParser::new(tokenize(source).unwrap()).parse_document()
    }

    #[test]
    fn test_parse_nested_elements() {
        let document = parse(
            r#"<?xml version="1.0"?>
<!-- header -->
<bulletml type="vertical">
  <action label="top">
    <wait>10 + <!-- split -->$rank</wait>
    <vanish/>
  </action>
</bulletml>
"#,
        )
        .unwrap();

        let root = &document.root;
        assert_eq!(root.name, "bulletml");
        assert_eq!(root.attribute("type"), Some("vertical"));
        assert_eq!(root.element_count(), 4);

        let action = root.child_elements().next().unwrap();
        assert_eq!(action.attribute("label"), Some("top"));
        let wait = action.child_elements().next().unwrap();
        assert_eq!(wait.text(), "10 + $rank");
        assert_eq!(wait.span.start.line, 5);
    }

    #[test]
    fn test_mismatched_end_tag() {
        let result = parse("<bulletml><action></fire></bulletml>");
        assert_matches!(
            result,
            Err(SyntaxError::MismatchedEndTag { ref expected, ref found, .. })
                if expected == "action" && found == "fire"
        );
    }

    #[test]
    fn test_unclosed_element() {
        assert_matches!(
            parse("<bulletml><action>"),
            Err(SyntaxError::UnclosedElement { ref name, .. }) if name == "action"
        );
    }

    #[test]
    fn test_multiple_roots() {
        assert_matches!(
            parse("<bulletml/><bulletml/>"),
            Err(SyntaxError::MultipleRoots { .. })
        );
    }

    #[test]
    fn test_missing_root() {
        assert_matches!(parse("<!-- nothing -->\n"), Err(SyntaxError::MissingRoot));
    }

    #[test]
    fn test_text_outside_root() {
        assert_matches!(
            parse("stray<bulletml/>"),
            Err(SyntaxError::TextOutsideRoot { .. })
        );
    }

    #[test]
    fn test_duplicate_attribute() {
        assert_matches!(
            parse("<bulletml><action label='a' label='b'/></bulletml>"),
            Err(SyntaxError::DuplicateAttribute { ref name, .. }) if name == "label"
        );
    }

    #[test]
    fn test_nesting_limit() {
        let depth = MAX_NESTING_DEPTH + 1;
        let source = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
        assert_matches!(parse(&source), Err(SyntaxError::MaxNestingDepth { .. }));
    }

    #[test]
    fn test_cdata_and_whitespace_text() {
        let document = parse("<speed>\n  <![CDATA[ 1 ]]>\n</speed>").unwrap();
        assert_eq!(document.root.children.len(), 1);
        assert_eq!(document.root.text(), " 1 ");
    }
}
