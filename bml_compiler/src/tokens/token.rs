//! Markup token definitions
//!
//! The tokenizer emits one token per markup construct. Tag interiors are
//! split into an opening token, one token per attribute and a closing token
//! so that every attribute keeps its own span.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `<?target ...?>`, content without the delimiters
    Declaration(String),
    /// `<!DOCTYPE ...>`, skipped by the parser
    Doctype(String),
    /// `<!-- ... -->`
    Comment(String),
    /// `<name`
    StartTagOpen(String),
    /// `name="value"` inside a start tag, value already entity-decoded
    Attribute { name: String, value: String },
    /// `>` closing a start tag
    TagClose,
    /// `/>` closing an empty element
    EmptyTagClose,
    /// `</name>`
    EndTag(String),
    /// Character data between tags, entity-decoded
    Text(String),
    /// `<![CDATA[ ... ]]>` content, verbatim
    CData(String),
    Eof,
}

impl Token {
    /// Tokens the parser never looks at
    pub fn is_trivia(&self) -> bool {
        match self {
            Token::Declaration(_) | Token::Doctype(_) | Token::Comment(_) => true,
            Token::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Text or CDATA content
    pub fn character_data(&self) -> Option<&str> {
        match self {
            Token::Text(text) | Token::CData(text) => Some(text),
            _ => None,
        }
    }

    /// Short description used in "expected X, found Y" messages
    pub fn describe(&self) -> String {
        match self {
            Token::Declaration(_) => "declaration".to_string(),
            Token::Doctype(_) => "doctype".to_string(),
            Token::Comment(_) => "comment".to_string(),
            Token::StartTagOpen(name) => format!("<{}>", name),
            Token::Attribute { name, .. } => format!("attribute '{}'", name),
            Token::TagClose => "'>'".to_string(),
            Token::EmptyTagClose => "'/>'".to_string(),
            Token::EndTag(name) => format!("</{}>", name),
            Token::Text(_) => "text".to_string(),
            Token::CData(_) => "CDATA section".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Declaration(content) => write!(f, "<?{}?>", content),
            Token::Doctype(content) => write!(f, "<!DOCTYPE{}>", content),
            Token::Comment(content) => write!(f, "<!--{}-->", content),
            Token::StartTagOpen(name) => write!(f, "<{}", name),
            Token::Attribute { name, value } => write!(f, "{}=\"{}\"", name, value),
            Token::TagClose => write!(f, ">"),
            Token::EmptyTagClose => write!(f, "/>"),
            Token::EndTag(name) => write!(f, "</{}>", name),
            Token::Text(text) => write!(f, "{}", text),
            Token::CData(text) => write!(f, "<![CDATA[{}]]>", text),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivia_classification() {
        assert!(Token::Comment("x".into()).is_trivia());
        assert!(Token::Text(" \n\t".into()).is_trivia());
        assert!(!Token::Text(" 1 ".into()).is_trivia());
        assert!(!Token::CData("  ".into()).is_trivia());
        assert!(!Token::Eof.is_trivia());
    }

    #[test]
    fn test_describe() {
        assert_eq!(Token::StartTagOpen("fire".into()).describe(), "<fire>");
        assert_eq!(Token::EndTag("action".into()).describe(), "</action>");
        assert_eq!(Token::Eof.describe(), "end of input");
    }
}
