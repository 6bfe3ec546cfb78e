//! Generic markup element tree produced by the syntax parser

use crate::utils::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub span: Span,
}

/// One child of an element, in document order
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Element(Element),
    /// Text or CDATA, never whitespace-only
    Text { text: String, span: Span },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Content>,
    /// From the `<` of the start tag to the end of the closing tag
    pub span: Span,
}

impl Element {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            span,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Content::Element(element) => Some(element),
            Content::Text { .. } => None,
        })
    }

    /// All character data directly inside this element, concatenated
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                Content::Text { text, .. } => Some(text.as_str()),
                Content::Element(_) => None,
            })
            .collect()
    }

    /// Number of elements in this subtree, self included
    pub fn element_count(&self) -> usize {
        1 + self
            .child_elements()
            .map(Element::element_count)
            .sum::<usize>()
    }
}

/// A parsed document; prolog and trailing comments are not kept
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Element,
}
