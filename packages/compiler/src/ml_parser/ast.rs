//! ML Parser AST
//!
//! Markup tree produced by the tree builder. Nodes own their children and
//! keep spans for every error the template walker may report.

use crate::parse_util::ParseSourceSpan;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(Text),
    Comment(Comment),
}

impl Node {
    pub fn source_span(&self) -> &ParseSourceSpan {
        match self {
            Node::Element(e) => &e.source_span,
            Node::Text(t) => &t.source_span,
            Node::Comment(c) => &c.source_span,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Text consisting of whitespace only.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.value.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub value: String,
    pub source_span: ParseSourceSpan,
}

impl Text {
    pub fn new(value: String, source_span: ParseSourceSpan) -> Self {
        Text { value, source_span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub value: Option<String>,
    pub source_span: ParseSourceSpan,
}

impl Comment {
    pub fn new(value: Option<String>, source_span: ParseSourceSpan) -> Self {
        Comment { value, source_span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
    pub key_span: ParseSourceSpan,
    /// Span of the value text without quotes; absent for bare attributes.
    pub value_span: Option<ParseSourceSpan>,
}

impl Attribute {
    /// The value span, or the whole attribute when it has no value.
    pub fn value_or_key_span(&self) -> &ParseSourceSpan {
        self.value_span.as_ref().unwrap_or(&self.key_span)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
    pub source_span: ParseSourceSpan,
    pub start_source_span: ParseSourceSpan,
    pub end_source_span: Option<ParseSourceSpan>,
    pub is_void: bool,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name == name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attr(name).map(|a| a.value.as_str())
    }

    /// Child elements, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }
}
