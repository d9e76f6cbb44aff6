//! HTML Tag Definitions
//!
//! Parsing rules for the HTML elements a template may contain: void
//! elements, raw text content and implicit end tags.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Tag content types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagContentType {
    RawText,
    EscapableRawText,
    ParsableData,
}

#[derive(Debug, Clone)]
pub struct HtmlTagDefinition {
    pub closed_by_children: HashSet<&'static str>,
    pub content_type: TagContentType,
    pub closed_by_parent: bool,
    pub is_void: bool,
    pub ignore_first_lf: bool,
}

impl HtmlTagDefinition {
    pub fn new() -> Self {
        HtmlTagDefinition {
            closed_by_children: HashSet::new(),
            content_type: TagContentType::ParsableData,
            closed_by_parent: false,
            is_void: false,
            ignore_first_lf: false,
        }
    }

    pub fn with_void(mut self, is_void: bool) -> Self {
        self.is_void = is_void;
        self
    }

    pub fn with_closed_by_children(mut self, children: &[&'static str]) -> Self {
        self.closed_by_children.extend(children.iter().copied());
        self
    }

    pub fn with_closed_by_parent(mut self, closed_by_parent: bool) -> Self {
        self.closed_by_parent = closed_by_parent;
        self
    }

    pub fn with_content_type(mut self, content_type: TagContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_ignore_first_lf(mut self, ignore_first_lf: bool) -> Self {
        self.ignore_first_lf = ignore_first_lf;
        self
    }

    pub fn is_closed_by_child(&self, name: &str) -> bool {
        self.is_void || self.closed_by_children.contains(name.to_lowercase().as_str())
    }
}

impl Default for HtmlTagDefinition {
    fn default() -> Self {
        Self::new()
    }
}

static TAG_DEFINITIONS: Lazy<HashMap<&'static str, HtmlTagDefinition>> = Lazy::new(|| {
    let mut defs = HashMap::new();

    for name in [
        "base", "meta", "area", "embed", "link", "img", "input", "param", "hr", "br", "source",
        "track", "wbr", "col",
    ] {
        defs.insert(name, HtmlTagDefinition::new().with_void(true));
    }

    defs.insert(
        "p",
        HtmlTagDefinition::new()
            .with_closed_by_children(&[
                "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer",
                "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "main",
                "nav", "ol", "p", "pre", "section", "table", "ul",
            ])
            .with_closed_by_parent(true),
    );
    defs.insert(
        "thead",
        HtmlTagDefinition::new().with_closed_by_children(&["tbody", "tfoot"]),
    );
    defs.insert(
        "tbody",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["tbody", "tfoot"])
            .with_closed_by_parent(true),
    );
    defs.insert(
        "tr",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["tr"])
            .with_closed_by_parent(true),
    );
    for name in ["td", "th"] {
        defs.insert(
            name,
            HtmlTagDefinition::new()
                .with_closed_by_children(&["td", "th"])
                .with_closed_by_parent(true),
        );
    }
    defs.insert(
        "li",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["li"])
            .with_closed_by_parent(true),
    );
    defs.insert(
        "option",
        HtmlTagDefinition::new()
            .with_closed_by_children(&["option", "optgroup"])
            .with_closed_by_parent(true),
    );

    defs.insert(
        "pre",
        HtmlTagDefinition::new().with_ignore_first_lf(true),
    );
    defs.insert(
        "textarea",
        HtmlTagDefinition::new()
            .with_content_type(TagContentType::EscapableRawText)
            .with_ignore_first_lf(true),
    );
    defs.insert(
        "title",
        HtmlTagDefinition::new().with_content_type(TagContentType::EscapableRawText),
    );
    for name in ["script", "style"] {
        defs.insert(
            name,
            HtmlTagDefinition::new().with_content_type(TagContentType::RawText),
        );
    }

    defs
});

static DEFAULT_TAG_DEFINITION: Lazy<HtmlTagDefinition> = Lazy::new(HtmlTagDefinition::new);

pub fn get_html_tag_definition(tag_name: &str) -> &'static HtmlTagDefinition {
    TAG_DEFINITIONS
        .get(tag_name)
        .or_else(|| TAG_DEFINITIONS.get(tag_name.to_lowercase().as_str()))
        .unwrap_or(&DEFAULT_TAG_DEFINITION)
}
