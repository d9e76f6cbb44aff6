//! ML Parser
//!
//! Builds the markup tree from the token stream. Implicit end tags follow
//! the HTML rules in `html_tags`; anything else that does not nest is
//! reported and recovered from.

use super::ast::*;
use super::html_tags::{get_html_tag_definition, HtmlTagDefinition};
use super::lexer::tokenize;
use super::tokens::{Token, TokenType};
use crate::parse_util::{ParseError, ParseSourceFile, ParseSourceSpan};

#[derive(Debug, Clone)]
pub struct ParseTreeResult {
    pub root_nodes: Vec<Node>,
    pub errors: Vec<ParseError>,
    pub file: ParseSourceFile,
}

impl ParseTreeResult {
    pub fn new(root_nodes: Vec<Node>, errors: Vec<ParseError>, file: ParseSourceFile) -> Self {
        ParseTreeResult {
            root_nodes,
            errors,
            file,
        }
    }
}

pub struct Parser {
    pub get_tag_definition: fn(&str) -> &'static HtmlTagDefinition,
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new(get_html_tag_definition)
    }
}

impl Parser {
    pub fn new(get_tag_definition: fn(&str) -> &'static HtmlTagDefinition) -> Self {
        Parser { get_tag_definition }
    }

    pub fn parse(&self, source: &str, url: &str) -> ParseTreeResult {
        let tokenize_result = tokenize(source, url);
        let mut tree_builder = TreeBuilder::new(tokenize_result.tokens, self.get_tag_definition);
        tree_builder.build();

        let mut all_errors = tokenize_result.errors;
        all_errors.extend(tree_builder.errors);
        ParseTreeResult::new(tree_builder.root_nodes, all_errors, tokenize_result.file)
    }
}

struct TreeBuilder {
    tokens: Vec<Token>,
    get_tag_definition: fn(&str) -> &'static HtmlTagDefinition,
    index: usize,
    element_stack: Vec<Element>,
    root_nodes: Vec<Node>,
    errors: Vec<ParseError>,
}

impl TreeBuilder {
    fn new(tokens: Vec<Token>, get_tag_definition: fn(&str) -> &'static HtmlTagDefinition) -> Self {
        TreeBuilder {
            tokens,
            get_tag_definition,
            index: 0,
            element_stack: Vec::new(),
            root_nodes: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn build(&mut self) {
        while let Some(token) = self.advance() {
            match token.token_type {
                TokenType::TagOpenStart => self.consume_element_start_tag(token),
                TokenType::TagClose => self.consume_element_end_tag(token),
                TokenType::Text | TokenType::RawText | TokenType::EscapableRawText => {
                    self.consume_text(token)
                }
                TokenType::CommentStart => self.consume_comment(token),
                TokenType::Eof => break,
                // doctype and stray attribute tokens carry nothing for templates
                _ => {}
            }
        }

        while let Some(element) = self.element_stack.last() {
            if !(self.get_tag_definition)(&element.name).closed_by_parent {
                let msg = format!("Unclosed element \"{}\"", element.name);
                let span = element.start_source_span.clone();
                self.add_error(msg, span);
            }
            self.pop_element(None);
        }
    }

    fn peek_type(&self) -> Option<TokenType> {
        self.tokens.get(self.index).map(|t| t.token_type)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn advance_if(&mut self, token_type: TokenType) -> Option<Token> {
        if self.peek_type() == Some(token_type) {
            self.advance()
        } else {
            None
        }
    }

    fn consume_comment(&mut self, token: Token) {
        let text = self.advance_if(TokenType::RawText);
        let end = self.advance_if(TokenType::CommentEnd);
        let end_span = end
            .as_ref()
            .or(text.as_ref())
            .map_or(&token.source_span, |t| &t.source_span);
        let span = ParseSourceSpan::new(token.source_span.start.clone(), end_span.end.clone());
        let value = text.map(|t| t.part(0).to_string());
        self.add_to_parent(Node::Comment(Comment::new(value, span)));
    }

    fn consume_text(&mut self, token: Token) {
        let mut text = token.part(0).to_string();
        if let Some(parent) = self.element_stack.last() {
            if parent.children.is_empty()
                && (self.get_tag_definition)(&parent.name).ignore_first_lf
                && text.starts_with('\n')
            {
                text.remove(0);
            }
        }
        if text.is_empty() {
            return;
        }
        self.add_to_parent(Node::Text(Text::new(text, token.source_span)));
    }

    fn consume_element_start_tag(&mut self, start_tag: Token) {
        let name = start_tag.part(0).to_string();
        let mut attrs = Vec::new();
        while self.peek_type() == Some(TokenType::AttrName) {
            if let Some(attr_name) = self.advance() {
                attrs.push(self.consume_attr(attr_name));
            }
        }

        let tag_def = (self.get_tag_definition)(&name);
        let mut self_closing = false;
        let end_span = if let Some(end) = self.advance_if(TokenType::TagOpenEndVoid) {
            self_closing = true;
            if !(tag_def.is_void || name.contains(':') || name.contains('-')) {
                self.add_error(
                    format!(
                        "Only void and custom elements can be self closed \"{}\"",
                        name
                    ),
                    start_tag.source_span.clone(),
                );
            }
            end.source_span
        } else if let Some(end) = self.advance_if(TokenType::TagOpenEnd) {
            end.source_span
        } else {
            // unterminated start tag, already reported by the lexer
            self_closing = true;
            start_tag.source_span.clone()
        };

        let start_span = ParseSourceSpan::new(start_tag.source_span.start.clone(), end_span.end);
        let element = Element {
            name: name.clone(),
            attrs,
            children: Vec::new(),
            source_span: start_span.clone(),
            start_source_span: start_span,
            end_source_span: None,
            is_void: tag_def.is_void,
        };

        if let Some(parent) = self.element_stack.last() {
            if (self.get_tag_definition)(&parent.name).is_closed_by_child(&name) {
                self.pop_element(None);
            }
        }

        if self_closing || tag_def.is_void {
            let mut element = element;
            if self_closing {
                element.end_source_span = Some(element.start_source_span.clone());
            }
            self.add_to_parent(Node::Element(element));
        } else {
            self.element_stack.push(element);
        }
    }

    fn consume_attr(&mut self, attr_name: Token) -> Attribute {
        let name = attr_name.part(0).to_string();
        let key_span = attr_name.source_span.clone();
        let mut end = key_span.end.clone();

        if let Some(quote) = self.advance_if(TokenType::AttrQuote) {
            end = quote.source_span.end.clone();
        }
        let mut value = String::new();
        let mut value_span = None;
        if let Some(value_token) = self.advance_if(TokenType::AttrValueText) {
            value = value_token.part(0).to_string();
            end = value_token.source_span.end.clone();
            value_span = Some(value_token.source_span);
        }
        if let Some(quote) = self.advance_if(TokenType::AttrQuote) {
            end = quote.source_span.end.clone();
        }

        Attribute {
            name,
            value,
            source_span: ParseSourceSpan::new(key_span.start.clone(), end),
            key_span,
            value_span,
        }
    }

    fn consume_element_end_tag(&mut self, end_tag: Token) {
        let name = end_tag.part(0).to_string();

        if (self.get_tag_definition)(&name).is_void {
            self.add_error(
                format!("Void elements do not have end tags \"{}\"", name),
                end_tag.source_span,
            );
            return;
        }

        let matching = self
            .element_stack
            .iter()
            .rposition(|e| e.name.eq_ignore_ascii_case(&name));
        let unclosed_between = matching.map_or(true, |index| {
            self.element_stack[index + 1..]
                .iter()
                .any(|e| !(self.get_tag_definition)(&e.name).closed_by_parent)
        });
        match matching {
            Some(index) if !unclosed_between => {
                while self.element_stack.len() > index + 1 {
                    self.pop_element(None);
                }
                self.pop_element(Some(end_tag.source_span));
            }
            _ => self.add_error(
                format!(
                    "Unexpected closing tag \"{}\". It may happen when the tag has already been closed by another tag.",
                    name
                ),
                end_tag.source_span,
            ),
        }
    }

    /// Closes the innermost open element and attaches it to its parent.
    fn pop_element(&mut self, end_span: Option<ParseSourceSpan>) {
        let Some(mut element) = self.element_stack.pop() else {
            return;
        };
        let end = match &end_span {
            Some(span) => Some(span.end.clone()),
            None => element.children.last().map(|c| c.source_span().end.clone()),
        };
        if let Some(end) = end {
            element.source_span = ParseSourceSpan::new(element.start_source_span.start.clone(), end);
        }
        element.end_source_span = end_span;
        self.add_to_parent(Node::Element(element));
    }

    fn add_to_parent(&mut self, node: Node) {
        match self.element_stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root_nodes.push(node),
        }
    }

    fn add_error(&mut self, msg: String, span: ParseSourceSpan) {
        self.errors.push(ParseError::new(span, msg));
    }
}
