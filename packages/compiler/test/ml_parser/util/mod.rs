#![allow(dead_code)]

/**
 * ML Parser Test Utilities
 *
 * Helpers that flatten tokens and markup trees into plain vectors so tests
 * can compare them with literals.
 */
use skein_compiler::ml_parser::{tokenize, Node, ParseTreeResult, Parser, Token, TokenType};
use skein_compiler::parse_util::{ParseError, ParseLocation};

pub fn token_type_name(token_type: TokenType) -> &'static str {
    match token_type {
        TokenType::TagOpenStart => "TAG_OPEN_START",
        TokenType::TagOpenEnd => "TAG_OPEN_END",
        TokenType::TagOpenEndVoid => "TAG_OPEN_END_VOID",
        TokenType::TagClose => "TAG_CLOSE",
        TokenType::Text => "TEXT",
        TokenType::EscapableRawText => "ESCAPABLE_RAW_TEXT",
        TokenType::RawText => "RAW_TEXT",
        TokenType::CommentStart => "COMMENT_START",
        TokenType::CommentEnd => "COMMENT_END",
        TokenType::AttrName => "ATTR_NAME",
        TokenType::AttrQuote => "ATTR_QUOTE",
        TokenType::AttrValueText => "ATTR_VALUE_TEXT",
        TokenType::DocType => "DOC_TYPE",
        TokenType::Eof => "EOF",
    }
}

pub fn humanize_line_column(location: &ParseLocation) -> String {
    format!("{}:{}", location.line, location.col)
}

/// `[type, parts...]` per token.
pub fn tokenize_and_humanize_parts(input: &str) -> Vec<Vec<String>> {
    humanize_parts(&tokenize(input, "test.html").tokens)
}

pub fn humanize_parts(tokens: &[Token]) -> Vec<Vec<String>> {
    tokens
        .iter()
        .map(|token| {
            let mut row = vec![token_type_name(token.token_type).to_string()];
            row.extend(token.parts.iter().cloned());
            row
        })
        .collect()
}

/// `[type, "line:col"]` per token.
pub fn tokenize_and_humanize_line_column(input: &str) -> Vec<Vec<String>> {
    tokenize(input, "test.html")
        .tokens
        .iter()
        .map(|token| {
            vec![
                token_type_name(token.token_type).to_string(),
                humanize_line_column(&token.source_span.start),
            ]
        })
        .collect()
}

/// `[type, source text]` per token.
pub fn tokenize_and_humanize_source_spans(input: &str) -> Vec<Vec<String>> {
    tokenize(input, "test.html")
        .tokens
        .iter()
        .map(|token| {
            vec![
                token_type_name(token.token_type).to_string(),
                token.source_span.snippet().to_string(),
            ]
        })
        .collect()
}

/// `[message, "line:col"]` per lexer error.
pub fn tokenize_and_humanize_errors(input: &str) -> Vec<Vec<String>> {
    humanize_errors(&tokenize(input, "test.html").errors)
}

pub fn humanize_errors(errors: &[ParseError]) -> Vec<Vec<String>> {
    errors
        .iter()
        .map(|e| vec![e.msg.clone(), humanize_line_column(&e.span.start)])
        .collect()
}

pub fn parse(input: &str) -> ParseTreeResult {
    Parser::default().parse(input, "test.html")
}

/// `[kind, content, depth]` per node in document order; attributes follow
/// their element.
pub fn humanize_dom(result: &ParseTreeResult) -> Vec<Vec<String>> {
    assert!(
        result.errors.is_empty(),
        "unexpected parse errors: {:?}",
        humanize_errors(&result.errors)
    );
    let mut out = Vec::new();
    humanize_nodes(&result.root_nodes, 0, &mut out);
    out
}

fn humanize_nodes(nodes: &[Node], depth: usize, out: &mut Vec<Vec<String>>) {
    for node in nodes {
        match node {
            Node::Element(element) => {
                out.push(vec![
                    "Element".to_string(),
                    element.name.clone(),
                    depth.to_string(),
                ]);
                for attr in &element.attrs {
                    out.push(vec![
                        "Attribute".to_string(),
                        attr.name.clone(),
                        attr.value.clone(),
                    ]);
                }
                humanize_nodes(&element.children, depth + 1, out);
            }
            Node::Text(text) => out.push(vec![
                "Text".to_string(),
                text.value.clone(),
                depth.to_string(),
            ]),
            Node::Comment(comment) => out.push(vec![
                "Comment".to_string(),
                comment.value.clone().unwrap_or_default(),
                depth.to_string(),
            ]),
        }
    }
}

pub fn row(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
