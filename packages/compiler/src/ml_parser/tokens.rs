//! ML Parser Tokens
//!
//! The flat token stream between the lexer and the tree builder.

use crate::parse_util::ParseSourceSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    TagOpenStart,
    TagOpenEnd,
    TagOpenEndVoid,
    TagClose,
    Text,
    EscapableRawText,
    RawText,
    CommentStart,
    CommentEnd,
    AttrName,
    AttrQuote,
    AttrValueText,
    DocType,
    Eof,
}

/// One token. Text-like tokens carry their decoded content in `parts[0]`;
/// tag tokens carry the tag name.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub parts: Vec<String>,
    pub source_span: ParseSourceSpan,
}

impl Token {
    pub fn new(token_type: TokenType, parts: Vec<String>, source_span: ParseSourceSpan) -> Self {
        Token {
            token_type,
            parts,
            source_span,
        }
    }

    pub fn part(&self, index: usize) -> &str {
        self.parts.get(index).map(String::as_str).unwrap_or("")
    }
}
