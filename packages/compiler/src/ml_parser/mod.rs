//! ML (Markup Language) Parser Module
//!
//! Parses template files into a markup tree with source spans.

pub mod ast;
pub mod html_tags;
pub mod lexer;
pub mod parser;
pub mod tokens;

pub use ast::*;
pub use html_tags::{get_html_tag_definition, HtmlTagDefinition, TagContentType};
pub use lexer::{tokenize, TokenizeResult};
pub use parser::{ParseTreeResult, Parser};
pub use tokens::{Token, TokenType};
