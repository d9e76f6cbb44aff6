//! ML Parser Lexer
//!
//! Turns template markup into a flat token stream. Line endings are
//! normalized to `\n` before scanning so every span points into the
//! normalized content.

use super::html_tags::{get_html_tag_definition, TagContentType};
use super::tokens::{Token, TokenType};
use crate::chars;
use crate::parse_util::{ParseError, ParseSourceFile, ParseSourceSpan};

#[derive(Debug, Clone)]
pub struct TokenizeResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<ParseError>,
    pub file: ParseSourceFile,
}

pub fn tokenize(source: &str, url: &str) -> TokenizeResult {
    let content = process_carriage_returns(source);
    let file = ParseSourceFile::new(&content, url);
    let mut tokenizer = Tokenizer::new(file.clone(), &content);
    tokenizer.tokenize();
    TokenizeResult {
        tokens: tokenizer.tokens,
        errors: tokenizer.errors,
        file,
    }
}

fn process_carriage_returns(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut it = content.chars().peekable();
    while let Some(c) = it.next() {
        if c == chars::RETURN {
            if it.peek() == Some(&chars::NEWLINE) {
                it.next();
            }
            result.push(chars::NEWLINE);
        } else {
            result.push(c);
        }
    }
    result
}

struct Tokenizer<'a> {
    file: ParseSourceFile,
    input: &'a str,
    pos: usize,
    current_token_start: Option<usize>,
    current_token_type: Option<TokenType>,
    tokens: Vec<Token>,
    errors: Vec<ParseError>,
}

impl<'a> Tokenizer<'a> {
    fn new(file: ParseSourceFile, input: &'a str) -> Self {
        Tokenizer {
            file,
            input,
            pos: 0,
            current_token_start: None,
            current_token_type: None,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn tokenize(&mut self) {
        while !self.at_end() {
            let start = self.pos;
            if self.is_tag_start() {
                self.attempt_char_code(chars::LT);
                if self.attempt_str("!--") {
                    self.consume_comment(start);
                } else if self.attempt_char_code(chars::BANG) {
                    self.consume_doc_type(start);
                } else if self.attempt_char_code(chars::SLASH) {
                    self.consume_tag_close(start);
                } else {
                    self.consume_tag_open(start);
                }
            } else {
                self.consume_text();
            }
        }
        self.begin_token(TokenType::Eof);
        self.end_token(vec![]);
    }

    // ── Cursor ───────────────────────────────────────────────────────

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn attempt_char_code(&mut self, char_code: char) -> bool {
        if self.peek() == Some(char_code) {
            self.pos += char_code.len_utf8();
            true
        } else {
            false
        }
    }

    fn attempt_str(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn require_char_code(&mut self, char_code: char) -> bool {
        if self.attempt_char_code(char_code) {
            return true;
        }
        let found = self.peek().map_or("EOF".to_string(), String::from);
        self.handle_error(
            format!("Unexpected character \"{}\", expected '{}'", found, char_code),
            self.pos,
        );
        false
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, chars::is_whitespace) {
            self.advance();
        }
    }

    /// `<` followed by something that can start markup.
    fn is_tag_start(&self) -> bool {
        self.peek() == Some(chars::LT)
            && self.peek_second().map_or(false, |c| {
                chars::is_ascii_letter(c) || c == chars::SLASH || c == chars::BANG
            })
    }

    // ── Tokens ───────────────────────────────────────────────────────

    fn begin_token(&mut self, token_type: TokenType) {
        self.begin_token_at(token_type, self.pos);
    }

    fn begin_token_at(&mut self, token_type: TokenType, start: usize) {
        self.current_token_type = Some(token_type);
        self.current_token_start = Some(start);
    }

    fn end_token(&mut self, parts: Vec<String>) {
        let start = self.current_token_start.take().unwrap_or(self.pos);
        let token_type = self.current_token_type.take().unwrap_or(TokenType::Eof);
        let source_span = self.span(start, self.pos);
        self.tokens.push(Token::new(token_type, parts, source_span));
    }

    fn span(&self, start: usize, end: usize) -> ParseSourceSpan {
        ParseSourceSpan::from_offsets(&self.file, start, end)
    }

    fn handle_error(&mut self, msg: String, start: usize) {
        let end = (start + self.peek().map_or(0, char::len_utf8)).max(self.pos);
        let span = self.span(start, end);
        self.errors.push(ParseError::new(span, msg));
    }

    // ── Markup ───────────────────────────────────────────────────────

    fn consume_text(&mut self) {
        self.begin_token(TokenType::Text);
        let mut text = String::new();
        // the first character is text even when it is a stray '<'
        if let Some(ch) = self.peek() {
            if ch == chars::AMPERSAND {
                text.push_str(&self.consume_entity());
            } else {
                self.advance();
                text.push(ch);
            }
        }
        while let Some(ch) = self.peek() {
            if self.is_tag_start() {
                break;
            }
            if ch == chars::AMPERSAND {
                text.push_str(&self.consume_entity());
            } else {
                self.advance();
                text.push(ch);
            }
        }
        self.end_token(vec![text]);
    }

    fn consume_comment(&mut self, start: usize) {
        self.begin_token_at(TokenType::CommentStart, start);
        self.end_token(vec![]);
        self.begin_token(TokenType::RawText);
        let content_start = self.pos;
        let content_end = match self.rest().find("-->") {
            Some(i) => self.pos + i,
            None => {
                self.pos = self.input.len();
                self.end_token(vec![self.input[content_start..].to_string()]);
                self.handle_error("Unterminated comment".to_string(), start);
                return;
            }
        };
        self.pos = content_end;
        self.end_token(vec![self.input[content_start..content_end].to_string()]);
        self.begin_token(TokenType::CommentEnd);
        self.attempt_str("-->");
        self.end_token(vec![]);
    }

    fn consume_doc_type(&mut self, start: usize) {
        self.begin_token_at(TokenType::DocType, start);
        let content_start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == chars::GT {
                break;
            }
            self.advance();
        }
        let content = self.input[content_start..self.pos].to_string();
        self.require_char_code(chars::GT);
        self.end_token(vec![content]);
    }

    fn consume_tag_open(&mut self, start: usize) {
        self.begin_token_at(TokenType::TagOpenStart, start);
        let name = self.read_name();
        self.end_token(vec![name.clone()]);

        loop {
            self.skip_whitespace();
            let token_start = self.pos;
            if self.attempt_str("/>") {
                self.begin_token_at(TokenType::TagOpenEndVoid, token_start);
                self.end_token(vec![]);
                return;
            }
            if self.attempt_char_code(chars::GT) {
                self.begin_token_at(TokenType::TagOpenEnd, token_start);
                self.end_token(vec![]);
                break;
            }
            if self.at_end() {
                self.handle_error(format!("Unexpected EOF in tag \"{}\"", name), start);
                return;
            }
            self.consume_attribute();
        }

        match get_html_tag_definition(&name).content_type {
            TagContentType::RawText => self.consume_raw_text_with_tag_close(&name, false),
            TagContentType::EscapableRawText => self.consume_raw_text_with_tag_close(&name, true),
            TagContentType::ParsableData => {}
        }
    }

    fn consume_attribute(&mut self) {
        let start = self.pos;
        self.begin_token(TokenType::AttrName);
        let name = self.read_name();
        if name.is_empty() {
            self.current_token_start = None;
            self.current_token_type = None;
            let found = self.advance().map_or("EOF".to_string(), String::from);
            self.handle_error(format!("Unexpected character \"{}\"", found), start);
            return;
        }
        self.end_token(vec![name]);

        let before_eq = self.pos;
        self.skip_whitespace();
        if !self.attempt_char_code(chars::EQ) {
            self.pos = before_eq;
            return;
        }
        self.skip_whitespace();
        match self.peek() {
            Some(quote) if quote == chars::SQ || quote == chars::DQ => {
                self.begin_token(TokenType::AttrQuote);
                self.advance();
                self.end_token(vec![quote.to_string()]);

                self.begin_token(TokenType::AttrValueText);
                let mut value = String::new();
                while let Some(ch) = self.peek() {
                    if ch == quote {
                        break;
                    }
                    if ch == chars::AMPERSAND {
                        value.push_str(&self.consume_entity());
                    } else {
                        self.advance();
                        value.push(ch);
                    }
                }
                self.end_token(vec![value]);

                self.begin_token(TokenType::AttrQuote);
                self.require_char_code(quote);
                self.end_token(vec![quote.to_string()]);
            }
            _ => {
                self.begin_token(TokenType::AttrValueText);
                let mut value = String::new();
                while let Some(ch) = self.peek() {
                    if chars::is_whitespace(ch) || ch == chars::GT || self.rest().starts_with("/>")
                    {
                        break;
                    }
                    if ch == chars::AMPERSAND {
                        value.push_str(&self.consume_entity());
                    } else {
                        self.advance();
                        value.push(ch);
                    }
                }
                self.end_token(vec![value]);
            }
        }
    }

    fn consume_tag_close(&mut self, start: usize) {
        self.begin_token_at(TokenType::TagClose, start);
        self.skip_whitespace();
        let name = self.read_name();
        self.skip_whitespace();
        self.require_char_code(chars::GT);
        self.end_token(vec![name]);
    }

    /// Content of `script`, `style`, `textarea` and `title` runs up to the
    /// matching end tag without nested markup.
    fn consume_raw_text_with_tag_close(&mut self, tag_name: &str, consume_entities: bool) {
        let token_type = if consume_entities {
            TokenType::EscapableRawText
        } else {
            TokenType::RawText
        };
        self.begin_token(token_type);
        let mut content = String::new();
        while let Some(ch) = self.peek() {
            if self.is_closing_tag_match(tag_name) {
                break;
            }
            if consume_entities && ch == chars::AMPERSAND {
                content.push_str(&self.consume_entity());
            } else {
                self.advance();
                content.push(ch);
            }
        }
        self.end_token(vec![content]);
        if !self.at_end() {
            let start = self.pos;
            self.attempt_str("</");
            self.consume_tag_close(start);
        }
    }

    fn is_closing_tag_match(&self, tag_name: &str) -> bool {
        let rest = self.rest();
        let Some(after) = rest.strip_prefix("</") else {
            return false;
        };
        let after = after.trim_start();
        after.len() >= tag_name.len()
            && after.is_char_boundary(tag_name.len())
            && after[..tag_name.len()].eq_ignore_ascii_case(tag_name)
            && after[tag_name.len()..]
                .chars()
                .next()
                .map_or(true, chars::is_name_end)
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if chars::is_name_end(ch) {
                break;
            }
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    /// Decodes one character reference at `&`. Anything that is not a
    /// well-formed reference stays literal text.
    fn consume_entity(&mut self) -> String {
        let start = self.pos;
        self.advance();
        let rest = self.rest();
        let Some(end) = rest.find(';').filter(|&end| end > 0 && end <= 32) else {
            return "&".to_string();
        };
        let body = &rest[..end];
        let decoded = if let Some(num) = body.strip_prefix('#') {
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => num.parse::<u32>().ok(),
            };
            match code.and_then(char::from_u32) {
                Some(ch) => ch.to_string(),
                None => {
                    self.pos += end + 1;
                    self.handle_error(
                        format!("Unable to parse entity \"&{};\"", body),
                        start,
                    );
                    return self.input[start..self.pos].to_string();
                }
            }
        } else if body.chars().all(|c| c.is_ascii_alphanumeric()) {
            match named_entity(body) {
                Some(value) => value.to_string(),
                None => {
                    self.pos += end + 1;
                    self.handle_error(
                        format!(
                            "Unknown entity \"{}\" - use the \"&#<decimal>;\" or \"&#x<hex>;\" syntax",
                            body
                        ),
                        start,
                    );
                    return self.input[start..self.pos].to_string();
                }
            }
        } else {
            return "&".to_string();
        };
        self.pos += end + 1;
        decoded
    }
}

fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "hellip" => "\u{2026}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "times" => "\u{d7}",
        _ => return None,
    })
}
