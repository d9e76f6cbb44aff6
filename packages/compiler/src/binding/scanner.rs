//! Binding Scanner
//!
//! Character-level helpers shared by every production of the binding
//! grammar. Positions are byte offsets into the attribute value.

use crate::chars;
use crate::error::{CompileError, Production, SemanticError};
use crate::parse_util::ParseSourceSpan;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingErrorKind {
    Syntax(String),
    Semantic(SemanticError),
}

/// A failure inside one attribute value, before it is placed in its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingError {
    pub kind: BindingErrorKind,
    pub start: usize,
    pub end: usize,
}

impl BindingError {
    pub fn semantic(error: SemanticError, start: usize, end: usize) -> Self {
        BindingError {
            kind: BindingErrorKind::Semantic(error),
            start,
            end,
        }
    }

    pub fn semantic_error(&self) -> Option<&SemanticError> {
        match &self.kind {
            BindingErrorKind::Semantic(e) => Some(e),
            BindingErrorKind::Syntax(_) => None,
        }
    }

    /// Places the error inside the span of the attribute value it came from.
    pub fn locate(self, production: Production, value_span: &ParseSourceSpan) -> CompileError {
        let span = value_span.sub_span(self.start, self.end);
        match self.kind {
            BindingErrorKind::Syntax(expected) => CompileError::Syntax {
                production,
                expected,
                span,
            },
            BindingErrorKind::Semantic(error) => CompileError::Semantic { error, span },
        }
    }
}

pub type ScanResult<T> = Result<T, BindingError>;

pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Scanner { input, pos: 0 }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.advance(ch.len_utf8());
        Some(ch)
    }

    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance(ch.len_utf8());
            true
        } else {
            false
        }
    }

    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.remaining().starts_with(s) {
            self.advance(s.len());
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, ch: char) -> ScanResult<()> {
        if self.eat(ch) {
            Ok(())
        } else {
            Err(self.syntax(&format!("'{}'", ch)))
        }
    }

    /// Eats a case-insensitive keyword not followed by an identifier
    /// character.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        let rest = self.remaining();
        if rest.len() < keyword.len() || !rest.is_char_boundary(keyword.len()) {
            return false;
        }
        let (head, tail) = rest.split_at(keyword.len());
        let boundary = tail.chars().next().map_or(true, |c| !chars::is_identifier_part(c));
        if head.eq_ignore_ascii_case(keyword) && boundary {
            self.advance(keyword.len());
            true
        } else {
            false
        }
    }

    /// Spaces and tabs.
    pub fn skip_isp(&mut self) {
        while self.peek().map_or(false, chars::is_inline_space) {
            self.advance(1);
        }
    }

    /// Any whitespace including line breaks.
    pub fn skip_ws(&mut self) {
        while self.peek().map_or(false, chars::is_whitespace) {
            self.advance(1);
        }
    }

    /// Skips blank space and item separators between line-oriented items.
    pub fn skip_separators(&mut self) {
        while self
            .peek()
            .map_or(false, |c| chars::is_whitespace(c) || c == chars::SEMICOLON)
        {
            self.advance(1);
        }
    }

    pub fn syntax(&self, expected: &str) -> BindingError {
        let len = self.peek().map_or(0, char::len_utf8);
        BindingError {
            kind: BindingErrorKind::Syntax(expected.to_string()),
            start: self.pos,
            end: self.pos + len,
        }
    }

    pub fn semantic(&self, error: SemanticError, start: usize) -> BindingError {
        BindingError::semantic(error, start, self.pos.max(start))
    }

    // ── Lexemes ──────────────────────────────────────────────────────

    /// `[A-Za-z_][A-Za-z0-9_]*`
    pub fn identifier(&mut self) -> ScanResult<String> {
        match self.peek() {
            Some(c) if chars::is_identifier_start(c) => {}
            _ => return Err(self.syntax("identifier")),
        }
        let start = self.pos;
        while self.peek().map_or(false, chars::is_identifier_part) {
            self.advance(1);
        }
        Ok(self.input[start..self.pos].to_string())
    }

    /// `[a-z]+`, the name of a DOM event.
    pub fn event_id(&mut self) -> ScanResult<String> {
        let start = self.pos;
        while self.peek().map_or(false, |c| c.is_ascii_lowercase()) {
            self.advance(1);
        }
        if start == self.pos {
            return Err(self.syntax("event name"));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    /// `[A-Za-z0-9_-]+`
    pub fn html_id(&mut self) -> ScanResult<String> {
        let start = self.pos;
        while self.peek().map_or(false, chars::is_html_id_part) {
            self.advance(1);
        }
        if start == self.pos {
            return Err(self.syntax("HTML id"));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    /// `identifier ('::' identifier)*`
    pub fn qualified_name(&mut self) -> ScanResult<String> {
        let mut name = self.identifier()?;
        while self.remaining().starts_with("::") {
            self.advance(2);
            name.push_str("::");
            name.push_str(&self.identifier()?);
        }
        Ok(name)
    }

    /// Captures an opaque expression up to the first top-level terminator.
    /// Brackets nest and string or char literals are skipped whole. Returns
    /// the trimmed source.
    pub fn expression(&mut self, terminators: &[char]) -> ScanResult<String> {
        let start = self.pos;
        let mut stack: Vec<char> = Vec::new();
        while let Some(ch) = self.peek() {
            if stack.is_empty() && terminators.contains(&ch) {
                break;
            }
            match ch {
                chars::LPAREN => stack.push(chars::RPAREN),
                chars::LBRACE => stack.push(chars::RBRACE),
                chars::LBRACKET => stack.push(chars::RBRACKET),
                chars::RPAREN | chars::RBRACE | chars::RBRACKET => {
                    if stack.pop() != Some(ch) {
                        return Err(self.syntax("balanced brackets"));
                    }
                }
                chars::DQ => {
                    self.string_literal()?;
                    continue;
                }
                chars::SQ => {
                    self.char_literal();
                    continue;
                }
                chars::BT => {
                    self.raw_quoted(chars::BT)?;
                    continue;
                }
                _ => {}
            }
            self.bump();
        }
        if let Some(open) = stack.last() {
            return Err(self.syntax(&format!("'{}'", open)));
        }
        let source = self.input[start..self.pos].trim();
        if source.is_empty() {
            self.pos = start;
            return Err(self.syntax("expression"));
        }
        Ok(source.to_string())
    }

    /// `"..."` with backslash escapes.
    pub fn string_literal(&mut self) -> ScanResult<String> {
        let start = self.pos;
        self.expect(chars::DQ)?;
        let content_start = self.pos;
        loop {
            match self.bump() {
                Some(chars::BACKSLASH) => {
                    self.bump();
                }
                Some(chars::DQ) => break,
                Some(_) => {}
                None => {
                    return Err(BindingError {
                        kind: BindingErrorKind::Syntax("closing '\"'".to_string()),
                        start,
                        end: self.pos,
                    })
                }
            }
        }
        Ok(self.input[content_start..self.pos - 1].to_string())
    }

    /// Skips a literal without escapes, such as `` `...` ``.
    fn raw_quoted(&mut self, quote: char) -> ScanResult<()> {
        let start = self.pos;
        self.advance(quote.len_utf8());
        match self.remaining().find(quote) {
            Some(i) => {
                self.advance(i + quote.len_utf8());
                Ok(())
            }
            None => Err(BindingError {
                kind: BindingErrorKind::Syntax(format!("closing '{}'", quote)),
                start,
                end: self.input.len(),
            }),
        }
    }

    /// Skips `'x'` or `'\n'`; a lone quote (a lifetime) is consumed by
    /// itself.
    fn char_literal(&mut self) {
        let rest = self.remaining();
        let mut it = rest.char_indices().skip(1);
        let end = match it.next() {
            Some((_, chars::BACKSLASH)) => rest
                .get(3..)
                .and_then(|r| r.find(chars::SQ))
                .map(|i| i + 4),
            Some((i, c)) => {
                let close = i + c.len_utf8();
                rest[close..].starts_with(chars::SQ).then_some(close + 1)
            }
            None => None,
        };
        self.advance(end.unwrap_or(1));
    }
}
