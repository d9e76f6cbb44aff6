//! Parse Utilities
//!
//! Source files, locations and spans shared by the markup parser and the
//! binding parser. Lines and columns are zero-based internally and printed
//! one-based.

use std::fmt;
use std::sync::Arc;

use crate::chars;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseSourceFile {
    pub content: Arc<str>,
    pub url: Arc<str>,
}

impl ParseSourceFile {
    pub fn new(content: &str, url: &str) -> Self {
        ParseSourceFile {
            content: Arc::from(content),
            url: Arc::from(url),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseLocation {
    pub file: ParseSourceFile,
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl ParseLocation {
    pub fn new(file: ParseSourceFile, offset: usize, line: usize, col: usize) -> Self {
        ParseLocation {
            file,
            offset,
            line,
            col,
        }
    }

    /// Computes line and column for a byte offset.
    pub fn from_offset(file: &ParseSourceFile, offset: usize) -> Self {
        let offset = floor_boundary(&file.content, offset);
        let consumed = &file.content[..offset];
        let line = consumed.matches(chars::NEWLINE).count();
        let line_start = consumed.rfind(chars::NEWLINE).map_or(0, |i| i + 1);
        let col = consumed[line_start..].chars().count();
        ParseLocation::new(file.clone(), offset, line, col)
    }

    /// Moves forward `delta` bytes, tracking line breaks.
    pub fn move_by(&self, delta: usize) -> ParseLocation {
        let source = &self.file.content;
        let target = floor_boundary(source, self.offset + delta);
        let mut line = self.line;
        let mut col = self.col;
        for ch in source[self.offset..target].chars() {
            if ch == chars::NEWLINE {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        ParseLocation::new(self.file.clone(), target, line, col)
    }

    /// Source around the location, up to `max_chars` on each side and
    /// without crossing more than `max_lines` line breaks.
    pub fn get_context(&self, max_chars: usize, max_lines: usize) -> (String, String) {
        let content = &self.file.content;
        let before: String = {
            let mut taken = Vec::new();
            let mut lines = 0;
            for ch in content[..self.offset].chars().rev().take(max_chars) {
                if ch == chars::NEWLINE {
                    lines += 1;
                    if lines >= max_lines {
                        break;
                    }
                }
                taken.push(ch);
            }
            taken.into_iter().rev().collect()
        };
        let mut after = String::new();
        let mut lines = 0;
        for ch in content[self.offset..].chars().take(max_chars) {
            if ch == chars::NEWLINE {
                lines += 1;
                if lines >= max_lines {
                    break;
                }
            }
            after.push(ch);
        }
        (before, after)
    }
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.url, self.line + 1, self.col + 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseSourceSpan {
    pub start: ParseLocation,
    pub end: ParseLocation,
    pub details: Option<String>,
}

impl ParseSourceSpan {
    pub fn new(start: ParseLocation, end: ParseLocation) -> Self {
        ParseSourceSpan {
            start,
            end,
            details: None,
        }
    }

    pub fn from_offsets(file: &ParseSourceFile, start: usize, end: usize) -> Self {
        let start = ParseLocation::from_offset(file, start);
        let end = ParseLocation::from_offset(file, end.max(start.offset));
        ParseSourceSpan::new(start, end)
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }

    /// A sub-span at byte offsets relative to this span's start.
    pub fn sub_span(&self, start: usize, end: usize) -> ParseSourceSpan {
        let from = self.start.move_by(start);
        let to = self.start.move_by(end.max(start));
        ParseSourceSpan::new(from, to)
    }

    pub fn snippet(&self) -> &str {
        let content = &self.start.file.content;
        let end = self.end.offset.min(content.len());
        &content[self.start.offset.min(end)..end]
    }
}

impl fmt::Display for ParseSourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)?;
        let snippet = self.snippet();
        if !snippet.is_empty() {
            write!(f, " (\"{}\")", snippet.escape_debug())?;
        }
        if let Some(details) = &self.details {
            write!(f, ", {}", details)?;
        }
        Ok(())
    }
}

fn floor_boundary(s: &str, offset: usize) -> usize {
    let mut offset = offset.min(s.len());
    while !s.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Errors of the markup parser.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub span: ParseSourceSpan,
    pub msg: String,
}

impl ParseError {
    pub fn new(span: ParseSourceSpan, msg: impl Into<String>) -> Self {
        ParseError {
            span,
            msg: msg.into(),
        }
    }

    pub fn contextual_message(&self) -> String {
        let (before, after) = self.span.start.get_context(100, 3);
        format!("{} (\"{}[ERROR ->]{}\")", self.msg, before, after)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.contextual_message(), self.span.start)
    }
}
