//! Emitter Context
//!
//! Line buffer with indentation tracking that generators print into.

const INDENT_WITH: &str = "    ";

#[derive(Debug, Clone)]
struct EmittedLine {
    parts: Vec<String>,
    indent: usize,
}

impl EmittedLine {
    fn new(indent: usize) -> Self {
        EmittedLine {
            parts: Vec::new(),
            indent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmitterVisitorContext {
    lines: Vec<EmittedLine>,
    indent: usize,
}

impl Default for EmitterVisitorContext {
    fn default() -> Self {
        EmitterVisitorContext::create_root()
    }
}

impl EmitterVisitorContext {
    pub fn create_root() -> Self {
        EmitterVisitorContext::new(0)
    }

    pub fn new(indent: usize) -> Self {
        EmitterVisitorContext {
            lines: vec![EmittedLine::new(indent)],
            indent,
        }
    }

    pub fn println(&mut self, last_part: &str) {
        self.print(last_part, true);
    }

    pub fn line_is_empty(&self) -> bool {
        self.lines.last().map_or(true, |l| l.parts.is_empty())
    }

    pub fn print(&mut self, part: &str, new_line: bool) {
        if !part.is_empty() {
            match self.lines.last_mut() {
                Some(current) => current.parts.push(part.to_string()),
                None => {
                    let mut line = EmittedLine::new(self.indent);
                    line.parts.push(part.to_string());
                    self.lines.push(line);
                }
            }
        }
        if new_line {
            self.lines.push(EmittedLine::new(self.indent));
        }
    }

    /// Ends the current line if anything was printed on it, then emits an
    /// empty one.
    pub fn blank_line(&mut self) {
        if !self.line_is_empty() {
            self.println("");
        }
        let ends_blank = self.lines.len() >= 2
            && self.lines[self.lines.len() - 2].parts.is_empty();
        if !ends_blank {
            self.println("");
        }
    }

    /// Prints `open`, runs `body` one level deeper, then prints `close`.
    pub fn block(&mut self, open: &str, close: &str, body: impl FnOnce(&mut Self)) {
        self.println(open);
        self.inc_indent();
        body(self);
        self.dec_indent();
        self.println(close);
    }

    pub fn inc_indent(&mut self) {
        self.indent += 1;
        let indent = self.indent;
        if self.line_is_empty() {
            if let Some(line) = self.lines.last_mut() {
                line.indent = indent;
            }
        }
    }

    pub fn dec_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        let indent = self.indent;
        if self.line_is_empty() {
            if let Some(line) = self.lines.last_mut() {
                line.indent = indent;
            }
        }
    }

    pub fn to_source(&self) -> String {
        let mut lines: Vec<String> = self
            .lines
            .iter()
            .map(|l| {
                if l.parts.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", INDENT_WITH.repeat(l.indent), l.parts.concat())
                }
            })
            .collect();
        while lines.last().map_or(false, String::is_empty) {
            lines.pop();
        }
        let mut source = lines.join("\n");
        source.push('\n');
        source
    }
}

/// Rust string literal for `value`.
pub fn escape_string(value: &str) -> String {
    format!("{:?}", value)
}
