//! Character constants and classes shared by the markup lexer and the
//! binding scanner.

pub const TAB: char = '\t';
pub const NEWLINE: char = '\n';
pub const RETURN: char = '\r';
pub const SPACE: char = ' ';

pub const BANG: char = '!';
pub const DQ: char = '"';
pub const SQ: char = '\'';
pub const BT: char = '`';
pub const AMPERSAND: char = '&';
pub const LPAREN: char = '(';
pub const RPAREN: char = ')';
pub const COMMA: char = ',';
pub const MINUS: char = '-';
pub const SLASH: char = '/';
pub const COLON: char = ':';
pub const SEMICOLON: char = ';';
pub const LT: char = '<';
pub const EQ: char = '=';
pub const GT: char = '>';
pub const LBRACKET: char = '[';
pub const BACKSLASH: char = '\\';
pub const RBRACKET: char = ']';
pub const LBRACE: char = '{';
pub const RBRACE: char = '}';
pub const UNDERSCORE: char = '_';

pub fn is_whitespace(ch: char) -> bool {
    ch == SPACE || ch == TAB || ch == NEWLINE || ch == RETURN || ch == '\x0C'
}

/// Inline space: blanks that never end a line-oriented item.
pub fn is_inline_space(ch: char) -> bool {
    ch == SPACE || ch == TAB
}

pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

pub fn is_ascii_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

pub fn is_identifier_start(ch: char) -> bool {
    is_ascii_letter(ch) || ch == UNDERSCORE
}

pub fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || is_digit(ch)
}

/// Characters allowed in HTML ids, class names and data keys.
pub fn is_html_id_part(ch: char) -> bool {
    is_identifier_part(ch) || ch == MINUS
}

pub fn is_quote(ch: char) -> bool {
    ch == SQ || ch == DQ || ch == BT
}

/// End of a tag or attribute name in markup.
pub fn is_name_end(ch: char) -> bool {
    is_whitespace(ch) || ch == GT || ch == LT || ch == SLASH || ch == SQ || ch == DQ || ch == EQ
}
