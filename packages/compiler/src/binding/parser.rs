//! Binding Parser
//!
//! Recursive descent over one attribute value (or special element text) at
//! a time. Each public function is one grammar entry point; the template
//! walker picks it by attribute name. A value either parses completely or
//! fails with a single error.

use indexmap::IndexMap;

use super::ast::*;
use super::scanner::{BindingError, BindingErrorKind, ScanResult, Scanner};
use crate::chars;
use crate::error::SemanticError;

const PREVENT_DEFAULT: &str = "preventDefault";

// ── Entry points ─────────────────────────────────────────────────────

/// `bound ':' (name | '(' name type ')')`, separated by `,` or `;`.
pub fn parse_bindings(input: &str) -> ScanResult<Vec<Variable>> {
    let mut s = Scanner::new(input);
    separated(&mut s, &[chars::COMMA, chars::SEMICOLON], |s| {
        let value = bound(s)?;
        s.skip_isp();
        s.expect(chars::COLON)?;
        s.skip_isp();
        let (name, ty) = if s.eat(chars::LPAREN) {
            s.skip_isp();
            let name = s.identifier()?;
            require_isp(s)?;
            let ty = param_type(s)?;
            s.skip_isp();
            s.expect(chars::RPAREN)?;
            (name, Some(ty))
        } else {
            (s.identifier()?, None)
        };
        Ok(Variable {
            name,
            ty,
            value,
            path: Path::new(),
        })
    })
}

/// `bound '=' expr`, separated by `,` or `;`.
pub fn parse_assignments(input: &str) -> ScanResult<Vec<Assignment>> {
    let mut s = Scanner::new(input);
    separated(&mut s, &[chars::COMMA, chars::SEMICOLON], |s| {
        let target = bound(s)?;
        s.skip_isp();
        s.expect(chars::EQ)?;
        s.skip_isp();
        let expression = Expression::new(s.expression(&[chars::COMMA, chars::SEMICOLON])?);
        Ok(Assignment {
            target,
            expression,
            path: Path::new(),
        })
    })
}

/// `event ':' handler ('(' mappings ')')? tags?`, separated by `,`.
pub fn parse_captures(input: &str) -> ScanResult<Vec<EventMapping>> {
    let mut s = Scanner::new(input);
    separated(&mut s, &[chars::COMMA], capture)
}

/// `name (',' name)* type ('=' expr)?`, one per line or `;`.
pub fn parse_fields(input: &str) -> ScanResult<Vec<Field>> {
    let mut s = Scanner::new(input);
    let mut fields: Vec<Field> = Vec::new();
    lines(&mut s, |s| {
        let start = s.pos();
        let mut names = vec![s.identifier()?];
        loop {
            s.skip_isp();
            if !s.eat(chars::COMMA) {
                break;
            }
            s.skip_isp();
            names.push(s.identifier()?);
        }
        let ty = param_type(s)?;
        s.skip_isp();
        let default_value = if s.eat(chars::EQ) {
            s.skip_isp();
            Some(Expression::new(s.expression(&[
                chars::NEWLINE,
                chars::RETURN,
                chars::SEMICOLON,
            ])?))
        } else {
            None
        };
        for name in names {
            if fields.iter().any(|f| f.name == name) {
                return Err(s.semantic(SemanticError::DuplicateMember(name), start));
            }
            fields.push(Field {
                name,
                ty: ty.clone(),
                default_value: default_value.clone(),
            });
        }
        Ok(())
    })?;
    Ok(fields)
}

/// `name '(' (param (',' param)*)? ')' type?`, one per line or `;`.
pub fn parse_handlers(input: &str) -> ScanResult<IndexMap<String, HandlerSpec>> {
    let mut s = Scanner::new(input);
    let mut handlers = IndexMap::new();
    lines(&mut s, |s| {
        let start = s.pos();
        let name = s.identifier()?;
        s.skip_isp();
        s.expect(chars::LPAREN)?;
        s.skip_isp();
        let mut params: Vec<Param> = Vec::new();
        if !s.eat(chars::RPAREN) {
            loop {
                let param_start = s.pos();
                let param_name = s.identifier()?;
                require_isp(s)?;
                let ty = param_type(s)?;
                if params.iter().any(|p| p.name == param_name) {
                    return Err(s.semantic(SemanticError::DuplicateParam(param_name), param_start));
                }
                params.push(Param {
                    name: param_name,
                    ty,
                });
                s.skip_isp();
                if s.eat(chars::RPAREN) {
                    break;
                }
                s.expect(chars::COMMA)?;
                s.skip_isp();
            }
        }
        s.skip_isp();
        let returns = if s.peek().map_or(false, |c| c != chars::SEMICOLON && !chars::is_whitespace(c)) {
            Some(param_type(s)?)
        } else {
            None
        };
        if handlers.contains_key(&name) {
            return Err(s.semantic(SemanticError::DuplicateHandler(name), start));
        }
        handlers.insert(name, HandlerSpec { params, returns });
        Ok(())
    })?;
    Ok(handlers)
}

/// `('var')? name type`, separated by `,`. Only the last parameter may be
/// variadic.
pub fn parse_cparams(input: &str) -> ScanResult<Vec<ComponentParam>> {
    let mut s = Scanner::new(input);
    let mut params: Vec<ComponentParam> = Vec::new();
    s.skip_ws();
    while !s.at_end() {
        let start = s.pos();
        let is_variadic = s.eat_keyword("var") && {
            require_isp(&mut s)?;
            true
        };
        let name = s.identifier()?;
        require_isp(&mut s)?;
        let ty = param_type(&mut s)?;
        if params.iter().any(|p| p.name == name) {
            return Err(s.semantic(SemanticError::DuplicateParam(name), start));
        }
        if let Some(last) = params.last().filter(|p| p.is_variadic) {
            return Err(s.semantic(SemanticError::VariadicNotLast(last.name.clone()), start));
        }
        params.push(ComponentParam {
            name,
            ty,
            is_variadic,
        });
        s.skip_ws();
        if s.at_end() {
            break;
        }
        s.expect(chars::COMMA)?;
        s.skip_ws();
    }
    Ok(params)
}

/// `index (',' item)? ':=' 'range' expr`
pub fn parse_for(input: &str) -> ScanResult<ForLoop> {
    let mut s = Scanner::new(input);
    s.skip_ws();
    let index_var = s.identifier()?;
    s.skip_isp();
    let item_var = if s.eat(chars::COMMA) {
        s.skip_isp();
        let item = s.identifier()?;
        s.skip_isp();
        Some(item)
    } else {
        None
    };
    if !s.eat_str(":=") {
        return Err(s.syntax("':='"));
    }
    s.skip_isp();
    if !s.eat_keyword("range") {
        return Err(s.syntax("'range'"));
    }
    require_isp(&mut s)?;
    let expression = Expression::new(s.expression(&[])?);
    Ok(ForLoop {
        index_var,
        item_var,
        expression,
    })
}

/// One opaque expression spanning the whole input, as in `if` conditions.
pub fn parse_expression(input: &str) -> ScanResult<Expression> {
    let mut s = Scanner::new(input);
    s.skip_ws();
    s.expression(&[]).map(Expression::new)
}

/// Opaque expressions separated by `,`.
pub fn parse_args(input: &str) -> ScanResult<Vec<Expression>> {
    let mut s = Scanner::new(input);
    separated(&mut s, &[chars::COMMA], |s| {
        s.expression(&[chars::COMMA]).map(Expression::new)
    })
}

/// `(alias)? '"' path '"'`, one per line or `;`. The alias defaults to the
/// last path segment.
pub fn parse_imports(input: &str) -> ScanResult<IndexMap<String, String>> {
    let mut s = Scanner::new(input);
    let mut imports = IndexMap::new();
    lines(&mut s, |s| {
        let start = s.pos();
        let alias = if s.peek() == Some(chars::DQ) {
            None
        } else {
            let alias = s.identifier()?;
            require_isp(s)?;
            Some(alias)
        };
        let path_start = s.pos();
        let path = s.string_literal()?;
        if path.trim().is_empty() {
            return Err(BindingError {
                kind: BindingErrorKind::Syntax("import path".to_string()),
                start: path_start,
                end: s.pos(),
            });
        }
        let alias = match alias {
            Some(alias) => alias,
            None => default_alias(&path),
        };
        if imports.contains_key(&alias) {
            return Err(s.semantic(SemanticError::DuplicateImport(alias), start));
        }
        imports.insert(alias, path.replace('/', "::"));
        Ok(())
    })?;
    Ok(imports)
}

/// A standalone type, as used in attribute-level declarations.
pub fn parse_type(input: &str) -> ScanResult<ParamType> {
    let mut s = Scanner::new(input);
    s.skip_ws();
    let ty = param_type(&mut s)?;
    s.skip_ws();
    if !s.at_end() {
        return Err(s.syntax("end of type"));
    }
    Ok(ty)
}

// ── Shared productions ───────────────────────────────────────────────

/// `self() | dataset(id) | prop(id) | style(id) | class(id, ...) |
/// form(id) | event(id?)`, keywords case-insensitive.
fn bound(s: &mut Scanner) -> ScanResult<BoundValue> {
    let kind = [
        ("self", BoundKind::SelfNode),
        ("dataset", BoundKind::Dataset),
        ("prop", BoundKind::Property),
        ("style", BoundKind::Style),
        ("class", BoundKind::Class),
        ("form", BoundKind::FormValue),
        ("event", BoundKind::EventValue),
    ]
    .into_iter()
    .find(|(keyword, _)| s.eat_keyword(keyword))
    .map(|(_, kind)| kind)
    .ok_or_else(|| s.syntax("bound value"))?;
    s.skip_isp();
    s.expect(chars::LPAREN)?;
    s.skip_isp();
    let ids = match kind {
        BoundKind::SelfNode => Vec::new(),
        BoundKind::EventValue if s.peek() == Some(chars::RPAREN) => vec![String::new()],
        BoundKind::EventValue | BoundKind::Property => vec![s.identifier()?],
        BoundKind::Class => {
            let mut ids: Vec<String> = Vec::new();
            loop {
                let start = s.pos();
                let id = s.html_id()?;
                if ids.contains(&id) {
                    return Err(s.semantic(SemanticError::DuplicateClass(id), start));
                }
                ids.push(id);
                s.skip_isp();
                if !s.eat(chars::COMMA) {
                    break;
                }
                s.skip_isp();
            }
            ids
        }
        BoundKind::Dataset | BoundKind::Style | BoundKind::FormValue => vec![s.html_id()?],
    };
    s.skip_isp();
    s.expect(chars::RPAREN)?;
    Ok(BoundValue::new(kind, ids))
}

fn capture(s: &mut Scanner) -> ScanResult<EventMapping> {
    let event = s.event_id()?;
    s.skip_isp();
    s.expect(chars::COLON)?;
    s.skip_isp();
    let handler = s.identifier()?;
    s.skip_isp();
    let mut param_mappings = IndexMap::new();
    if s.eat(chars::LPAREN) {
        s.skip_isp();
        if !s.eat(chars::RPAREN) {
            loop {
                let start = s.pos();
                let name = s.identifier()?;
                s.skip_isp();
                s.expect(chars::EQ)?;
                s.skip_isp();
                let value = bound(s)?;
                if param_mappings.contains_key(&name) {
                    return Err(s.semantic(SemanticError::DuplicateParam(name), start));
                }
                param_mappings.insert(name, value);
                s.skip_isp();
                if s.eat(chars::RPAREN) {
                    break;
                }
                s.expect(chars::COMMA)?;
                s.skip_isp();
            }
        }
        s.skip_isp();
    }
    let handling = if s.peek() == Some(chars::LBRACE) {
        tags(s)?
    } else {
        EventHandling::AutoPreventDefault
    };
    Ok(EventMapping {
        event,
        handler,
        param_mappings,
        handling,
    })
}

/// `'{' tag (',' tag)* '}'`; `preventDefault` is the only tag.
fn tags(s: &mut Scanner) -> ScanResult<EventHandling> {
    s.expect(chars::LBRACE)?;
    let mut handling = None;
    loop {
        s.skip_isp();
        let start = s.pos();
        let name = s.identifier()?;
        s.skip_isp();
        let mut args = Vec::new();
        if s.eat(chars::LPAREN) {
            s.skip_isp();
            if !s.eat(chars::RPAREN) {
                loop {
                    args.push(s.html_id()?);
                    s.skip_isp();
                    if s.eat(chars::RPAREN) {
                        break;
                    }
                    s.expect(chars::COMMA)?;
                    s.skip_isp();
                }
            }
        }
        if name != PREVENT_DEFAULT {
            return Err(s.semantic(SemanticError::UnknownTag(name), start));
        }
        if handling.is_some() {
            return Err(s.semantic(SemanticError::DuplicateTag(name), start));
        }
        handling = Some(match args.as_slice() {
            [] => EventHandling::PreventDefault,
            [arg] => match arg.as_str() {
                "true" => EventHandling::PreventDefault,
                "false" => EventHandling::DontPreventDefault,
                "ask" => EventHandling::AskPreventDefault,
                _ => {
                    return Err(s.semantic(
                        SemanticError::InvalidTagArgument {
                            tag: name,
                            argument: arg.clone(),
                        },
                        start,
                    ))
                }
            },
            _ => return Err(s.semantic(SemanticError::TooManyTagArguments(name), start)),
        });
        s.skip_isp();
        if s.eat(chars::RBRACE) {
            break;
        }
        s.expect(chars::COMMA)?;
    }
    Ok(handling.unwrap_or_default())
}

/// `'(' (type (',' type)*)? ')' | path ('<' type (',' type)* '>')?`
fn param_type(s: &mut Scanner) -> ScanResult<ParamType> {
    if s.eat(chars::LPAREN) {
        let mut items = Vec::new();
        s.skip_isp();
        while !s.eat(chars::RPAREN) {
            items.push(param_type(s)?);
            s.skip_isp();
            if s.eat(chars::RPAREN) {
                break;
            }
            s.expect(chars::COMMA)?;
            s.skip_isp();
        }
        return Ok(ParamType::Tuple(items));
    }
    let base = s.qualified_name().map_err(|_| s.syntax("type"))?;
    if !s.eat(chars::LT) {
        return Ok(ParamType::from_path(&base));
    }
    let mut args = Vec::new();
    loop {
        s.skip_isp();
        args.push(param_type(s)?);
        s.skip_isp();
        if s.eat(chars::GT) {
            break;
        }
        s.expect(chars::COMMA)?;
    }
    Ok(ParamType::Generic { base, args })
}

// ── Combinators ──────────────────────────────────────────────────────

/// Items separated by any of `separators`; blank input yields no items and
/// a trailing separator is allowed.
fn separated<T>(
    s: &mut Scanner,
    separators: &[char],
    mut item: impl FnMut(&mut Scanner) -> ScanResult<T>,
) -> ScanResult<Vec<T>> {
    let mut items = Vec::new();
    s.skip_ws();
    while !s.at_end() {
        items.push(item(s)?);
        s.skip_ws();
        if s.at_end() {
            break;
        }
        match s.peek() {
            Some(c) if separators.contains(&c) => s.advance(1),
            _ => return Err(s.syntax("separator or end of input")),
        }
        s.skip_ws();
    }
    Ok(items)
}

/// Line-oriented items, separated by line breaks or `;`.
fn lines(s: &mut Scanner, mut item: impl FnMut(&mut Scanner) -> ScanResult<()>) -> ScanResult<()> {
    s.skip_separators();
    while !s.at_end() {
        item(s)?;
        s.skip_isp();
        match s.peek() {
            None => break,
            Some(c) if c == chars::SEMICOLON || c == chars::NEWLINE || c == chars::RETURN => {}
            Some(_) => return Err(s.syntax("line break or ';'")),
        }
        s.skip_separators();
    }
    Ok(())
}

/// At least one space or tab.
fn require_isp(s: &mut Scanner) -> ScanResult<()> {
    if !s.peek().map_or(false, chars::is_inline_space) {
        return Err(s.syntax("space"));
    }
    s.skip_isp();
    Ok(())
}

fn default_alias(path: &str) -> String {
    path.rsplit(|c| c == '/' || c == ':')
        .find(|segment| !segment.is_empty())
        .unwrap_or(path)
        .replace('-', "_")
}
