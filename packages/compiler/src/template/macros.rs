//! Template Macros
//!
//! `<a:macro name="X">` defines reusable markup at the top level of a
//! template file. `<a:include name="X">` anywhere inside a component is
//! replaced by a copy of the macro body before the component is walked.
//!
//! A macro body marks its holes with `<a:slot>`. An include fills a named
//! slot with a `<a:slot name="...">` child of its own, and the unnamed
//! slot with its remaining content. Slots left unfilled keep their
//! children as default content.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::config::Vocabulary;
use crate::error::{CompileError, Result};
use crate::ml_parser::{Element, Node, Parser};
use crate::parse_util::ParseSourceSpan;

use super::walker::check_identifier;

#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    pub name: String,
    pub body: Vec<Node>,
    /// Start tag of the definition.
    pub span: ParseSourceSpan,
}

/// Macros visible to the components being compiled. Names are global
/// across packages.
#[derive(Debug, Clone, Default)]
pub struct MacroSet {
    macros: IndexMap<String, Macro>,
}

/// Content an include hands to the slots of its macro.
struct Fillers {
    named: IndexMap<String, (Vec<Node>, ParseSourceSpan)>,
    unnamed: Vec<Node>,
    used: HashSet<String>,
    unnamed_used: bool,
}

impl MacroSet {
    pub fn new() -> Self {
        MacroSet::default()
    }

    pub fn get(&self, name: &str) -> Option<&Macro> {
        self.macros.get(name)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Collects the macros of template files given as `(url, content)`.
    /// Files with markup errors are skipped; compiling them reports those.
    pub fn collect_sources(
        &mut self,
        vocab: &Vocabulary,
        sources: &[(String, String)],
    ) -> Vec<CompileError> {
        let mut errors = Vec::new();
        for (url, content) in sources {
            let tree = Parser::default().parse(content, url);
            if tree.errors.is_empty() {
                let mut roots = tree.root_nodes;
                errors.extend(self.collect(vocab, &mut roots));
            }
        }
        errors
    }

    /// Moves the macro definitions out of `roots`. Collecting the same
    /// definition twice is a no-op.
    pub fn collect(&mut self, vocab: &Vocabulary, roots: &mut Vec<Node>) -> Vec<CompileError> {
        let mut errors = Vec::new();
        let mut kept = Vec::with_capacity(roots.len());
        for node in roots.drain(..) {
            match node {
                Node::Element(element) if vocab.is(&element.name, &vocab.macro_) => {
                    if let Err(e) = self.define(element) {
                        errors.push(e);
                    }
                }
                other => kept.push(other),
            }
        }
        *roots = kept;
        errors
    }

    fn define(&mut self, element: Element) -> Result<()> {
        let mut name = None;
        for attr in &element.attrs {
            if attr.name != "name" {
                return Err(unknown_attribute(&element, &attr.name, &attr.key_span));
            }
            check_identifier(&attr.value, "macro name", attr.value_or_key_span())?;
            name = Some(attr.value.clone());
        }
        let name = name.ok_or_else(|| requires_name(&element))?;

        if let Some(existing) = self.macros.get(&name) {
            if existing.span == element.start_source_span {
                return Ok(());
            }
            return Err(CompileError::structural(
                format!("macro `{}` is defined more than once", name),
                &element.start_source_span,
            ));
        }

        log::debug!("macro {} with {} root node(s)", name, element.children.len());
        self.macros.insert(
            name.clone(),
            Macro {
                name,
                body: element.children,
                span: element.start_source_span,
            },
        );
        Ok(())
    }

    /// Expands the includes of every component in `roots`. A component
    /// whose expansion fails is removed and its error returned.
    pub fn expand_components(&self, vocab: &Vocabulary, roots: &mut Vec<Node>) -> Vec<CompileError> {
        let mut errors = Vec::new();
        roots.retain_mut(|node| match node {
            Node::Element(element) if vocab.is(&element.name, &vocab.component) => {
                match self.expand(vocab, element) {
                    Ok(()) => true,
                    Err(e) => {
                        errors.push(e);
                        false
                    }
                }
            }
            _ => true,
        });
        errors
    }

    /// Replaces every include below `element`.
    pub fn expand(&self, vocab: &Vocabulary, element: &mut Element) -> Result<()> {
        self.expand_nodes(vocab, &mut element.children, &mut Vec::new())
    }

    fn expand_nodes(
        &self,
        vocab: &Vocabulary,
        nodes: &mut Vec<Node>,
        active: &mut Vec<String>,
    ) -> Result<()> {
        let mut expanded = Vec::with_capacity(nodes.len());
        for node in nodes.drain(..) {
            match node {
                Node::Element(element) if vocab.is(&element.name, &vocab.include) => {
                    expanded.extend(self.include(vocab, element, active)?);
                }
                Node::Element(mut element) => {
                    self.expand_nodes(vocab, &mut element.children, active)?;
                    expanded.push(Node::Element(element));
                }
                other => expanded.push(other),
            }
        }
        *nodes = expanded;
        Ok(())
    }

    fn include(
        &self,
        vocab: &Vocabulary,
        element: Element,
        active: &mut Vec<String>,
    ) -> Result<Vec<Node>> {
        let mut name = None;
        for attr in &element.attrs {
            if attr.name != "name" {
                return Err(unknown_attribute(&element, &attr.name, &attr.key_span));
            }
            name = Some(attr.value.clone());
        }
        let name = name.ok_or_else(|| requires_name(&element))?;
        let span = &element.start_source_span;
        let Some(definition) = self.macros.get(&name) else {
            return Err(CompileError::structural(
                format!("unknown macro `{}`", name),
                span,
            ));
        };
        if active.contains(&name) {
            return Err(CompileError::structural(
                format!("macro `{}` includes itself", name),
                span,
            ));
        }

        let mut fillers = Fillers::from_include(vocab, element.children)?;
        for (content, _) in fillers.named.values_mut() {
            self.expand_nodes(vocab, content, active)?;
        }
        self.expand_nodes(vocab, &mut fillers.unnamed, active)?;

        let mut body = definition.body.clone();
        fill_slots(vocab, &mut body, &mut fillers)?;
        if let Some((slot, (_, slot_span))) = fillers
            .named
            .iter()
            .find(|(slot, _)| !fillers.used.contains(*slot))
        {
            return Err(CompileError::structural(
                format!("macro `{}` has no slot `{}`", name, slot),
                slot_span,
            ));
        }
        if !fillers.unnamed_used && fillers.unnamed.iter().any(|n| !n.is_blank_text()) {
            return Err(CompileError::structural(
                format!("macro `{}` has no unnamed slot", name),
                span,
            ));
        }

        active.push(name);
        let expanded = self.expand_nodes(vocab, &mut body, active);
        active.pop();
        expanded?;
        Ok(body)
    }
}

impl Fillers {
    fn from_include(vocab: &Vocabulary, children: Vec<Node>) -> Result<Fillers> {
        let mut named: IndexMap<String, (Vec<Node>, ParseSourceSpan)> = IndexMap::new();
        let mut unnamed = Vec::new();
        for node in children {
            match node {
                Node::Element(slot) if vocab.is(&slot.name, &vocab.slot) => {
                    let name = slot_name(&slot)?.ok_or_else(|| requires_name(&slot))?;
                    if named.contains_key(&name) {
                        return Err(CompileError::structural(
                            format!("slot `{}` is filled more than once", name),
                            &slot.start_source_span,
                        ));
                    }
                    named.insert(name, (slot.children, slot.start_source_span));
                }
                other => unnamed.push(other),
            }
        }
        Ok(Fillers {
            named,
            unnamed,
            used: HashSet::new(),
            unnamed_used: false,
        })
    }
}

/// Replaces the slots of a macro body with the include's content, or with
/// their defaults.
fn fill_slots(vocab: &Vocabulary, nodes: &mut Vec<Node>, fillers: &mut Fillers) -> Result<()> {
    let mut filled = Vec::with_capacity(nodes.len());
    for node in nodes.drain(..) {
        match node {
            Node::Element(slot) if vocab.is(&slot.name, &vocab.slot) => {
                let content = match slot_name(&slot)? {
                    Some(name) => match fillers.named.get(&name) {
                        Some((content, _)) => {
                            let content = content.clone();
                            fillers.used.insert(name);
                            Some(content)
                        }
                        None => None,
                    },
                    None if fillers.unnamed.iter().any(|n| !n.is_blank_text()) => {
                        fillers.unnamed_used = true;
                        Some(fillers.unnamed.clone())
                    }
                    None => None,
                };
                filled.extend(content.unwrap_or(slot.children));
            }
            // slots directly below a nested include are its fillers
            Node::Element(mut include) if vocab.is(&include.name, &vocab.include) => {
                let mut children = Vec::with_capacity(include.children.len());
                for child in include.children.drain(..) {
                    match child {
                        Node::Element(mut filler) if vocab.is(&filler.name, &vocab.slot) => {
                            fill_slots(vocab, &mut filler.children, fillers)?;
                            children.push(Node::Element(filler));
                        }
                        other => {
                            let mut one = vec![other];
                            fill_slots(vocab, &mut one, fillers)?;
                            children.extend(one);
                        }
                    }
                }
                include.children = children;
                filled.push(Node::Element(include));
            }
            Node::Element(mut element) => {
                fill_slots(vocab, &mut element.children, fillers)?;
                filled.push(Node::Element(element));
            }
            other => filled.push(other),
        }
    }
    *nodes = filled;
    Ok(())
}

fn slot_name(slot: &Element) -> Result<Option<String>> {
    let mut name = None;
    for attr in &slot.attrs {
        if attr.name != "name" {
            return Err(unknown_attribute(slot, &attr.name, &attr.key_span));
        }
        name = Some(attr.value.clone());
    }
    Ok(name)
}

fn unknown_attribute(element: &Element, name: &str, span: &ParseSourceSpan) -> CompileError {
    CompileError::structural(
        format!("unknown attribute `{}` on <{}>", name, element.name),
        span,
    )
}

fn requires_name(element: &Element) -> CompileError {
    CompileError::structural(
        format!("<{}> requires a name", element.name),
        &element.start_source_span,
    )
}
