//! Template Walker
//!
//! Turns the markup of one template file into component models. Special
//! elements become fields, handlers and controller methods. Binding
//! attributes are parsed, stripped and recorded against the path of the
//! node carrying them. Embeds are replaced by anchor comments.

use std::collections::HashSet;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::path;
use crate::binding::scanner::ScanResult;
use crate::binding::{self, *};
use crate::config::Vocabulary;
use crate::error::{CompileError, Production, Result, SemanticError};
use crate::ml_parser::{Attribute, Comment, Element, Node};
use crate::parse_util::{ParseSourceFile, ParseSourceSpan};

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
        "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
        "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait",
        "true", "type", "unsafe", "use", "where", "while",
    ]
    .into_iter()
    .collect()
});

/// Top-level contents of one template file.
#[derive(Debug)]
pub struct TemplateFile {
    pub imports: IndexMap<String, String>,
    /// One result per `<a:component>`, in source order.
    pub components: Vec<Result<WalkedComponent>>,
    /// Names of the components whose walk failed.
    pub failed: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct WalkedComponent {
    pub component: Component,
    /// Normalized template with binding attributes stripped and embeds
    /// replaced by anchors.
    pub template: Vec<Node>,
    pub spans: ComponentSpans,
}

/// Source spans for the model's parts, index-aligned with the model.
#[derive(Debug, Clone)]
pub struct ComponentSpans {
    pub component: ParseSourceSpan,
    pub fields: ParseSourceSpan,
    pub handlers: ParseSourceSpan,
    pub controller: ParseSourceSpan,
    pub variables: Vec<ParseSourceSpan>,
    pub captures: Vec<ParseSourceSpan>,
    pub embeds: Vec<ParseSourceSpan>,
}

impl ComponentSpans {
    fn new(component: ParseSourceSpan) -> Self {
        ComponentSpans {
            fields: component.clone(),
            handlers: component.clone(),
            controller: component.clone(),
            component,
            variables: Vec::new(),
            captures: Vec::new(),
            embeds: Vec::new(),
        }
    }
}

/// What other components need to know about a component before it is
/// walked.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDecl {
    pub name: String,
    pub has_controller: bool,
    pub span: ParseSourceSpan,
}

pub struct TemplateWalker<'v> {
    vocab: &'v Vocabulary,
}

impl<'v> TemplateWalker<'v> {
    pub fn new(vocab: &'v Vocabulary) -> Self {
        TemplateWalker { vocab }
    }

    /// Component names and controller presence, without walking bodies.
    pub fn declarations(&self, roots: &[Node]) -> Vec<ComponentDecl> {
        roots
            .iter()
            .filter_map(Node::as_element)
            .filter(|e| self.vocab.is(&e.name, &self.vocab.component))
            .filter_map(|e| {
                let name = e.attr_value("name")?;
                let has_controller = e.child_elements().any(|c| {
                    self.vocab.is(&c.name, &self.vocab.controller)
                        && c.children
                            .iter()
                            .any(|n| matches!(n, Node::Text(t) if !t.value.trim().is_empty()))
                });
                Some(ComponentDecl {
                    name: name.to_string(),
                    has_controller,
                    span: e.start_source_span.clone(),
                })
            })
            .collect()
    }

    /// Walks a parsed file. Errors in the file's structure or imports fail
    /// the whole file; errors inside a component only fail that component.
    pub fn walk_file(&self, roots: Vec<Node>) -> Result<TemplateFile> {
        let mut imports: IndexMap<String, String> = IndexMap::new();
        let mut components = Vec::new();

        for node in roots {
            match node {
                Node::Comment(_) => {}
                Node::Text(ref text) if text.value.trim().is_empty() => {}
                Node::Element(element) if self.vocab.is(&element.name, &self.vocab.import) => {
                    add_imports(&mut imports, &element)?;
                }
                Node::Element(element) if self.vocab.is(&element.name, &self.vocab.component) => {
                    components.push(element)
                }
                // collected by the macro set before walking
                Node::Element(element) if self.vocab.is(&element.name, &self.vocab.macro_) => {}
                other => {
                    return Err(CompileError::structural(
                        format!(
                            "only <{}>, <{}> and <{}> may appear at the top level",
                            self.vocab.import, self.vocab.macro_, self.vocab.component
                        ),
                        other.source_span(),
                    ))
                }
            }
        }

        log::debug!(
            "walking {} component(s) with {} import(s)",
            components.len(),
            imports.len()
        );
        let mut failed = Vec::new();
        let components = components
            .into_iter()
            .map(|element| {
                let name = element.attr_value("name").map(str::to_string);
                let walked = self.walk_component(element, &imports);
                if let (Err(_), Some(name)) = (&walked, name) {
                    failed.push(name);
                }
                walked
            })
            .collect();
        Ok(TemplateFile {
            imports,
            components,
            failed,
        })
    }

    /// Walks the skeleton of a site: imports plus one document element
    /// whose only dynamic content are embeds. The result is a component
    /// named `name` without fields, handlers or a controller.
    pub fn walk_skeleton(
        &self,
        roots: Vec<Node>,
        name: &str,
        url: &str,
    ) -> Result<(IndexMap<String, String>, WalkedComponent)> {
        let mut imports: IndexMap<String, String> = IndexMap::new();
        let mut document: Option<Element> = None;
        for node in roots {
            match node {
                Node::Comment(_) => {}
                Node::Text(ref text) if text.value.trim().is_empty() => {}
                Node::Element(element) if self.vocab.is(&element.name, &self.vocab.import) => {
                    add_imports(&mut imports, &element)?;
                }
                Node::Element(element) if document.is_none() && !self.vocab.owns(&element.name) => {
                    document = Some(element);
                }
                other => {
                    return Err(CompileError::structural(
                        format!(
                            "a skeleton holds <{}> and a single document element",
                            self.vocab.import
                        ),
                        other.source_span(),
                    ))
                }
            }
        }
        let Some(document) = document else {
            return Err(CompileError::structural(
                "the skeleton has no document element",
                &ParseSourceSpan::from_offsets(&ParseSourceFile::new("", url), 0, 0),
            ));
        };

        let document_span = document.start_source_span.clone();
        let mut template = vec![Node::Element(document)];
        path::normalize(&mut template);

        let spans = ComponentSpans::new(document_span.clone());
        let mut walker = ComponentWalker::new(self.vocab, &imports, spans);
        let mut ctx = WalkContext::root();
        walker.walk_nodes(&mut template, &mut ctx)?;

        let only_embeds = |span: &ParseSourceSpan| {
            CompileError::structural(
                format!("a skeleton may only contain <{}>", self.vocab.embed),
                span,
            )
        };
        if let Some(span) = walker.spans.variables.first().or(walker.spans.captures.first()) {
            return Err(only_embeds(span));
        }
        if !ctx.block.is_empty() {
            return Err(only_embeds(&document_span));
        }
        if let Some((embed, span)) = walker
            .embeds
            .iter()
            .zip(&walker.spans.embeds)
            .find(|(e, _)| e.control)
        {
            return Err(CompileError::structural(
                format!("skeleton embed `{}` has no controller to report to", embed.field),
                span,
            ));
        }

        log::debug!("skeleton: {} embed(s)", walker.embeds.len());
        let walked = WalkedComponent {
            component: Component {
                name: name.to_string(),
                parameters: Vec::new(),
                fields: Vec::new(),
                variables: Vec::new(),
                block: Block::default(),
                captures: Vec::new(),
                embeds: walker.embeds,
                handlers: IndexMap::new(),
                controller_methods: IndexMap::new(),
            },
            template,
            spans: walker.spans,
        };
        Ok((imports, walked))
    }

    fn walk_component(
        &self,
        element: Element,
        imports: &IndexMap<String, String>,
    ) -> Result<WalkedComponent> {
        let mut name = None;
        let mut parameters = Vec::new();
        for attr in &element.attrs {
            match attr.name.as_str() {
                "name" => {
                    check_identifier(&attr.value, "component name", attr.value_or_key_span())?;
                    name = Some(attr.value.clone());
                }
                "params" => {
                    parameters = locate(
                        binding::parse_cparams(&attr.value),
                        Production::ComponentParams,
                        attr,
                    )?;
                }
                other => {
                    return Err(CompileError::structural(
                        format!("unknown attribute `{}` on <{}>", other, element.name),
                        &attr.key_span,
                    ))
                }
            }
        }
        let name = name.ok_or_else(|| {
            CompileError::structural(
                format!("<{}> requires a name", element.name),
                &element.start_source_span,
            )
        })?;

        let mut spans = ComponentSpans::new(element.start_source_span.clone());
        let mut fields = None;
        let mut handlers = None;
        let mut controller = None;
        let mut template = Vec::new();
        for child in element.children {
            match child {
                Node::Element(special) if self.vocab.is(&special.name, &self.vocab.data) => {
                    spans.fields = take_special(
                        &mut fields,
                        &special,
                        Production::Fields,
                        binding::parse_fields,
                    )?;
                }
                Node::Element(special) if self.vocab.is(&special.name, &self.vocab.handlers) => {
                    spans.handlers = take_special(
                        &mut handlers,
                        &special,
                        Production::Handlers,
                        binding::parse_handlers,
                    )?;
                }
                Node::Element(special) if self.vocab.is(&special.name, &self.vocab.controller) => {
                    spans.controller = take_special(
                        &mut controller,
                        &special,
                        Production::Handlers,
                        binding::parse_handlers,
                    )?;
                }
                other => template.push(other),
            }
        }

        path::normalize(&mut template);
        path::trim_root_whitespace(&mut template);

        let mut walker = ComponentWalker::new(self.vocab, imports, spans);
        let mut ctx = WalkContext::root();
        walker.walk_nodes(&mut template, &mut ctx)?;

        log::debug!(
            "component {}: {} variable(s), {} capture(s), {} embed(s)",
            name,
            walker.variables.len(),
            walker.captures.len(),
            walker.embeds.len()
        );
        Ok(WalkedComponent {
            component: Component {
                name,
                parameters,
                fields: fields.unwrap_or_default(),
                variables: walker.variables,
                block: ctx.block,
                captures: walker.captures,
                embeds: walker.embeds,
                handlers: handlers.unwrap_or_default(),
                controller_methods: controller.unwrap_or_default(),
            },
            template,
            spans: walker.spans,
        })
    }
}

/// Where the walk currently is: the path from the enclosing block's root
/// and the block receiving assignments.
struct WalkContext {
    path: Path,
    block: Block,
    controlled: bool,
}

impl WalkContext {
    fn root() -> Self {
        WalkContext {
            path: Path::new(),
            block: Block::default(),
            controlled: false,
        }
    }

    fn nested() -> Self {
        WalkContext {
            path: Path::new(),
            block: Block::default(),
            controlled: true,
        }
    }
}

/// Named controls of an enclosing `<form>`; the flag marks radio groups.
struct FormScope {
    depth: usize,
    controls: IndexMap<String, bool>,
}

#[derive(Default)]
struct BindingAttrs {
    bindings: Option<Attribute>,
    assign: Option<Attribute>,
    capture: Option<Attribute>,
    if_: Option<Attribute>,
    for_: Option<Attribute>,
}

struct ComponentWalker<'a> {
    vocab: &'a Vocabulary,
    imports: &'a IndexMap<String, String>,
    variables: Vec<Variable>,
    captures: Vec<Capture>,
    embeds: Vec<Embed>,
    spans: ComponentSpans,
    forms: Vec<FormScope>,
    depth: usize,
}

impl<'a> ComponentWalker<'a> {
    fn new(
        vocab: &'a Vocabulary,
        imports: &'a IndexMap<String, String>,
        spans: ComponentSpans,
    ) -> Self {
        ComponentWalker {
            vocab,
            imports,
            variables: Vec::new(),
            captures: Vec::new(),
            embeds: Vec::new(),
            spans,
            forms: Vec::new(),
            depth: 0,
        }
    }

    fn walk_nodes(&mut self, nodes: &mut [Node], ctx: &mut WalkContext) -> Result<()> {
        for (index, node) in nodes.iter_mut().enumerate() {
            ctx.path.push(index);
            let result = self.walk_node(node, ctx);
            ctx.path.pop();
            result?;
        }
        Ok(())
    }

    fn walk_node(&mut self, node: &mut Node, ctx: &mut WalkContext) -> Result<()> {
        let Node::Element(element) = node else {
            return Ok(());
        };
        if self.vocab.is(&element.name, &self.vocab.embed) {
            let anchor = self.embed(element, ctx)?;
            *node = anchor;
            return Ok(());
        }
        if self.vocab.owns(&element.name) {
            return Err(CompileError::structural(
                format!("<{}> is not allowed here", element.name),
                &element.start_source_span,
            ));
        }

        let attrs = self.take_binding_attrs(element)?;
        let is_form = element.name.eq_ignore_ascii_case("form");
        if is_form {
            let scope = self.form_scope(element);
            self.forms.push(scope);
        }
        let result = self.walk_element(element, &attrs, ctx);
        if is_form {
            self.forms.pop();
        }
        result
    }

    fn walk_element(
        &mut self,
        element: &mut Element,
        attrs: &BindingAttrs,
        ctx: &mut WalkContext,
    ) -> Result<()> {
        match (&attrs.if_, &attrs.for_) {
            (Some(_), Some(attr)) => Err(CompileError::structural(
                format!(
                    "<{}> cannot carry both {} and {}",
                    element.name, self.vocab.if_, self.vocab.for_
                ),
                &attr.key_span,
            )),
            (Some(attr), None) => {
                let expression =
                    locate(binding::parse_expression(&attr.value), Production::Expression, attr)?;
                let block = self.walk_nested(element, attrs)?;
                ctx.block.controlled.push(ControlledBlock::Conditional {
                    expression,
                    path: ctx.path.clone(),
                    block,
                });
                Ok(())
            }
            (None, Some(attr)) => {
                let ForLoop {
                    index_var,
                    item_var,
                    expression,
                } = locate(binding::parse_for(&attr.value), Production::For, attr)?;
                let block = self.walk_nested(element, attrs)?;
                ctx.block.controlled.push(ControlledBlock::Repeated {
                    expression,
                    index_var,
                    item_var,
                    path: ctx.path.clone(),
                    block,
                });
                Ok(())
            }
            (None, None) => {
                self.apply_attrs(element, attrs, ctx)?;
                self.walk_children(element, ctx)
            }
        }
    }

    /// The element and its subtree form a new block rooted at the element.
    fn walk_nested(&mut self, element: &mut Element, attrs: &BindingAttrs) -> Result<Block> {
        let mut inner = WalkContext::nested();
        self.apply_attrs(element, attrs, &mut inner)?;
        self.walk_children(element, &mut inner)?;
        Ok(inner.block)
    }

    fn walk_children(&mut self, element: &mut Element, ctx: &mut WalkContext) -> Result<()> {
        self.depth += 1;
        let result = self.walk_nodes(&mut element.children, ctx);
        self.depth -= 1;
        result
    }

    /// Removes the vocabulary's attributes from `element`.
    fn take_binding_attrs(&self, element: &mut Element) -> Result<BindingAttrs> {
        let vocab = self.vocab;
        let mut found = BindingAttrs::default();
        for attr in std::mem::take(&mut element.attrs) {
            if !vocab.owns(&attr.name) {
                element.attrs.push(attr);
                continue;
            }
            let slot = if vocab.is(&attr.name, &vocab.bindings) {
                &mut found.bindings
            } else if vocab.is(&attr.name, &vocab.assign) {
                &mut found.assign
            } else if vocab.is(&attr.name, &vocab.capture) {
                &mut found.capture
            } else if vocab.is(&attr.name, &vocab.if_) {
                &mut found.if_
            } else if vocab.is(&attr.name, &vocab.for_) {
                &mut found.for_
            } else {
                return Err(CompileError::structural(
                    format!("unknown attribute `{}`", attr.name),
                    &attr.key_span,
                ));
            };
            if slot.is_some() {
                return Err(CompileError::structural(
                    format!("duplicate attribute `{}`", attr.name),
                    &attr.key_span,
                ));
            }
            *slot = Some(attr);
        }
        Ok(found)
    }

    fn apply_attrs(
        &mut self,
        element: &Element,
        attrs: &BindingAttrs,
        ctx: &mut WalkContext,
    ) -> Result<()> {
        if let Some(attr) = &attrs.bindings {
            let variables = locate(binding::parse_bindings(&attr.value), Production::Bindings, attr)?;
            if ctx.controlled && !variables.is_empty() {
                return Err(self.not_in_controlled_block("variables", attr));
            }
            for mut variable in variables {
                reject_event_value(&variable.value, attr)?;
                if replaces_content(&variable.value, false) {
                    self.reject_bound_descendants(element, &variable.value, attr)?;
                }
                self.resolve_form(&mut variable.value, attr)?;
                variable.path = ctx.path.clone();
                self.variables.push(variable);
                self.spans.variables.push(attr.source_span.clone());
            }
        }

        if let Some(attr) = &attrs.assign {
            let assignments =
                locate(binding::parse_assignments(&attr.value), Production::Assignments, attr)?;
            for mut assignment in assignments {
                reject_event_value(&assignment.target, attr)?;
                if replaces_content(&assignment.target, true) {
                    self.reject_bound_descendants(element, &assignment.target, attr)?;
                }
                self.resolve_form(&mut assignment.target, attr)?;
                assignment.path = ctx.path.clone();
                ctx.block.assignments.push(assignment);
            }
        }

        if let Some(attr) = &attrs.capture {
            let mut mappings =
                locate(binding::parse_captures(&attr.value), Production::Captures, attr)?;
            if mappings.is_empty() {
                return Ok(());
            }
            if ctx.controlled {
                return Err(self.not_in_controlled_block("captures", attr));
            }
            for mapping in &mut mappings {
                for value in mapping.param_mappings.values_mut() {
                    self.resolve_form(value, attr)?;
                }
            }
            self.captures.push(Capture {
                path: ctx.path.clone(),
                mappings,
            });
            self.spans.captures.push(attr.source_span.clone());
        }
        Ok(())
    }

    /// Writing `value` would replace the children of `element`, which must
    /// not hold any recorded path.
    fn reject_bound_descendants(
        &self,
        element: &Element,
        value: &BoundValue,
        attr: &Attribute,
    ) -> Result<()> {
        fn bound(vocab: &Vocabulary, nodes: &[Node]) -> bool {
            nodes.iter().filter_map(Node::as_element).any(|e| {
                vocab.owns(&e.name)
                    || e.attrs.iter().any(|a| vocab.owns(&a.name))
                    || bound(vocab, &e.children)
            })
        }

        if bound(self.vocab, &element.children) {
            return Err(CompileError::structural(
                format!(
                    "{} replaces the content of <{}>, whose descendants carry bindings",
                    value, element.name
                ),
                &attr.source_span,
            ));
        }
        Ok(())
    }

    fn not_in_controlled_block(&self, what: &str, attr: &Attribute) -> CompileError {
        CompileError::structural(
            format!(
                "{} cannot be declared inside {} or {} blocks",
                what, self.vocab.if_, self.vocab.for_
            ),
            &attr.source_span,
        )
    }

    /// Fills in the depth to the enclosing form and whether the control is a
    /// radio group.
    fn resolve_form(&self, value: &mut BoundValue, attr: &Attribute) -> Result<()> {
        if value.kind != BoundKind::FormValue {
            return Ok(());
        }
        let scope = self.forms.last().ok_or_else(|| {
            CompileError::structural(
                format!("{} is not inside a <form>", value),
                &attr.source_span,
            )
        })?;
        let is_radio = scope.controls.get(value.id()).copied().ok_or_else(|| {
            CompileError::structural(
                format!("the enclosing <form> has no control named `{}`", value.id()),
                &attr.source_span,
            )
        })?;
        value.form_depth = self.depth - scope.depth;
        value.is_radio = is_radio;
        Ok(())
    }

    fn form_scope(&self, form: &Element) -> FormScope {
        fn visit(vocab: &Vocabulary, nodes: &[Node], controls: &mut IndexMap<String, bool>) {
            for element in nodes.iter().filter_map(Node::as_element) {
                if vocab.owns(&element.name) {
                    continue;
                }
                if let Some(name) = element.attr_value("name") {
                    let radio = element
                        .attr_value("type")
                        .map_or(false, |t| t.eq_ignore_ascii_case("radio"));
                    *controls.entry(name.to_string()).or_insert(false) |= radio;
                }
                visit(vocab, &element.children, controls);
            }
        }

        let mut controls = IndexMap::new();
        visit(self.vocab, &form.children, &mut controls);
        FormScope {
            depth: self.depth,
            controls,
        }
    }

    /// Records an embed and returns the anchor that replaces it.
    fn embed(&mut self, element: &Element, ctx: &WalkContext) -> Result<Node> {
        if ctx.controlled {
            return Err(CompileError::structural(
                format!(
                    "<{}> cannot appear inside {} or {} blocks",
                    element.name, self.vocab.if_, self.vocab.for_
                ),
                &element.start_source_span,
            ));
        }

        let mut field = None;
        let mut component_type = None;
        let mut list = false;
        let mut optional = false;
        let mut control = false;
        let mut args = None;
        for attr in &element.attrs {
            match attr.name.to_ascii_lowercase().as_str() {
                "name" => {
                    check_identifier(&attr.value, "embed name", attr.value_or_key_span())?;
                    field = Some(attr.value.clone());
                }
                "type" => component_type = Some(self.embed_type(attr)?),
                "list" => list = true,
                "optional" => optional = true,
                "control" => control = true,
                "args" => args = Some(locate(binding::parse_args(&attr.value), Production::Args, attr)?),
                _ => {
                    return Err(CompileError::structural(
                        format!("unknown attribute `{}` on <{}>", attr.name, element.name),
                        &attr.key_span,
                    ))
                }
            }
        }

        let field = field.ok_or_else(|| {
            CompileError::structural(
                format!("<{}> requires a name", element.name),
                &element.start_source_span,
            )
        })?;
        let (namespace, component_type) = component_type.ok_or_else(|| {
            CompileError::structural(
                format!("<{}> requires a type", element.name),
                &element.start_source_span,
            )
        })?;
        let kind = match (list, optional) {
            (true, true) => {
                return Err(CompileError::structural(
                    "an embed cannot be both list and optional",
                    &element.start_source_span,
                ))
            }
            (true, false) => EmbedKind::List,
            (false, true) => EmbedKind::Optional,
            (false, false) => EmbedKind::Direct,
        };
        if kind != EmbedKind::Direct && args.is_some() {
            return Err(CompileError::structural(
                format!(
                    "list and optional embeds take their arguments from <{}>",
                    self.vocab.construct
                ),
                &element.start_source_span,
            ));
        }

        let mut constructor_calls = Vec::new();
        for child in &element.children {
            let construct = match child {
                Node::Element(e) if self.vocab.is(&e.name, &self.vocab.construct) => e,
                Node::Text(t) if t.value.trim().is_empty() => continue,
                Node::Comment(_) => continue,
                other => {
                    return Err(CompileError::structural(
                        format!("<{}> may only contain <{}>", element.name, self.vocab.construct),
                        other.source_span(),
                    ))
                }
            };
            if kind == EmbedKind::Direct {
                return Err(CompileError::structural(
                    format!("<{}> requires a list or optional embed", construct.name),
                    &construct.start_source_span,
                ));
            }
            constructor_calls.push(self.construct(construct)?);
        }

        self.embeds.push(Embed {
            field: field.clone(),
            component_type,
            namespace,
            kind,
            path: ctx.path.clone(),
            constructor_args: args.unwrap_or_default(),
            control,
            constructor_calls,
        });
        self.spans.embeds.push(element.start_source_span.clone());
        Ok(Node::Comment(Comment::new(
            Some(field),
            element.source_span.clone(),
        )))
    }

    /// `Name` or `alias.Name`, where the alias names an import.
    fn embed_type(&self, attr: &Attribute) -> Result<(Option<String>, String)> {
        let span = attr.value_or_key_span();
        let value = attr.value.trim();
        let (namespace, name) = match value.split_once('.') {
            Some((namespace, name)) => (Some(namespace), name),
            None => (None, value),
        };
        check_identifier(name, "component type", span)?;
        if let Some(namespace) = namespace {
            if !self.imports.contains_key(namespace) {
                return Err(CompileError::structural(
                    format!("`{}` is not an imported package", namespace),
                    span,
                ));
            }
        }
        Ok((namespace.map(str::to_string), name.to_string()))
    }

    fn construct(&self, element: &Element) -> Result<ConstructorCall> {
        if let Some(child) = element.child_elements().next() {
            return Err(CompileError::structural(
                format!("<{}> cannot have child elements", element.name),
                &child.start_source_span,
            ));
        }

        let mut args = Vec::new();
        let mut condition = None;
        let mut repeat = None;
        for attr in &element.attrs {
            if attr.name.eq_ignore_ascii_case("args") {
                args = locate(binding::parse_args(&attr.value), Production::Args, attr)?;
            } else if self.vocab.is(&attr.name, &self.vocab.if_) {
                condition = Some(locate(
                    binding::parse_expression(&attr.value),
                    Production::Expression,
                    attr,
                )?);
            } else if self.vocab.is(&attr.name, &self.vocab.for_) {
                repeat = Some(locate(binding::parse_for(&attr.value), Production::For, attr)?);
            } else {
                return Err(CompileError::structural(
                    format!("unknown attribute `{}` on <{}>", attr.name, element.name),
                    &attr.key_span,
                ));
            }
        }

        let kind = match (condition, repeat) {
            (Some(_), Some(_)) => {
                return Err(CompileError::structural(
                    format!(
                        "<{}> cannot carry both {} and {}",
                        element.name, self.vocab.if_, self.vocab.for_
                    ),
                    &element.start_source_span,
                ))
            }
            (Some(expression), None) => ConstructorKind::Conditional { expression },
            (None, Some(ForLoop {
                index_var,
                item_var,
                expression,
            })) => ConstructorKind::Repeated {
                expression,
                index_var,
                item_var,
            },
            (None, None) => ConstructorKind::Unconditional,
        };
        Ok(ConstructorCall { kind, args })
    }
}

fn locate<T>(result: ScanResult<T>, production: Production, attr: &Attribute) -> Result<T> {
    result.map_err(|e| e.locate(production, attr.value_or_key_span()))
}

/// Merges the aliases of one `<a:import>` element into `imports`.
fn add_imports(imports: &mut IndexMap<String, String>, element: &Element) -> Result<()> {
    let (text, span) = special_text(element)?;
    let parsed =
        binding::parse_imports(&text).map_err(|e| e.locate(Production::Imports, &span))?;
    for (alias, import_path) in parsed {
        if imports.contains_key(&alias) {
            return Err(CompileError::semantic(
                SemanticError::DuplicateImport(alias),
                &element.start_source_span,
            ));
        }
        imports.insert(alias, import_path);
    }
    Ok(())
}

/// Whether writing `value` discards the node's children. A variable bound
/// to `self()` is a node handle and only replaces when written explicitly.
fn replaces_content(value: &BoundValue, assigned: bool) -> bool {
    match value.kind {
        BoundKind::SelfNode => assigned,
        BoundKind::Property => matches!(
            value.id(),
            "textContent" | "innerHTML" | "innerText" | "outerHTML"
        ),
        _ => false,
    }
}

fn reject_event_value(value: &BoundValue, attr: &Attribute) -> Result<()> {
    if value.kind == BoundKind::EventValue {
        return Err(CompileError::structural(
            "event() is only available in capture parameter mappings",
            &attr.source_span,
        ));
    }
    Ok(())
}

/// Parses a special element's text into `slot`, returning its span.
fn take_special<T>(
    slot: &mut Option<T>,
    special: &Element,
    production: Production,
    parse: fn(&str) -> ScanResult<T>,
) -> Result<ParseSourceSpan> {
    if slot.is_some() {
        return Err(CompileError::structural(
            format!("duplicate <{}>", special.name),
            &special.start_source_span,
        ));
    }
    let (text, span) = special_text(special)?;
    *slot = Some(parse(&text).map_err(|e| e.locate(production, &span))?);
    Ok(special.start_source_span.clone())
}

/// Text content of a special element, with the span it came from.
fn special_text(element: &Element) -> Result<(String, ParseSourceSpan)> {
    let mut text = String::new();
    let mut span: Option<ParseSourceSpan> = None;
    for child in &element.children {
        match child {
            Node::Text(t) => {
                text.push_str(&t.value);
                span = Some(match span {
                    Some(s) => ParseSourceSpan::new(s.start, t.source_span.end.clone()),
                    None => t.source_span.clone(),
                });
            }
            other => {
                return Err(CompileError::structural(
                    format!("<{}> may only contain text", element.name),
                    other.source_span(),
                ))
            }
        }
    }
    let span = span.unwrap_or_else(|| element.start_source_span.clone());
    Ok((text, span))
}

pub fn check_identifier(name: &str, what: &str, span: &ParseSourceSpan) -> Result<()> {
    if !IDENTIFIER.is_match(name) {
        return Err(CompileError::structural(
            format!("`{}` is not a valid {}", name, what),
            span,
        ));
    }
    if RESERVED_WORDS.contains(name) {
        return Err(CompileError::structural(
            format!("{} `{}` is a reserved word", what, name),
            span,
        ));
    }
    Ok(())
}
