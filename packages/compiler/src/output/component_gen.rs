//! Component Generation
//!
//! Renders one component model as a Rust module against the runtime crate,
//! which the module refers to as `rt`. The module contains the template
//! builder, the component struct, its constructor and `init`, one
//! trampoline per handler, the controller trait and the `rt::Component`
//! implementation.

use indexmap::IndexMap;

use super::emitter::{escape_string, EmitterVisitorContext};
use super::template_gen::{emit_template_fn, TEMPLATE_FN};
use crate::binding::*;
use crate::config::CompilerConfig;
use crate::ml_parser::Node;
use crate::template::path;

pub const GENERATED_HEADER: &str = "// Code generated by skein. DO NOT EDIT.";

/// Container aliases to emit next to a component because some component
/// of the package embeds it that way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbedAliases {
    pub list: bool,
    pub optional: bool,
}

pub fn controller_trait_name(component: &str) -> String {
    format!("{}Controller", component)
}

pub fn list_alias_name(component: &str) -> String {
    format!("{}List", component)
}

pub fn optional_alias_name(component: &str) -> String {
    format!("Optional{}", component)
}

pub struct ComponentGenerator<'a> {
    config: &'a CompilerConfig,
    imports: &'a IndexMap<String, String>,
    component: &'a Component,
    template: &'a [Node],
    aliases: EmbedAliases,
    counter: usize,
}

/// Paths resolved so far within one block, relative to `base`.
struct NodeScope {
    base: String,
    names: IndexMap<Path, String>,
}

impl NodeScope {
    fn new(base: impl Into<String>) -> Self {
        NodeScope {
            base: base.into(),
            names: IndexMap::new(),
        }
    }
}

/// Where a bound value's node comes from when constructing it.
#[derive(Clone, Copy)]
struct BoundSite<'s> {
    node: &'s str,
    event: Option<&'s str>,
}

impl<'a> ComponentGenerator<'a> {
    pub fn new(
        config: &'a CompilerConfig,
        imports: &'a IndexMap<String, String>,
        component: &'a Component,
        template: &'a [Node],
        aliases: EmbedAliases,
    ) -> Self {
        ComponentGenerator {
            config,
            imports,
            component,
            template,
            aliases,
            counter: 0,
        }
    }

    pub fn generate(mut self) -> String {
        let mut ctx = EmitterVisitorContext::create_root();
        if self.config.emit_header {
            ctx.println(GENERATED_HEADER);
            ctx.blank_line();
        }
        self.emit_uses(&mut ctx);
        ctx.blank_line();

        ctx.block("thread_local! {", "}", |ctx| {
            ctx.println(&format!("static TEMPLATE: rt::Node = {}();", TEMPLATE_FN));
        });
        ctx.blank_line();
        emit_template_fn(&mut ctx, self.template);
        ctx.blank_line();

        if self.component.has_controller() {
            self.emit_controller_trait(&mut ctx);
            ctx.blank_line();
        }
        self.emit_struct(&mut ctx);
        ctx.blank_line();
        self.emit_constructors(&mut ctx);
        ctx.blank_line();
        if !self.component.handlers.is_empty() || self.component.has_controller() {
            self.emit_trampolines(&mut ctx);
            ctx.blank_line();
        }
        self.emit_component_impl(&mut ctx);
        self.emit_aliases(&mut ctx);

        log::debug!(
            "generated component {} ({} node lookups)",
            self.component.name,
            self.counter
        );
        ctx.to_source()
    }

    fn fresh(&mut self, prefix: &str) -> String {
        let name = format!("{}{}", prefix, self.counter);
        self.counter += 1;
        name
    }

    fn emit_uses(&self, ctx: &mut EmitterVisitorContext) {
        let component = self.component;
        ctx.println("#[allow(unused_imports)]");
        ctx.println("use super::*;");
        ctx.println(&format!("use {} as rt;", self.config.runtime_crate));

        let used_imports: Vec<&String> = self
            .imports
            .keys()
            .filter(|alias| {
                component
                    .embeds
                    .iter()
                    .any(|e| e.namespace.as_ref() == Some(*alias))
            })
            .collect();
        for alias in used_imports {
            ctx.println(&format!("use {} as {};", self.imports[alias.as_str()], alias));
        }

        let needs_rc =
            !component.captures.is_empty() || component.embeds.iter().any(|e| e.control);
        let needs_weak = component.has_controller();
        if needs_weak {
            ctx.println("use std::cell::RefCell;");
        }
        match (needs_rc, needs_weak) {
            (true, true) => ctx.println("use std::rc::{Rc, Weak};"),
            (true, false) => ctx.println("use std::rc::Rc;"),
            (false, true) => ctx.println("use std::rc::Weak;"),
            (false, false) => {}
        }
    }

    fn emit_controller_trait(&self, ctx: &mut EmitterVisitorContext) {
        let name = controller_trait_name(&self.component.name);
        ctx.block(&format!("pub trait {} {{", name), "}", |ctx| {
            for (method, spec) in &self.component.controller_methods {
                ctx.println(&format!(
                    "fn {}(&mut self{}){};",
                    method,
                    handler_params(spec),
                    return_suffix(spec)
                ));
            }
        });
    }

    fn emit_struct(&self, ctx: &mut EmitterVisitorContext) {
        let component = self.component;
        ctx.println("#[derive(Default)]");
        ctx.block(&format!("pub struct {} {{", component.name), "}", |ctx| {
            ctx.println("cd: rt::ComponentData,");
            for field in &component.fields {
                ctx.println(&format!("pub {}: {},", field.name, field.ty));
            }
            for variable in &component.variables {
                ctx.println(&format!(
                    "pub {}: rt::Variable<{}>,",
                    variable.name,
                    variable_type(variable)
                ));
            }
            for embed in &component.embeds {
                ctx.println(&format!("pub {}: {},", embed.field, embed_field_type(embed)));
            }
            if component.has_controller() {
                ctx.println(&format!(
                    "controller: Option<Weak<RefCell<dyn {}>>>,",
                    controller_trait_name(&component.name)
                ));
            }
        });
    }

    fn emit_constructors(&mut self, ctx: &mut EmitterVisitorContext) {
        let component = self.component;
        let decl = component_params_decl(&component.parameters);
        let call: Vec<&str> = component
            .parameters
            .iter()
            .map(|p| p.name.as_str())
            .collect();

        ctx.println(&format!("impl {} {{", component.name));
        ctx.inc_indent();

        ctx.block(
            &format!("pub fn new({}) -> rt::Result<rt::Handle<Self>> {{", decl),
            "}",
            |ctx| {
                ctx.println("let this = Self::alloc();");
                let mut args = vec!["&this"];
                args.extend(call.iter().copied());
                ctx.println(&format!("Self::init({})?;", args.join(", ")));
                ctx.println("Ok(this)");
            },
        );
        ctx.blank_line();

        ctx.println("/// Allocates an uninitialized instance.");
        ctx.block("pub fn alloc() -> rt::Handle<Self> {", "}", |ctx| {
            ctx.println("rt::handle(Self::default())");
        });
        ctx.blank_line();

        let init_decl = if decl.is_empty() {
            "this: &rt::Handle<Self>".to_string()
        } else {
            format!("this: &rt::Handle<Self>, {}", decl)
        };
        ctx.println("#[allow(unused_variables)]");
        ctx.println(&format!("pub fn init({}) -> rt::Result<()> {{", init_decl));
        ctx.inc_indent();
        self.emit_init_body(ctx);
        ctx.dec_indent();
        ctx.println("}");

        ctx.dec_indent();
        ctx.println("}");
    }

    fn emit_init_body(&mut self, ctx: &mut EmitterVisitorContext) {
        let component = self.component;
        ctx.println("let mut guard = this.try_borrow_mut().map_err(|_| rt::Error::Busy)?;");
        ctx.println("let o = &mut *guard;");
        ctx.println("TEMPLATE.with(|t| o.cd.init(t))?;");
        for embed in &component.embeds {
            ctx.println(&format!("o.{} = Default::default();", embed.field));
        }

        // every root path resolves before the first mutation
        let mut scope = NodeScope::new("o.cd");
        let root_paths = component
            .variables
            .iter()
            .map(|v| &v.path)
            .chain(block_paths(&component.block))
            .chain(component.captures.iter().map(|c| &c.path))
            .chain(component.embeds.iter().map(|e| &e.path));
        for p in root_paths {
            self.node(ctx, &mut scope, p);
        }

        for variable in &component.variables {
            let node = self.node(ctx, &mut scope, &variable.path);
            let site = BoundSite {
                node: &node,
                event: None,
            };
            ctx.println(&format!(
                "o.{}.bind({});",
                variable.name,
                bound_ctor(&variable.value, site)
            ));
        }

        for field in &component.fields {
            if let Some(default_value) = &field.default_value {
                ctx.println(&format!("o.{} = {};", field.name, default_value));
            }
        }

        self.emit_block(ctx, &component.block, &mut scope);

        for capture in &component.captures {
            let node = self.node(ctx, &mut scope, &capture.path);
            for mapping in &capture.mappings {
                self.emit_listener(ctx, &node, mapping);
            }
        }

        for embed in &component.embeds {
            let anchor = self.node(ctx, &mut scope, &embed.path);
            self.emit_embed_init(ctx, &anchor, embed);
        }

        ctx.println("Ok(())");
    }

    /// Name of the node at `path`, resolving it on first use.
    fn node(
        &mut self,
        ctx: &mut EmitterVisitorContext,
        scope: &mut NodeScope,
        p: &Path,
    ) -> String {
        if let Some(name) = scope.names.get(p) {
            return name.clone();
        }
        let name = self.fresh("n");
        ctx.println(&format!(
            "let {} = {}.walk({})?;",
            name,
            scope.base,
            path::literal(p)
        ));
        scope.names.insert(p.clone(), name.clone());
        name
    }

    fn emit_block(
        &mut self,
        ctx: &mut EmitterVisitorContext,
        block: &Block,
        scope: &mut NodeScope,
    ) {
        for assignment in &block.assignments {
            let node = self.node(ctx, scope, &assignment.path);
            let site = BoundSite {
                node: &node,
                event: None,
            };
            ctx.println(&format!(
                "rt::assign(&mut {}, {})?;",
                bound_ctor(&assignment.target, site),
                assignment.expression
            ));
        }

        for controlled in &block.controlled {
            let node = self.node(ctx, scope, controlled.path());
            match controlled {
                ControlledBlock::Conditional {
                    expression, block, ..
                } => {
                    let slot = self.fresh("slot");
                    ctx.println(&format!("let mut {} = rt::ConditionalSlot::new(&{});", slot, node));
                    ctx.println(&format!("if {} {{", expression));
                    ctx.inc_indent();
                    self.emit_nested(ctx, block, &node);
                    ctx.dec_indent();
                    ctx.println("} else {");
                    ctx.inc_indent();
                    ctx.println(&format!("{}.update(false)?;", slot));
                    ctx.dec_indent();
                    ctx.println("}");
                    ctx.println(&format!("o.cd.keep_conditional({});", slot));
                }
                ControlledBlock::Repeated {
                    expression,
                    index_var,
                    item_var,
                    block,
                    ..
                } => {
                    let repeat = self.fresh("repeat");
                    ctx.println(&format!("let {} = rt::Repeat::detach(&{})?;", repeat, node));
                    ctx.println(&format!(
                        "for ({}, {}) in ({}).into_iter().enumerate() {{",
                        index_var,
                        item_var.as_deref().unwrap_or("_"),
                        expression
                    ));
                    ctx.inc_indent();
                    let clone = self.fresh("n");
                    ctx.println(&format!("let {} = {}.instantiate()?;", clone, repeat));
                    self.emit_nested(ctx, block, &clone);
                    ctx.dec_indent();
                    ctx.println("}");
                }
            }
        }
    }

    /// A controlled block's contents, with paths relative to `base`.
    fn emit_nested(&mut self, ctx: &mut EmitterVisitorContext, block: &Block, base: &str) {
        let mut scope = NodeScope::new(base);
        scope.names.insert(Path::new(), base.to_string());
        for p in block_paths(block) {
            self.node(ctx, &mut scope, p);
        }
        self.emit_block(ctx, block, &mut scope);
    }

    fn emit_listener(&self, ctx: &mut EmitterVisitorContext, node: &str, mapping: &EventMapping) {
        let component = self.component;
        let Some(spec) = component.handler(&mapping.handler) else {
            return;
        };
        let needs_target = mapping
            .param_mappings
            .values()
            .any(|v| v.kind != BoundKind::EventValue);

        ctx.block("{", "}", |ctx| {
            ctx.println("let weak = Rc::downgrade(this);");
            ctx.println(&format!(
                "{}.add_event_listener({}, move |ev: &rt::Event| -> rt::Result<()> {{",
                node,
                escape_string(&mapping.event)
            ));
            ctx.inc_indent();
            ctx.block("let Some(this) = weak.upgrade() else {", "};", |ctx| {
                ctx.println("return Ok(());");
            });
            if needs_target {
                ctx.println("let target = ev.current_target().ok_or(rt::Error::NoCurrentTarget)?;");
            }
            let mut args = vec!["&this".to_string()];
            for param in &spec.params {
                if let Some(value) = mapping.param_mappings.get(&param.name) {
                    let site = BoundSite {
                        node: "target",
                        event: Some("ev"),
                    };
                    ctx.println(&format!(
                        "let p_{} = {};",
                        param.name,
                        bound_ctor(value, site)
                    ));
                    args.push(format!("&p_{}", param.name));
                }
            }
            let call = format!("Self::call_{}({})?", mapping.handler, args.join(", "));
            match mapping.handling {
                EventHandling::AskPreventDefault => {
                    ctx.block(&format!("if {} {{", call), "}", |ctx| {
                        ctx.println("ev.prevent_default();");
                    });
                }
                EventHandling::DontPreventDefault => ctx.println(&format!("{};", call)),
                EventHandling::PreventDefault | EventHandling::AutoPreventDefault => {
                    ctx.println(&format!("{};", call));
                    ctx.println("ev.prevent_default();");
                }
            }
            ctx.println("Ok(())");
            ctx.dec_indent();
            ctx.println("});");
        });
    }

    fn emit_embed_init(&self, ctx: &mut EmitterVisitorContext, anchor: &str, embed: &Embed) {
        let ty = embed_type_path(embed);
        ctx.block("{", "}", |ctx| {
            ctx.println(&format!(
                "let container = {}.parent().ok_or(rt::Error::NoParent)?;",
                anchor
            ));
            let controller_line = format!(
                "let controller: rt::Handle<dyn {}> = this.clone();",
                embed_controller_path(embed)
            );
            match embed.kind {
                EmbedKind::Direct => {
                    ctx.println(&format!(
                        "let child = {}::new({})?;",
                        ty,
                        join_exprs(&embed.constructor_args)
                    ));
                    if embed.control {
                        ctx.println(&controller_line);
                        ctx.println(
                            "rt::Component::set_controller(&mut *child.borrow_mut(), Rc::downgrade(&controller));",
                        );
                    }
                    ctx.println(&format!(
                        "rt::Component::insert_into(&mut *child.borrow_mut(), &container, Some(&{}))?;",
                        anchor
                    ));
                    ctx.println(&format!("o.{} = Some(child);", embed.field));
                }
                EmbedKind::List | EmbedKind::Optional => {
                    ctx.println(&format!("o.{}.init(&container, &{});", embed.field, anchor));
                    if embed.control {
                        ctx.println(&controller_line);
                        ctx.println(&format!(
                            "o.{}.set_default_controller(Rc::downgrade(&controller));",
                            embed.field
                        ));
                    }
                    for call in &embed.constructor_calls {
                        emit_constructor_call(ctx, embed, &ty, call);
                    }
                }
            }
        });
    }

    fn emit_trampolines(&self, ctx: &mut EmitterVisitorContext) {
        let component = self.component;
        ctx.println("#[allow(dead_code)]");
        ctx.println(&format!("impl {} {{", component.name));
        ctx.inc_indent();
        let mut first = true;
        for (name, spec) in &component.handlers {
            if !first {
                ctx.blank_line();
            }
            first = false;
            emit_trampoline(ctx, name, spec, false);
        }
        for (name, spec) in &component.controller_methods {
            if !first {
                ctx.blank_line();
            }
            first = false;
            emit_trampoline(ctx, name, spec, true);
        }
        ctx.dec_indent();
        ctx.println("}");
    }

    fn emit_component_impl(&self, ctx: &mut EmitterVisitorContext) {
        let component = self.component;
        let controller = if component.has_controller() {
            format!("dyn {}", controller_trait_name(&component.name))
        } else {
            "dyn rt::NoController".to_string()
        };
        let has_embeds = !component.embeds.is_empty();

        ctx.block(&format!("impl rt::Component for {} {{", component.name), "}", |ctx| {
            ctx.println(&format!("type Controller = {};", controller));
            ctx.blank_line();
            ctx.block("fn component_data(&self) -> &rt::ComponentData {", "}", |ctx| {
                ctx.println("&self.cd");
            });
            ctx.blank_line();
            ctx.block("fn component_data_mut(&mut self) -> &mut rt::ComponentData {", "}", |ctx| {
                ctx.println("&mut self.cd");
            });
            ctx.blank_line();

            ctx.block(
                "fn insert_into(&mut self, parent: &rt::Node, before: Option<&rt::Node>) -> rt::Result<()> {",
                "}",
                |ctx| {
                    if has_embeds {
                        ctx.println("let moved = self.cd.insert_into(parent, before)?;");
                        ctx.println("rt::Component::reparented(self, &moved);");
                        ctx.println("Ok(())");
                    } else {
                        ctx.println("self.cd.insert_into(parent, before).map(|_| ())");
                    }
                },
            );
            ctx.blank_line();

            ctx.block("fn extract(&mut self) -> rt::Result<()> {", "}", |ctx| {
                if has_embeds {
                    ctx.println("let moved = self.cd.extract()?;");
                    ctx.println("rt::Component::reparented(self, &moved);");
                    ctx.println("Ok(())");
                } else {
                    ctx.println("self.cd.extract().map(|_| ())");
                }
            });
            ctx.blank_line();

            ctx.block("fn destroy(&mut self) -> rt::Result<()> {", "}", |ctx| {
                if !has_embeds {
                    ctx.println("self.cd.destroy()");
                    return;
                }
                // embeds are destroyed even past a failure; the first one is returned
                ctx.println("self.cd.ensure_live()?;");
                ctx.println("let mut result = Ok(());");
                for embed in &component.embeds {
                    match embed.kind {
                        EmbedKind::Direct => {
                            ctx.block(
                                &format!("if let Some(child) = self.{}.take() {{", embed.field),
                                "}",
                                |ctx| {
                                    ctx.println(
                                        "result = result.and(rt::Component::destroy(&mut *child.borrow_mut()));",
                                    );
                                },
                            );
                        }
                        EmbedKind::List => ctx.println(&format!(
                            "result = result.and(self.{}.destroy_all());",
                            embed.field
                        )),
                        EmbedKind::Optional => ctx.println(&format!(
                            "result = result.and(self.{}.set(None));",
                            embed.field
                        )),
                    }
                }
                ctx.println("result.and(self.cd.destroy())");
            });

            if component.has_controller() {
                ctx.blank_line();
                ctx.block(
                    &format!(
                        "fn set_controller(&mut self, controller: Weak<RefCell<{}>>) {{",
                        controller
                    ),
                    "}",
                    |ctx| {
                        ctx.println("self.controller = Some(controller);");
                    },
                );
            }

            if has_embeds {
                ctx.blank_line();
                ctx.block("fn reparented(&mut self, moved: &rt::Reparent) {", "}", |ctx| {
                    for embed in &component.embeds {
                        match embed.kind {
                            EmbedKind::Direct => {
                                ctx.block(
                                    &format!("if let Some(child) = &self.{} {{", embed.field),
                                    "}",
                                    |ctx| {
                                        ctx.block(
                                            "if let Ok(mut child) = child.try_borrow_mut() {",
                                            "}",
                                            |ctx| {
                                                ctx.println(
                                                    "rt::Component::reparented(&mut *child, moved);",
                                                );
                                            },
                                        );
                                    },
                                );
                            }
                            EmbedKind::List | EmbedKind::Optional => {
                                ctx.println(&format!("self.{}.update_parent(moved);", embed.field))
                            }
                        }
                    }
                });
            }
        });
    }

    fn emit_aliases(&self, ctx: &mut EmitterVisitorContext) {
        let name = &self.component.name;
        if self.aliases.list {
            ctx.blank_line();
            ctx.println(&format!("pub type {} = rt::List<{}>;", list_alias_name(name), name));
        }
        if self.aliases.optional {
            ctx.blank_line();
            ctx.println(&format!(
                "pub type {} = rt::Optional<{}>;",
                optional_alias_name(name),
                name
            ));
        }
    }
}

pub(super) fn emit_constructor_call(
    ctx: &mut EmitterVisitorContext,
    embed: &Embed,
    ty: &str,
    call: &ConstructorCall,
) {
    let construct = format!("{}::new({})?", ty, join_exprs(&call.args));
    let statement = match embed.kind {
        EmbedKind::Optional => format!("o.{}.set(Some({}))?;", embed.field, construct),
        _ => format!("o.{}.append({})?;", embed.field, construct),
    };
    match &call.kind {
        ConstructorKind::Unconditional => ctx.println(&statement),
        ConstructorKind::Conditional { expression } => {
            ctx.block(&format!("if {} {{", expression), "}", |ctx| {
                ctx.println(&statement);
            });
        }
        ConstructorKind::Repeated {
            expression,
            index_var,
            item_var,
        } => {
            ctx.block(
                &format!(
                    "for ({}, {}) in ({}).into_iter().enumerate() {{",
                    index_var,
                    item_var.as_deref().unwrap_or("_"),
                    expression
                ),
                "}",
                |ctx| ctx.println(&statement),
            );
        }
    }
}

/// `call_<name>`: converts raw bound values and forwards to the component's
/// own method or to its controller.
fn emit_trampoline(ctx: &mut EmitterVisitorContext, name: &str, spec: &HandlerSpec, controller: bool) {
    let params: String = spec
        .params
        .iter()
        .map(|p| format!(", p_{}: &dyn rt::BoundValue", p.name))
        .collect();
    let returns = spec
        .returns
        .as_ref()
        .map_or_else(|| "()".to_string(), ToString::to_string);
    let args: Vec<String> = spec.params.iter().map(|p| format!("v_{}", p.name)).collect();

    ctx.block(
        &format!(
            "fn call_{}(this: &rt::Handle<Self>{}) -> rt::Result<{}> {{",
            name, params, returns
        ),
        "}",
        |ctx| {
            for param in &spec.params {
                ctx.println(&format!(
                    "let v_{} = rt::Typed::<{}>::new(p_{}).get()?;",
                    param.name, param.ty, param.name
                ));
            }
            if controller {
                ctx.println("let controller = this");
                ctx.inc_indent();
                ctx.println(".try_borrow()");
                ctx.println(".map_err(|_| rt::Error::Busy)?");
                ctx.println(".controller");
                ctx.println(".as_ref()");
                ctx.println(".and_then(Weak::upgrade);");
                ctx.dec_indent();
                ctx.block("let Some(controller) = controller else {", "};", |ctx| {
                    ctx.println("return Ok(Default::default());");
                });
                ctx.println("let mut c = controller.try_borrow_mut().map_err(|_| rt::Error::Busy)?;");
                ctx.println(&format!("Ok(c.{}({}))", name, args.join(", ")));
            } else {
                ctx.println("let mut o = this.try_borrow_mut().map_err(|_| rt::Error::Busy)?;");
                ctx.println(&format!("Ok(o.{}({}))", name, args.join(", ")));
            }
        },
    );
}

/// Runtime constructor expression for a bound value at `site`.
fn bound_ctor(value: &BoundValue, site: BoundSite<'_>) -> String {
    let node = site.node;
    let id = escape_string(value.id());
    match value.kind {
        BoundKind::SelfNode => format!("rt::BoundSelf::new(&{})", node),
        BoundKind::Dataset => format!("rt::BoundDataset::new(&{}, {})", node, id),
        BoundKind::Property => format!("rt::BoundProperty::new(&{}, {})", node, id),
        BoundKind::Style => format!("rt::BoundStyle::new(&{}, {})", node, id),
        BoundKind::Class => {
            let names: Vec<String> = value.ids.iter().map(|n| escape_string(n)).collect();
            format!("rt::BoundClass::new(&{}, &[{}])", node, names.join(", "))
        }
        BoundKind::FormValue => format!(
            "rt::BoundFormValue::new(&{}, {}, {}, {})?",
            node, value.form_depth, id, value.is_radio
        ),
        BoundKind::EventValue => {
            format!("rt::BoundEventValue::new({}, {})", site.event.unwrap_or("ev"), id)
        }
    }
}

/// Declared type, or the natural type of the bound kind.
fn variable_type(variable: &Variable) -> String {
    match (&variable.ty, variable.value.kind) {
        (Some(ty), _) => ty.to_string(),
        (None, BoundKind::SelfNode) => "rt::Node".to_string(),
        (None, BoundKind::Class) => "i64".to_string(),
        (None, _) => "String".to_string(),
    }
}

pub(super) fn embed_type_path(embed: &Embed) -> String {
    match &embed.namespace {
        Some(namespace) => format!("{}::{}", namespace, embed.component_type),
        None => embed.component_type.clone(),
    }
}

fn embed_controller_path(embed: &Embed) -> String {
    let name = controller_trait_name(&embed.component_type);
    match &embed.namespace {
        Some(namespace) => format!("{}::{}", namespace, name),
        None => name,
    }
}

pub(super) fn embed_field_type(embed: &Embed) -> String {
    let ty = embed_type_path(embed);
    match embed.kind {
        EmbedKind::Direct => format!("Option<rt::Handle<{}>>", ty),
        EmbedKind::List => format!("rt::List<{}>", ty),
        EmbedKind::Optional => format!("rt::Optional<{}>", ty),
    }
}

fn component_params_decl(params: &[ComponentParam]) -> String {
    params
        .iter()
        .map(|p| {
            if p.is_variadic {
                format!("{}: Vec<{}>", p.name, p.ty)
            } else {
                format!("{}: {}", p.name, p.ty)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn handler_params(spec: &HandlerSpec) -> String {
    spec.params
        .iter()
        .map(|p| format!(", {}: {}", p.name, p.ty))
        .collect()
}

fn return_suffix(spec: &HandlerSpec) -> String {
    spec.returns
        .as_ref()
        .map_or_else(String::new, |ty| format!(" -> {}", ty))
}

pub(super) fn join_exprs(exprs: &[Expression]) -> String {
    exprs
        .iter()
        .map(Expression::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Paths a block's own statements refer to, in statement order.
fn block_paths(block: &Block) -> impl Iterator<Item = &Path> {
    block
        .assignments
        .iter()
        .map(|a| &a.path)
        .chain(block.controlled.iter().map(ControlledBlock::path))
}
