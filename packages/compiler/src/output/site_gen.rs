//! Site Generation
//!
//! A site is the document a package's components get mounted into. Its
//! skeleton is plain markup with embeds; this module renders it twice:
//! as `site.rs`, which builds the document and mounts the embeds, and as
//! a static `index.html` to serve.

use indexmap::IndexMap;

use super::component_gen::{
    embed_field_type, embed_type_path, emit_constructor_call, join_exprs, GENERATED_HEADER,
};
use super::emitter::EmitterVisitorContext;
use super::template_gen::emit_tree_fn;
use crate::binding::{Component, EmbedKind, Path};
use crate::config::CompilerConfig;
use crate::ml_parser::{Element, Node};
use crate::template::path;

pub const SITE_MODULE: &str = "site";
pub const INDEX_FILE: &str = "index.html";

pub struct SiteGenerator<'a> {
    config: &'a CompilerConfig,
    imports: &'a IndexMap<String, String>,
    site: &'a Component,
    template: &'a [Node],
}

impl<'a> SiteGenerator<'a> {
    pub fn new(
        config: &'a CompilerConfig,
        imports: &'a IndexMap<String, String>,
        site: &'a Component,
        template: &'a [Node],
    ) -> Self {
        SiteGenerator {
            config,
            imports,
            site,
            template,
        }
    }

    pub fn generate(&self) -> String {
        let mut ctx = EmitterVisitorContext::create_root();
        if self.config.emit_header {
            ctx.println(GENERATED_HEADER);
            ctx.blank_line();
        }
        ctx.println("#[allow(unused_imports)]");
        ctx.println("use super::*;");
        ctx.println(&format!("use {} as rt;", self.config.runtime_crate));
        for (alias, import_path) in self.imports {
            if self.site.embeds.iter().any(|e| e.namespace.as_ref() == Some(alias)) {
                ctx.println(&format!("use {} as {};", import_path, alias));
            }
        }
        ctx.blank_line();

        ctx.println("/// Builds the document the site mounts into.");
        emit_tree_fn(&mut ctx, "pub fn document() -> rt::Node", self.template);
        ctx.blank_line();

        let name = &self.site.name;
        ctx.println("#[derive(Default)]");
        if self.site.embeds.is_empty() {
            ctx.println(&format!("pub struct {};", name));
        } else {
            ctx.block(&format!("pub struct {} {{", name), "}", |ctx| {
                for embed in &self.site.embeds {
                    ctx.println(&format!("pub {}: {},", embed.field, embed_field_type(embed)));
                }
            });
        }
        ctx.blank_line();

        ctx.block(&format!("impl {} {{", name), "}", |ctx| {
            ctx.println("/// Creates every embedded component in place of its anchor.");
            ctx.block(
                "pub fn mount(document: &rt::Node) -> rt::Result<Self> {",
                "}",
                |ctx| self.emit_mount_body(ctx),
            );
        });

        log::debug!("generated site {} ({} embed(s))", name, self.site.embeds.len());
        ctx.to_source()
    }

    fn emit_mount_body(&self, ctx: &mut EmitterVisitorContext) {
        if self.site.embeds.is_empty() {
            ctx.println("let _ = document;");
            ctx.println(&format!("Ok({})", self.site.name));
            return;
        }
        ctx.println(&format!("let mut o = {}::default();", self.site.name));
        // anchors resolve before any embed changes the tree
        let anchors: Vec<(String, &Path)> = self
            .site
            .embeds
            .iter()
            .enumerate()
            .map(|(i, e)| (format!("n{}", i), &e.path))
            .collect();
        for (anchor, p) in &anchors {
            ctx.println(&format!("let {} = document.walk({})?;", anchor, path::literal(p)));
        }
        for (embed, (anchor, _)) in self.site.embeds.iter().zip(&anchors) {
            let ty = embed_type_path(embed);
            ctx.block("{", "}", |ctx| {
                ctx.println(&format!(
                    "let container = {}.parent().ok_or(rt::Error::NoParent)?;",
                    anchor
                ));
                match embed.kind {
                    EmbedKind::Direct => {
                        ctx.println(&format!(
                            "let child = {}::new({})?;",
                            ty,
                            join_exprs(&embed.constructor_args)
                        ));
                        ctx.println(&format!(
                            "rt::Component::insert_into(&mut *child.borrow_mut(), &container, Some(&{}))?;",
                            anchor
                        ));
                        ctx.println(&format!("o.{} = Some(child);", embed.field));
                    }
                    EmbedKind::List | EmbedKind::Optional => {
                        ctx.println(&format!("o.{}.init(&container, &{});", embed.field, anchor));
                        for call in &embed.constructor_calls {
                            emit_constructor_call(ctx, embed, &ty, call);
                        }
                    }
                }
            });
        }
        ctx.println("Ok(o)");
    }
}

/// Serializes a skeleton as a standalone HTML document.
pub fn render_html(nodes: &[Node]) -> String {
    let mut out = String::from("<!DOCTYPE html>\n");
    for node in nodes {
        write_node(&mut out, node, false);
    }
    out.push('\n');
    out
}

fn write_node(out: &mut String, node: &Node, raw_text: bool) {
    match node {
        Node::Text(text) if raw_text => out.push_str(&text.value),
        Node::Text(text) => out.push_str(&escape_html(&text.value, false)),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment.value.as_deref().unwrap_or(""));
            out.push_str("-->");
        }
        Node::Element(element) => write_element(out, element),
    }
}

fn write_element(out: &mut String, element: &Element) {
    out.push('<');
    out.push_str(&element.name);
    for attr in &element.attrs {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&escape_html(&attr.value, true));
        out.push('"');
    }
    out.push('>');
    if element.is_void {
        return;
    }
    let raw_text = matches!(element.name.to_ascii_lowercase().as_str(), "script" | "style");
    for child in &element.children {
        write_node(out, child, raw_text);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn escape_html(value: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' if !attribute => escaped.push_str("&lt;"),
            '>' if !attribute => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            c => escaped.push(c),
        }
    }
    escaped
}
