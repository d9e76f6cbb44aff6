//! Template Generation
//!
//! Renders a processed template as a function building the runtime node
//! tree. Node order matches the tree the walker recorded paths against.

use super::emitter::{escape_string, EmitterVisitorContext};
use crate::ml_parser::Node;

pub const TEMPLATE_FN: &str = "template";

/// `fn template() -> rt::Node { ... }`
pub fn emit_template_fn(ctx: &mut EmitterVisitorContext, nodes: &[Node]) {
    emit_tree_fn(ctx, &format!("fn {}() -> rt::Node", TEMPLATE_FN), nodes);
}

/// A function with the given signature returning `nodes` in a fragment.
pub fn emit_tree_fn(ctx: &mut EmitterVisitorContext, signature: &str, nodes: &[Node]) {
    ctx.block(&format!("{} {{", signature), "}", |ctx| {
        if nodes.is_empty() {
            ctx.println("rt::Node::fragment()");
            return;
        }
        ctx.block("rt::Node::fragment().with_children(vec![", "])", |ctx| {
            for node in nodes {
                emit_node(ctx, node);
            }
        });
    });
}

fn emit_node(ctx: &mut EmitterVisitorContext, node: &Node) {
    match node {
        Node::Text(text) => {
            ctx.println(&format!("rt::Node::text({}),", escape_string(&text.value)));
        }
        Node::Comment(comment) => {
            let value = comment.value.as_deref().unwrap_or("");
            ctx.println(&format!("rt::Node::comment({}),", escape_string(value)));
        }
        Node::Element(element) => {
            let mut head = format!("rt::Node::element({})", escape_string(&element.name));
            for attr in &element.attrs {
                head.push_str(&format!(
                    ".with_attr({}, {})",
                    escape_string(&attr.name),
                    escape_string(&attr.value)
                ));
            }
            if element.children.is_empty() {
                ctx.println(&format!("{},", head));
                return;
            }
            ctx.block(&format!("{}.with_children(vec![", head), "]),", |ctx| {
                for child in &element.children {
                    emit_node(ctx, child);
                }
            });
        }
    }
}
