//! Template Paths
//!
//! Node paths are child indices into the normalized template. The
//! normalization here is the only reshaping the tree gets before the
//! walker records paths, so generated templates and recorded paths agree.

use crate::binding::Path;
use crate::ml_parser::Node;
use crate::parse_util::ParseSourceSpan;

/// Drops comments and merges adjacent text nodes, recursively.
pub fn normalize(nodes: &mut Vec<Node>) {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes.drain(..) {
        match node {
            Node::Comment(_) => {}
            Node::Text(text) => match merged.last_mut() {
                Some(Node::Text(prev)) => {
                    prev.value.push_str(&text.value);
                    prev.source_span = ParseSourceSpan::new(
                        prev.source_span.start.clone(),
                        text.source_span.end.clone(),
                    );
                }
                _ => merged.push(Node::Text(text)),
            },
            Node::Element(mut element) => {
                normalize(&mut element.children);
                merged.push(Node::Element(element));
            }
        }
    }
    *nodes = merged;
}

/// Drops whitespace-only text directly under the component root.
pub fn trim_root_whitespace(nodes: &mut Vec<Node>) {
    nodes.retain(|node| !node.is_blank_text());
}

/// Follows `path` from the given roots.
pub fn resolve<'a>(roots: &'a [Node], path: &[usize]) -> Option<&'a Node> {
    let (first, rest) = path.split_first()?;
    let mut node = roots.get(*first)?;
    for &index in rest {
        node = match node {
            Node::Element(element) => element.children.get(index)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Every element's path, in document order.
pub fn element_paths(roots: &[Node]) -> Vec<Path> {
    fn visit(nodes: &[Node], prefix: &mut Path, out: &mut Vec<Path>) {
        for (index, node) in nodes.iter().enumerate() {
            if let Node::Element(element) = node {
                prefix.push(index);
                out.push(prefix.clone());
                visit(&element.children, prefix, out);
                prefix.pop();
            }
        }
    }

    let mut out = Vec::new();
    visit(roots, &mut Path::new(), &mut out);
    out
}

/// Path as a Rust slice literal, `&[0, 2]`.
pub fn literal(path: &[usize]) -> String {
    let items: Vec<String> = path.iter().map(usize::to_string).collect();
    format!("&[{}]", items.join(", "))
}
