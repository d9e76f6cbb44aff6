//! In-Memory DOM
//!
//! A small reference-counted document tree: elements, text, comments and
//! fragments, with the subset of DOM operations generated components use.
//! Parents own their children; children hold a weak link back.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::event::Event;
use crate::value::Value;

pub type Listener = Rc<dyn Fn(&Event) -> Result<()>>;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Comment,
    Fragment,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(ElementData),
    Text(String),
    Comment(String),
    Fragment,
}

#[derive(Debug, Clone, Default)]
struct ElementData {
    tag: String,
    attributes: IndexMap<String, String>,
    properties: IndexMap<String, Value>,
}

struct NodeData {
    kind: NodeKind,
    parent: Weak<RefCell<NodeData>>,
    children: Vec<Node>,
    listeners: Vec<(String, Listener)>,
}

#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

impl Node {
    fn from_kind(kind: NodeKind) -> Self {
        Node(Rc::new(RefCell::new(NodeData {
            kind,
            parent: Weak::new(),
            children: Vec::new(),
            listeners: Vec::new(),
        })))
    }

    pub fn element(tag: &str) -> Self {
        Node::from_kind(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Node::from_kind(NodeKind::Text(value.into()))
    }

    pub fn comment(value: impl Into<String>) -> Self {
        Node::from_kind(NodeKind::Comment(value.into()))
    }

    pub fn fragment() -> Self {
        Node::from_kind(NodeKind::Fragment)
    }

    /// Builder form of [`Node::set_attribute`].
    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder form of [`Node::append_child`].
    pub fn with_children(self, children: impl IntoIterator<Item = Node>) -> Self {
        for child in children {
            if let Err(e) = self.append_child(&child) {
                log::warn!("dropping child of <{}>: {}", self.tag_name().unwrap_or_default(), e);
            }
        }
        self
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn node_type(&self) -> NodeType {
        match self.0.borrow().kind {
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
            NodeKind::Fragment => NodeType::Fragment,
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type() == NodeType::Element
    }

    pub fn tag_name(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element(el) => Some(el.tag.clone()),
            _ => None,
        }
    }

    /// Character data of text and comment nodes.
    pub fn node_value(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Text(s) | NodeKind::Comment(s) => Some(s.clone()),
            _ => None,
        }
    }

    // ── Tree navigation ─────────────────────────────────────────────

    pub fn parent(&self) -> Option<Node> {
        self.0.borrow().parent.upgrade().map(Node)
    }

    pub fn child_nodes(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn child(&self, index: usize) -> Option<Node> {
        self.0.borrow().children.get(index).cloned()
    }

    pub fn first_child(&self) -> Option<Node> {
        self.child(0)
    }

    pub fn last_child(&self) -> Option<Node> {
        self.0.borrow().children.last().cloned()
    }

    pub fn index_in_parent(&self) -> Option<usize> {
        let parent = self.parent()?;
        let index = parent.0.borrow().children.iter().position(|c| c.ptr_eq(self));
        index
    }

    pub fn next_sibling(&self) -> Option<Node> {
        let parent = self.parent()?;
        let index = self.index_in_parent()?;
        parent.child(index + 1)
    }

    /// True if `other` is this node or one of its descendants.
    pub fn contains(&self, other: &Node) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node.ptr_eq(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Follows a sequence of child indices starting at this node.
    pub fn walk(&self, path: &[usize]) -> Result<Node> {
        let mut node = self.clone();
        for &index in path {
            node = node.child(index).ok_or_else(|| Error::PathNotFound {
                path: path.to_vec(),
            })?;
        }
        Ok(node)
    }

    pub fn ancestor(&self, depth: usize) -> Option<Node> {
        let mut node = self.clone();
        for _ in 0..depth {
            node = node.parent()?;
        }
        Some(node)
    }

    /// Nearest inclusive ancestor element with the given tag.
    pub fn closest(&self, tag: &str) -> Option<Node> {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node
                .tag_name()
                .map_or(false, |t| t.eq_ignore_ascii_case(tag))
            {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// Descendant elements carrying `name="<name>"`, in document order.
    pub fn elements_named(&self, name: &str) -> Vec<Node> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named(&self, name: &str, found: &mut Vec<Node>) {
        for child in self.child_nodes() {
            if child.attribute("name").as_deref() == Some(name) {
                found.push(child.clone());
            }
            child.collect_named(name, found);
        }
    }

    // ── Mutation ────────────────────────────────────────────────────

    pub fn append_child(&self, child: &Node) -> Result<()> {
        self.insert_before(child, None)
    }

    /// Inserts `child` before `before`, or appends it. Fragments are
    /// emptied into this node.
    pub fn insert_before(&self, child: &Node, before: Option<&Node>) -> Result<()> {
        if child.node_type() == NodeType::Fragment {
            for grandchild in child.child_nodes() {
                self.insert_before(&grandchild, before)?;
            }
            return Ok(());
        }
        if child.contains(self) {
            return Err(Error::HierarchyRequest);
        }
        if let Some(before) = before {
            if !before.parent().map_or(false, |p| p.ptr_eq(self)) {
                return Err(Error::NotAChild);
            }
            // already in place
            if before.ptr_eq(child) {
                return Ok(());
            }
        }
        child.detach();
        let index = match before {
            Some(before) => before.index_in_parent().ok_or(Error::NotAChild)?,
            None => self.child_count(),
        };
        self.0.borrow_mut().children.insert(index, child.clone());
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        Ok(())
    }

    pub fn remove_child(&self, child: &Node) -> Result<()> {
        if !child.parent().map_or(false, |p| p.ptr_eq(self)) {
            return Err(Error::NotAChild);
        }
        child.detach();
        Ok(())
    }

    pub fn replace_child(&self, new_child: &Node, old_child: &Node) -> Result<()> {
        if new_child.ptr_eq(old_child) {
            return Ok(());
        }
        self.insert_before(new_child, Some(old_child))?;
        self.remove_child(old_child)
    }

    /// Replaces this node in its parent.
    pub fn replace_with(&self, replacement: &Node) -> Result<()> {
        let parent = self.parent().ok_or(Error::NoParent)?;
        parent.replace_child(replacement, self)
    }

    /// Removes this node from its parent, if it has one.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.0.borrow_mut().children.retain(|c| !c.ptr_eq(self));
        }
        self.0.borrow_mut().parent = Weak::new();
    }

    /// Copies the node (and with `deep`, its subtree). Listeners are not
    /// copied.
    pub fn clone_node(&self, deep: bool) -> Node {
        let copy = Node::from_kind(self.0.borrow().kind.clone());
        if deep {
            for child in self.child_nodes() {
                let child_copy = child.clone_node(true);
                copy.0.borrow_mut().children.push(child_copy.clone());
                child_copy.0.borrow_mut().parent = Rc::downgrade(&copy.0);
            }
        }
        copy
    }

    // ── Attributes and properties ───────────────────────────────────

    pub fn attribute(&self, name: &str) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element(el) => el.attributes.get(name).cloned(),
            _ => None,
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        if let NodeKind::Element(el) = &mut self.0.borrow_mut().kind {
            el.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        if let NodeKind::Element(el) = &mut self.0.borrow_mut().kind {
            el.attributes.shift_remove(name);
        }
    }

    pub fn attributes(&self) -> Vec<(String, String)> {
        match &self.0.borrow().kind {
            NodeKind::Element(el) => el
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn text_content(&self) -> String {
        match &self.0.borrow().kind {
            NodeKind::Text(s) | NodeKind::Comment(s) => return s.clone(),
            _ => {}
        }
        let mut out = String::new();
        for child in self.child_nodes() {
            if child.node_type() != NodeType::Comment {
                out.push_str(&child.text_content());
            }
        }
        out
    }

    pub fn set_text_content(&self, value: &str) {
        {
            let mut data = self.0.borrow_mut();
            if let NodeKind::Text(s) | NodeKind::Comment(s) = &mut data.kind {
                *s = value.to_string();
                return;
            }
        }
        for child in self.child_nodes() {
            child.detach();
        }
        if !value.is_empty() {
            let text = Node::text(value);
            self.0.borrow_mut().children.push(text.clone());
            text.0.borrow_mut().parent = Rc::downgrade(&self.0);
        }
    }

    /// Reads a node property. Unset properties fall back to the attribute
    /// of the same name.
    pub fn property(&self, name: &str) -> Value {
        if name == "textContent" {
            return Value::Str(self.text_content());
        }
        let data = self.0.borrow();
        let el = match &data.kind {
            NodeKind::Element(el) => el,
            NodeKind::Text(s) | NodeKind::Comment(s) if name == "nodeValue" => {
                return Value::Str(s.clone())
            }
            _ => return Value::Undefined,
        };
        if let Some(v) = el.properties.get(name) {
            return v.clone();
        }
        match name {
            "checked" | "disabled" | "selected" | "hidden" => {
                Value::Bool(el.attributes.contains_key(name))
            }
            "value" => Value::Str(el.attributes.get(name).cloned().unwrap_or_default()),
            _ => el
                .attributes
                .get(name)
                .map(|v| Value::Str(v.clone()))
                .unwrap_or(Value::Undefined),
        }
    }

    pub fn set_property(&self, name: &str, value: Value) {
        if name == "textContent" || name == "nodeValue" {
            self.set_text_content(&value.to_string());
            return;
        }
        if let NodeKind::Element(el) = &mut self.0.borrow_mut().kind {
            el.properties.insert(name.to_string(), value);
        }
    }

    pub fn style(&self, name: &str) -> Option<String> {
        parse_style(&self.attribute("style").unwrap_or_default()).remove(name)
    }

    /// Sets one inline style entry; an empty value removes it.
    pub fn set_style(&self, name: &str, value: &str) {
        let mut styles = parse_style(&self.attribute("style").unwrap_or_default());
        if value.is_empty() {
            styles.shift_remove(name);
        } else {
            styles.insert(name.to_string(), value.to_string());
        }
        if styles.is_empty() {
            self.remove_attribute("style");
        } else {
            let joined = styles
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            self.set_attribute("style", &joined);
        }
    }

    /// Reads `dataset[name]`, stored as a `data-*` attribute.
    pub fn data(&self, name: &str) -> Option<String> {
        self.attribute(&dataset_attribute(name))
    }

    pub fn set_data(&self, name: &str, value: &str) {
        self.set_attribute(&dataset_attribute(name), value);
    }

    pub fn class_names(&self) -> Vec<String> {
        self.attribute("class")
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.class_names().iter().any(|c| c == name)
    }

    pub fn add_class(&self, name: &str) {
        let mut classes = self.class_names();
        if !classes.iter().any(|c| c == name) {
            classes.push(name.to_string());
            self.set_attribute("class", &classes.join(" "));
        }
    }

    pub fn remove_class(&self, name: &str) {
        let classes = self.class_names();
        if classes.iter().any(|c| c == name) {
            let kept: Vec<_> = classes.into_iter().filter(|c| c != name).collect();
            if kept.is_empty() {
                self.remove_attribute("class");
            } else {
                self.set_attribute("class", &kept.join(" "));
            }
        }
    }

    // ── Events ──────────────────────────────────────────────────────

    pub fn add_event_listener<F>(&self, kind: &str, listener: F)
    where
        F: Fn(&Event) -> Result<()> + 'static,
    {
        self.0
            .borrow_mut()
            .listeners
            .push((kind.to_string(), Rc::new(listener)));
    }

    pub fn listener_count(&self, kind: &str) -> usize {
        self.0
            .borrow()
            .listeners
            .iter()
            .filter(|(k, _)| k == kind)
            .count()
    }

    /// Dispatches `event` at this node and bubbles it to the root. Returns
    /// false if a listener prevented the default action.
    pub fn dispatch_event(&self, event: &Event) -> bool {
        event.set_target(self);
        let mut current = Some(self.clone());
        while let Some(node) = current {
            event.set_current_target(Some(&node));
            let listeners: Vec<Listener> = node
                .0
                .borrow()
                .listeners
                .iter()
                .filter(|(k, _)| k == event.kind())
                .map(|(_, l)| l.clone())
                .collect();
            for listener in listeners {
                if let Err(e) = listener(event) {
                    log::error!("`{}` listener failed: {}", event.kind(), e);
                }
            }
            if event.propagation_stopped() {
                break;
            }
            current = node.parent();
        }
        event.set_current_target(None);
        !event.default_prevented()
    }

    // ── Serialization ───────────────────────────────────────────────

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in self.child_nodes() {
            child.write_html(&mut out);
        }
        out
    }

    fn write_html(&self, out: &mut String) {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Text(s) => out.push_str(&escape_text(s)),
            NodeKind::Comment(s) => {
                out.push_str("<!--");
                out.push_str(s);
                out.push_str("-->");
            }
            NodeKind::Fragment => {
                for child in &data.children {
                    child.write_html(out);
                }
            }
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_text(value).replace('"', "&quot;"));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                    return;
                }
                for child in &data.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node_type() {
            NodeType::Fragment => write!(f, "#fragment({})", self.inner_html()),
            _ => f.write_str(&self.outer_html()),
        }
    }
}

fn parse_style(style: &str) -> IndexMap<String, String> {
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// `userId` -> `data-user-id`
fn dataset_attribute(name: &str) -> String {
    let mut attr = String::from("data-");
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            attr.push('-');
            attr.push(ch.to_ascii_lowercase());
        } else {
            attr.push(ch);
        }
    }
    attr
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
