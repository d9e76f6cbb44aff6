//! Events
//!
//! Synthetic events dispatched through the in-memory DOM. Listeners see the
//! same shared event object while it bubbles.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::dom::Node;
use crate::value::Value;

#[derive(Clone)]
pub struct Event(Rc<EventInner>);

struct EventInner {
    kind: String,
    props: RefCell<IndexMap<String, Value>>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
    target: RefCell<Option<Node>>,
    current_target: RefCell<Option<Node>>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Event(Rc::new(EventInner {
            kind: kind.into(),
            props: RefCell::new(IndexMap::new()),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
            target: RefCell::new(None),
            current_target: RefCell::new(None),
        }))
    }

    pub fn with_prop(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.props.borrow_mut().insert(name.into(), value.into());
        self
    }

    pub fn kind(&self) -> &str {
        &self.0.kind
    }

    /// Reads a named property. `type`, `target`, `currentTarget` and
    /// `defaultPrevented` are answered by the event itself.
    pub fn get(&self, name: &str) -> Value {
        match name {
            "type" => Value::Str(self.0.kind.clone()),
            "target" => self.target().map(Value::Node).unwrap_or(Value::Null),
            "currentTarget" => self.current_target().map(Value::Node).unwrap_or(Value::Null),
            "defaultPrevented" => Value::Bool(self.default_prevented()),
            _ => self
                .0
                .props
                .borrow()
                .get(name)
                .cloned()
                .unwrap_or(Value::Undefined),
        }
    }

    pub fn prevent_default(&self) {
        self.0.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.0.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.0.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.0.propagation_stopped.get()
    }

    pub fn target(&self) -> Option<Node> {
        self.0.target.borrow().clone()
    }

    pub fn current_target(&self) -> Option<Node> {
        self.0.current_target.borrow().clone()
    }

    pub(crate) fn set_target(&self, node: &Node) {
        *self.0.target.borrow_mut() = Some(node.clone());
    }

    pub(crate) fn set_current_target(&self, node: Option<&Node>) {
        *self.0.current_target.borrow_mut() = node.cloned();
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.0.kind)
            .field("props", &self.0.props.borrow())
            .field("default_prevented", &self.default_prevented())
            .finish()
    }
}
