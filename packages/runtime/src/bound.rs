//! Bound Values
//!
//! Typed accessors attaching get/set semantics to a location in a live
//! document or to an event being dispatched. One implementation per
//! binding kind.

use std::marker::PhantomData;

use crate::dom::Node;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::value::{FromValue, Value};

pub trait BoundValue {
    fn get(&self) -> Result<Value>;
    fn set(&mut self, value: Value) -> Result<()>;
}

/// Applies an assignment directive.
pub fn assign<B, V>(target: &mut B, value: V) -> Result<()>
where
    B: BoundValue + ?Sized,
    V: Into<Value>,
{
    target.set(value.into())
}

/// A named node property such as `textContent`, `value` or `checked`.
pub struct BoundProperty {
    node: Node,
    name: String,
}

impl BoundProperty {
    pub fn new(node: &Node, name: &str) -> Self {
        BoundProperty {
            node: node.clone(),
            name: name.to_string(),
        }
    }
}

impl BoundValue for BoundProperty {
    fn get(&self) -> Result<Value> {
        Ok(self.node.property(&self.name))
    }

    fn set(&mut self, value: Value) -> Result<()> {
        self.node.set_property(&self.name, value);
        Ok(())
    }
}

pub struct BoundStyle {
    node: Node,
    name: String,
}

impl BoundStyle {
    pub fn new(node: &Node, name: &str) -> Self {
        BoundStyle {
            node: node.clone(),
            name: name.to_string(),
        }
    }
}

impl BoundValue for BoundStyle {
    fn get(&self) -> Result<Value> {
        Ok(self
            .node
            .style(&self.name)
            .map(Value::Str)
            .unwrap_or(Value::Undefined))
    }

    fn set(&mut self, value: Value) -> Result<()> {
        self.node.set_style(&self.name, &value.to_string());
        Ok(())
    }
}

pub struct BoundDataset {
    node: Node,
    name: String,
}

impl BoundDataset {
    pub fn new(node: &Node, name: &str) -> Self {
        BoundDataset {
            node: node.clone(),
            name: name.to_string(),
        }
    }
}

impl BoundValue for BoundDataset {
    fn get(&self) -> Result<Value> {
        Ok(self
            .node
            .data(&self.name)
            .map(Value::Str)
            .unwrap_or(Value::Undefined))
    }

    fn set(&mut self, value: Value) -> Result<()> {
        self.node.set_data(&self.name, &value.to_string());
        Ok(())
    }
}

/// A set of mutually exclusive class names. The value is the 1-based index
/// of the present name, 0 for none.
pub struct BoundClass {
    node: Node,
    names: Vec<String>,
}

impl BoundClass {
    pub fn new(node: &Node, names: &[&str]) -> Self {
        BoundClass {
            node: node.clone(),
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

impl BoundValue for BoundClass {
    fn get(&self) -> Result<Value> {
        let index = self
            .names
            .iter()
            .position(|n| self.node.has_class(n))
            .map_or(0, |i| i + 1);
        Ok(Value::Int(index as i64))
    }

    fn set(&mut self, value: Value) -> Result<()> {
        let selected = match value {
            Value::Bool(true) => 1,
            Value::Bool(false) => 0,
            Value::Int(n) if n < 0 || n as usize > self.names.len() => {
                return Err(Error::ClassIndexOutOfRange {
                    index: n,
                    max: self.names.len(),
                })
            }
            Value::Int(n) => n as usize,
            other => {
                return Err(Error::TypeMismatch {
                    expected: "bool or int",
                    found: other.type_name(),
                })
            }
        };
        for name in &self.names {
            self.node.remove_class(name);
        }
        if selected > 0 {
            self.node.add_class(&self.names[selected - 1]);
        }
        Ok(())
    }
}

/// A named control of the form `form_depth` levels above the bound node.
pub struct BoundFormValue {
    form: Node,
    name: String,
    radio: bool,
}

impl BoundFormValue {
    pub fn new(node: &Node, form_depth: usize, name: &str, radio: bool) -> Result<Self> {
        let form = node
            .ancestor(form_depth)
            .filter(|f| f.tag_name().as_deref() == Some("form"))
            .ok_or(Error::FormNotFound { depth: form_depth })?;
        Ok(BoundFormValue {
            form,
            name: name.to_string(),
            radio,
        })
    }

    fn controls(&self) -> Result<Vec<Node>> {
        let controls = self.form.elements_named(&self.name);
        if controls.is_empty() {
            return Err(Error::ControlNotFound {
                name: self.name.clone(),
            });
        }
        Ok(controls)
    }
}

impl BoundValue for BoundFormValue {
    fn get(&self) -> Result<Value> {
        let controls = self.controls()?;
        if !self.radio {
            return Ok(controls[0].property("value"));
        }
        Ok(controls
            .iter()
            .find(|c| c.property("checked").truthy())
            .map(|c| c.property("value"))
            .unwrap_or(Value::Undefined))
    }

    fn set(&mut self, value: Value) -> Result<()> {
        let controls = self.controls()?;
        if !self.radio {
            controls[0].set_property("value", Value::Str(value.to_string()));
            return Ok(());
        }
        let wanted = match &value {
            Value::Str(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            other => {
                return Err(Error::TypeMismatch {
                    expected: "string or int",
                    found: other.type_name(),
                })
            }
        };
        let target = controls
            .iter()
            .find(|c| c.property("value").to_string() == wanted)
            .ok_or_else(|| Error::NoMatchingRadio {
                name: self.name.clone(),
                value: wanted.clone(),
            })?;
        for control in &controls {
            control.set_property("checked", Value::Bool(control.ptr_eq(target)));
        }
        Ok(())
    }
}

/// Read-only view of the event being dispatched. An empty name yields the
/// whole event.
pub struct BoundEventValue {
    event: Event,
    name: String,
}

impl BoundEventValue {
    pub fn new(event: &Event, name: &str) -> Self {
        BoundEventValue {
            event: event.clone(),
            name: name.to_string(),
        }
    }
}

impl BoundValue for BoundEventValue {
    fn get(&self) -> Result<Value> {
        if self.name.is_empty() {
            Ok(Value::Event(self.event.clone()))
        } else {
            Ok(self.event.get(&self.name))
        }
    }

    fn set(&mut self, _value: Value) -> Result<()> {
        Err(Error::ReadOnly)
    }
}

/// The bound node itself. Setting replaces it in its parent, either with
/// the given node or with a text node holding the value.
pub struct BoundSelf {
    node: Node,
}

impl BoundSelf {
    pub fn new(node: &Node) -> Self {
        BoundSelf { node: node.clone() }
    }
}

impl BoundValue for BoundSelf {
    fn get(&self) -> Result<Value> {
        Ok(Value::Node(self.node.clone()))
    }

    fn set(&mut self, value: Value) -> Result<()> {
        let replacement = match value {
            Value::Node(n) => n,
            other => Node::text(other.to_string()),
        };
        self.node.replace_with(&replacement)?;
        self.node = replacement;
        Ok(())
    }
}

/// Typed read access to a bound value, used to hand parameters to
/// handlers.
pub struct Typed<'a, T> {
    bound: &'a dyn BoundValue,
    _marker: PhantomData<T>,
}

impl<'a, T: FromValue> Typed<'a, T> {
    pub fn new(bound: &'a dyn BoundValue) -> Self {
        Typed {
            bound,
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> Result<T> {
        T::from_value(self.bound.get()?)
    }
}

/// A component member backed by a bound value.
pub struct Variable<T> {
    bound: Option<Box<dyn BoundValue>>,
    _marker: PhantomData<T>,
}

impl<T> Default for Variable<T> {
    fn default() -> Self {
        Variable {
            bound: None,
            _marker: PhantomData,
        }
    }
}

impl<T> Variable<T> {
    pub fn bind(&mut self, bound: impl BoundValue + 'static) {
        self.bound = Some(Box::new(bound));
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }
}

impl<T: FromValue + Into<Value>> Variable<T> {
    pub fn get(&self) -> Result<T> {
        let bound = self.bound.as_ref().ok_or(Error::Unbound)?;
        T::from_value(bound.get()?)
    }

    pub fn set(&mut self, value: T) -> Result<()> {
        let bound = self.bound.as_mut().ok_or(Error::Unbound)?;
        bound.set(value.into())
    }
}
