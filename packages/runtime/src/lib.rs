//! Runtime support for components generated from binding templates.
//!
//! Generated code refers to this crate as `rt`: it clones templates into
//! [`ComponentData`], re-locates bound nodes by path, and wires bound values,
//! event listeners and embedded components.

pub mod bound;
pub mod component;
pub mod control;
pub mod dom;
pub mod error;
pub mod event;
pub mod list;
pub mod value;

pub use bound::{
    assign, BoundClass, BoundDataset, BoundEventValue, BoundFormValue, BoundProperty, BoundSelf,
    BoundStyle, BoundValue, Typed, Variable,
};
pub use component::{Component, ComponentData, Handle, LifecycleState, NoController, Reparent};
pub use control::{ConditionalSlot, Repeat};
pub use dom::{Node, NodeType};
pub use error::{Error, Result};
pub use event::Event;
pub use list::{List, ListManager, Optional};
pub use value::{FromValue, Value};

/// Wraps a freshly allocated component in a handle.
pub fn handle<T>(component: T) -> Handle<T> {
    std::rc::Rc::new(std::cell::RefCell::new(component))
}
