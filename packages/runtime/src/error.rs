//! Runtime Errors
//!
//! Every failure generated components can hit at runtime: lifecycle misuse,
//! path resolution against a cloned template, bound value type mismatches.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("component has not been initialized")]
    NotInitialized,

    #[error("component is not inserted into a document")]
    NotInserted,

    #[error("component is inserted; extract it before initializing again")]
    AlreadyInserted,

    #[error("component has been destroyed")]
    Destroyed,

    #[error("no node at path {path:?}")]
    PathNotFound { path: Vec<usize> },

    #[error("node is not a child of the given parent")]
    NotAChild,

    #[error("node has no parent")]
    NoParent,

    #[error("cannot insert a node into itself or one of its descendants")]
    HierarchyRequest,

    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("class index {index} out of range (0..={max})")]
    ClassIndexOutOfRange { index: i64, max: usize },

    #[error("no enclosing form {depth} level(s) up")]
    FormNotFound { depth: usize },

    #[error("form has no control named `{name}`")]
    ControlNotFound { name: String },

    #[error("radio group `{name}` has no item with value `{value}`")]
    NoMatchingRadio { name: String, value: String },

    #[error("event values are read-only")]
    ReadOnly,

    #[error("variable is not bound")]
    Unbound,

    #[error("event was not dispatched to a node")]
    NoCurrentTarget,

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("container has not been initialized")]
    ContainerNotInitialized,

    #[error("component is already borrowed")]
    Busy,
}
