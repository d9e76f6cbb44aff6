//! Dynamic Values
//!
//! The value type flowing through bound values. Generated code converts
//! between it and the declared Rust types with `From` and [`FromValue`].

use std::fmt;

use crate::dom::Node;
use crate::error::{Error, Result};
use crate::event::Event;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Node(Node),
    Event(Event),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Node(_) => "node",
            Value::Event(_) => "event",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Truthiness used for checkbox-like properties.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Node(_) | Value::Event(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined | Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
            Value::Node(n) => f.write_str(&n.text_content()),
            Value::Event(e) => write!(f, "[event {}]", e.kind()),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v.into())
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

/// Integers that may not fit an `i64` become floats, like numbers in a
/// browser document.
macro_rules! impl_from_wide_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                match i64::try_from(v) {
                    Ok(i) => Value::Int(i),
                    Err(_) => Value::Float(v as f64),
                }
            }
        })*
    };
}

impl_from_wide_int!(i128, isize, u64, u128, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Str(v.clone())
    }
}

impl From<Node> for Value {
    fn from(v: Node) -> Self {
        Value::Node(v)
    }
}

impl From<&Node> for Value {
    fn from(v: &Node) -> Self {
        Value::Node(v.clone())
    }
}

impl From<Event> for Value {
    fn from(v: Event) -> Self {
        Value::Event(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Typed extraction of a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Node(_) | Value::Event(_) => Err(mismatch("string", &value)),
            other => Ok(other.to_string()),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Str(ref s) if s == "true" => Ok(true),
            Value::Str(ref s) if s == "false" || s.is_empty() => Ok(false),
            Value::Undefined | Value::Null => Ok(false),
            Value::Int(i) => Ok(i != 0),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(i),
            Value::Float(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                Ok(f as i64)
            }
            Value::Bool(b) => Ok(b as i64),
            Value::Str(ref s) => s.trim().parse().map_err(|_| mismatch("int", &value)),
            other => Err(mismatch("int", &other)),
        }
    }
}

macro_rules! impl_from_value_int {
    ($($t:ty),*) => {
        $(impl FromValue for $t {
            fn from_value(value: Value) -> Result<Self> {
                let found = value.type_name();
                let wide = i64::from_value(value)?;
                <$t>::try_from(wide).map_err(|_| Error::TypeMismatch {
                    expected: stringify!($t),
                    found,
                })
            }
        })*
    };
}

impl_from_value_int!(i8, i16, i32, i128, isize, u8, u16, u32, u64, u128, usize);

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            Value::Str(ref s) => s.trim().parse().map_err(|_| mismatch("float", &value)),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        let found = value.type_name();
        let wide = f64::from_value(value)?;
        if wide.is_finite() && wide.abs() > f32::MAX as f64 {
            return Err(Error::TypeMismatch {
                expected: "f32",
                found,
            });
        }
        Ok(wide as f32)
    }
}

impl FromValue for Node {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Node(n) => Ok(n),
            other => Err(mismatch("node", &other)),
        }
    }
}

impl FromValue for Event {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Event(e) => Ok(e),
            other => Err(mismatch("event", &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Undefined | Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

fn mismatch(expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch {
        expected,
        found: found.type_name(),
    }
}
