//! Values bound to statement placeholders and the rows read back.
//!
//! A [`Value`] is never interpolated into SQL text. The builder records it in
//! [`Bindings`] under a placeholder name and the connection binds it when the
//! statement is executed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single bindable SQL value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// One result row, keyed by column name.
pub type Row = HashMap<String, Value>;

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the text payload, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => Text,
    &str => Text,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// The error returned when a JSON value has no scalar SQL counterpart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("json {kind} cannot be bound as a sql value")]
pub struct NotScalar {
    kind: &'static str,
}

impl TryFrom<serde_json::Value> for Value {
    type Error = NotScalar;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float))
                .ok_or(NotScalar { kind: "number" }),
            serde_json::Value::String(s) => Ok(Value::Text(s)),
            serde_json::Value::Array(_) => Err(NotScalar { kind: "array" }),
            serde_json::Value::Object(_) => Err(NotScalar { kind: "object" }),
        }
    }
}

/// Placeholder name to value map, kept in the order the placeholders were
/// allocated.
///
/// Names are stored with their leading colon (`:p0`, `:email`), exactly as
/// they appear in the rendered SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    entries: Vec<(String, Value)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Records `value` under `name`, replacing an earlier value bound to the
    /// same name.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Appends a binding whose name is known to be fresh.
    pub(crate) fn push(&mut self, name: String, value: Value) {
        self.entries.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// The bound values in placeholder allocation order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Appends the bindings of `other`, whose names must not occur in `self`.
    pub(crate) fn extend_from(&mut self, other: &Bindings) {
        self.entries.extend(other.entries.iter().cloned());
    }
}

impl<'a> IntoIterator for &'a Bindings {
    type Item = &'a (String, Value);
    type IntoIter = std::slice::Iter<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
