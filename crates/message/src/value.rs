//! Tagged scalar values stored per option

use serde::{Deserialize, Serialize};
use std::fmt;

/// One-of scalar slot of a message field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaggedValue {
    /// UTF-8 text
    String(String),
    /// Signed 64-bit integer
    Sint64(i64),
    /// Unsigned 64-bit integer
    Uint64(u64),
    /// Boolean
    Bool(bool),
    /// Single precision float
    Float(f32),
    /// Double precision float
    Double(f64),
    /// Raw bytes
    Bytes(Vec<u8>),
}

impl TaggedValue {
    /// Which slot is populated
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::Sint64(_) => ValueKind::Sint64,
            Self::Uint64(_) => ValueKind::Uint64,
            Self::Bool(_) => ValueKind::Bool,
            Self::Float(_) => ValueKind::Float,
            Self::Double(_) => ValueKind::Double,
            Self::Bytes(_) => ValueKind::Bytes,
        }
    }

    /// Text content, if this is a string slot
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }
}

impl From<String> for TaggedValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for TaggedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for TaggedValue {
    fn from(value: i64) -> Self {
        Self::Sint64(value)
    }
}

impl From<u64> for TaggedValue {
    fn from(value: u64) -> Self {
        Self::Uint64(value)
    }
}

impl From<bool> for TaggedValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for TaggedValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<Vec<u8>> for TaggedValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

/// Discriminant of [`TaggedValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `as_string`
    String,
    /// `as_sint64`
    Sint64,
    /// `as_uint64`
    Uint64,
    /// `as_bool`
    Bool,
    /// `as_float`
    Float,
    /// `as_double`
    Double,
    /// `as_bytes`
    Bytes,
}

impl ValueKind {
    /// Field kind name without the `as_` prefix
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Sint64 => "sint64",
            Self::Uint64 => "uint64",
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
