//! Dynamically-typed values exchanged with the host.
//!
//! The host hands back loosely typed values (think script-engine values):
//! every field access is checked against the kind the bridge expects.

use std::collections::BTreeMap;

use strum::Display;

/// Kind of a host value, used in protocol errors and capability probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    Undefined,
    Null,
    Bool,
    Number,
    String,
    Bytes,
    Array,
    Object,
    Function,
}

/// A value passed from the host to a callback.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<HostValue>),
    Object(BTreeMap<String, HostValue>),
}

static UNDEFINED: HostValue = HostValue::Undefined;

impl HostValue {
    /// Build an object from key/value pairs.
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, HostValue)>,
    {
        HostValue::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// The `{ name, size, isDir }` shape hosts use to describe entries.
    pub fn file_info(name: impl Into<String>, size: u64, is_dir: bool) -> Self {
        HostValue::object([
            ("name", HostValue::String(name.into())),
            ("size", HostValue::Number(size as f64)),
            ("isDir", HostValue::Bool(is_dir)),
        ])
    }

    /// Kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            HostValue::Undefined => ValueKind::Undefined,
            HostValue::Null => ValueKind::Null,
            HostValue::Bool(_) => ValueKind::Bool,
            HostValue::Number(_) => ValueKind::Number,
            HostValue::String(_) => ValueKind::String,
            HostValue::Bytes(_) => ValueKind::Bytes,
            HostValue::Array(_) => ValueKind::Array,
            HostValue::Object(_) => ValueKind::Object,
        }
    }

    /// Object field lookup. Missing fields and non-objects yield `Undefined`.
    pub fn get(&self, key: &str) -> &HostValue {
        match self {
            HostValue::Object(fields) => fields.get(key).unwrap_or(&UNDEFINED),
            _ => &UNDEFINED,
        }
    }

    /// Script-style truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            HostValue::Undefined | HostValue::Null => false,
            HostValue::Bool(b) => *b,
            HostValue::Number(n) => *n != 0.0 && !n.is_nan(),
            HostValue::String(s) => !s.is_empty(),
            HostValue::Bytes(_) | HostValue::Array(_) | HostValue::Object(_) => true,
        }
    }

    /// String contents, `None` for any other kind.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::String(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::String(s)
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        HostValue::Number(n)
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<Vec<u8>> for HostValue {
    fn from(bytes: Vec<u8>) -> Self {
        HostValue::Bytes(bytes)
    }
}

impl From<Vec<HostValue>> for HostValue {
    fn from(items: Vec<HostValue>) -> Self {
        HostValue::Array(items)
    }
}
