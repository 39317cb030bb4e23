//! Uniform, read-only field access over heterogeneous record shapes.
//!
//! The engines never look at a concrete record type. They ask for a field by
//! name through [`FieldAccess`] and receive a [`FieldValue`], so a typed
//! [`Receipt`](crate::models::Receipt) and a loosely-typed JSON object can be
//! searched, sorted and aggregated the same way.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;

/// One field of a record, as seen by the engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl FieldValue {
    /// Numeric coercion used by range search and every numeric aggregation.
    /// `None` means the record is skipped for that computation.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Number(_) => "number",
            FieldValue::Text(_) => "text",
            FieldValue::Bool(_) => "bool",
        }
    }

    /// Orders two values of the same kind. Values of different kinds have no
    /// ordering and yield `None`.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => Some(a.total_cmp(b)),
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::Number(n) => n.as_f64().map(FieldValue::Number),
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            other => Some(FieldValue::Text(other.to_string())),
        }
    }
}

/// Text form used by every text comparison. Whole numbers keep one decimal
/// place, so `10.0` reads as "10.0" rather than "10".
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{:.1}", n),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// Capability of a record to expose named fields.
pub trait FieldAccess {
    /// Returns the named field, or `None` when the record does not carry it.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Text form of a field; absent fields read as the empty string.
    fn field_text(&self, name: &str) -> String {
        self.field(name).map(|v| v.to_string()).unwrap_or_default()
    }

    /// Identifier used to de-duplicate results.
    fn record_key(&self) -> Option<String> {
        self.field("id").map(|v| v.to_string())
    }
}

impl FieldAccess for Map<String, Value> {
    fn field(&self, name: &str) -> Option<FieldValue> {
        self.get(name).and_then(FieldValue::from_json)
    }

    /// Uses the raw JSON text of `id`, so integer identifiers stay "7".
    fn record_key(&self) -> Option<String> {
        match self.get("id")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl<T: FieldAccess + ?Sized> FieldAccess for &T {
    fn field(&self, name: &str) -> Option<FieldValue> {
        (**self).field(name)
    }

    fn record_key(&self) -> Option<String> {
        (**self).record_key()
    }
}
