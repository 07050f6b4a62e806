//! Value representations flowing through data streams.
//!
//! Values are plain [`serde_json::Value`]s. A [`Record`] is a key-value mapping
//! that keeps keys in insertion order, a [`Row`] is a positional tuple whose
//! order follows the stream's field list, and an [`Item`] is either of the two.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One unit of key-value input data, possibly nested.
pub type Record = serde_json::Map<String, Value>;

/// Positional values, one per field.
pub type Row = Vec<Value>;

/// Input accepted by [`DataTarget::append`](crate::DataTarget::append).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Item {
    Row(Row),
    Record(Record),
}

impl From<Row> for Item {
    fn from(row: Row) -> Self {
        Item::Row(row)
    }
}

impl From<Record> for Item {
    fn from(record: Record) -> Self {
        Item::Record(record)
    }
}

impl TryFrom<Value> for Item {
    type Error = anyhow::Error;

    fn try_from(value: Value) -> anyhow::Result<Self> {
        match value {
            Value::Array(row) => Ok(Item::Row(row)),
            Value::Object(record) => Ok(Item::Record(record)),
            other => anyhow::bail!(
                "expected an array or an object, got {}",
                ValueKind::of(&other)
            ),
        }
    }
}

/// Native kind of a value, as observed by a type probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Classify a value. Numbers representable as `i64`/`u64` are integers.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => ValueKind::Integer,
            Value::Number(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
