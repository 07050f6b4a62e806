//! Pre-built record sets for testing inference and stream handling.

use crate::value::Record;
use serde_json::{Value, json};

/// Turn a JSON object into a [`Record`]. Non-objects give an empty record.
///
/// # Example
///
/// ```
/// use ironflow::testing::record;
/// use serde_json::json;
///
/// let r = record(json!({"a": 1}));
/// assert_eq!(r["a"], json!(1));
/// ```
#[must_use]
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

/// Convert a list of JSON objects into records.
#[must_use]
pub fn records(values: Vec<Value>) -> Vec<Record> {
    values.into_iter().map(record).collect()
}

/// Five flat records.
///
/// `id` is always an integer, `name` always a string, `score` always a float.
/// `active` first appears in the third record and `note` (null) in the fifth.
#[must_use]
pub fn sample_flat_records() -> Vec<Record> {
    records(vec![
        json!({"id": 1, "name": "Alice", "score": 91.5}),
        json!({"id": 2, "name": "Bob", "score": 78.0}),
        json!({"id": 3, "name": "Carol", "score": 88.25, "active": true}),
        json!({"id": 4, "name": "Dave", "score": 65.0}),
        json!({"id": 5, "name": "Eve", "score": 72.5, "note": null}),
    ])
}

/// Two records with nested objects and arrays.
///
/// `id` is an integer in one record and a string in the other; `tags` is always
/// an array; `user.address.zip` only appears in the first record.
#[must_use]
pub fn sample_nested_records() -> Vec<Record> {
    records(vec![
        json!({
            "id": 1,
            "user": {"name": "Alice", "address": {"city": "Oslo", "zip": "0150"}},
            "tags": ["admin"]
        }),
        json!({
            "id": "2",
            "user": {"name": "Bob", "address": {"city": "Bergen"}},
            "tags": []
        }),
    ])
}
