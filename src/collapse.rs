//! Flattening nested records into dotted keys and back.

use crate::error::StreamError;
use crate::value::Record;
use anyhow::Result;
use serde_json::Value;

/// Default separator for compound keys.
pub const KEY_SEPARATOR: &str = ".";

/// Flatten nested objects into a single-level record.
///
/// `{"a": {"b": 1}, "c": 2}` becomes `{"a.b": 1, "c": 2}`. Keys keep
/// depth-first insertion order. Arrays and scalars are kept as values; an empty
/// nested object contributes no keys.
pub fn collapse_record(record: &Record, separator: &str) -> Record {
    let mut out = Record::new();
    collapse_into(&mut out, record, None, separator);
    out
}

fn collapse_into(out: &mut Record, record: &Record, parent: Option<&str>, separator: &str) {
    for (key, value) in record {
        let full_key = match parent {
            Some(p) => format!("{p}{separator}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => collapse_into(out, nested, Some(&full_key), separator),
            other => {
                out.insert(full_key, other.clone());
            }
        }
    }
}

/// Rebuild nested objects from dotted keys.
///
/// # Errors
/// Returns [`StreamError::KeyConflict`] when a key needs to descend into a
/// prefix that already holds a non-object value (`{"a": 1, "a.b": 2}`).
pub fn expand_record(record: &Record, separator: &str) -> Result<Record> {
    let mut out = Record::new();
    for (key, value) in record {
        let mut parts = key.split(separator).peekable();
        let mut node = &mut out;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                if node.get(part).is_some_and(Value::is_object) {
                    return Err(StreamError::KeyConflict(key.clone()).into());
                }
                node.insert(part.to_string(), value.clone());
                break;
            }
            let child = node
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Record::new()));
            node = match child {
                Value::Object(map) => map,
                _ => return Err(StreamError::KeyConflict(key.clone()).into()),
            };
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn collapse_nested() {
        let r = rec(json!({"a": {"b": 1, "c": {"d": [1, 2]}}, "e": "x", "f": {}}));
        let flat = collapse_record(&r, KEY_SEPARATOR);
        assert_eq!(flat.keys().collect::<Vec<_>>(), vec!["a.b", "a.c.d", "e"]);
        assert_eq!(flat["a.c.d"], json!([1, 2]));
    }

    #[test]
    fn expand_inverts_collapse() -> Result<()> {
        let r = rec(json!({"a": {"b": 1, "c": {"d": true}}, "e": null}));
        let back = expand_record(&collapse_record(&r, "/"), "/")?;
        assert_eq!(back, r);
        Ok(())
    }

    #[test]
    fn expand_reports_conflicts() {
        let r = rec(json!({"a": 1, "a.b": 2}));
        let err = expand_record(&r, KEY_SEPARATOR).unwrap_err();
        assert_eq!(
            err.downcast_ref::<StreamError>(),
            Some(&StreamError::KeyConflict("a.b".into()))
        );

        let r = rec(json!({"a.b": 2, "a": 1}));
        assert!(expand_record(&r, KEY_SEPARATOR).is_err());
    }
}
