//! Per-field type evidence accumulators.
//!
//! The inference engine creates one probe per qualified key and feeds it every
//! value seen under that key. After the scan the probe is asked for a single
//! summary: the unique native kind, or nothing when evidence is mixed or absent.

use crate::value::ValueKind;
use anyhow::Result;
use serde_json::Value;
use std::collections::BTreeSet;

/// Accumulates type evidence for one field.
pub trait TypeProbe {
    /// Record one observed value.
    ///
    /// # Errors
    /// Implementations may reject a value; the error aborts inference.
    fn probe(&mut self, value: &Value) -> Result<()>;

    /// The kind shared by every probed value, if there is exactly one.
    fn unique_storage_type(&self) -> Option<ValueKind>;
}

/// Default probe: tracks the set of observed native kinds and a few counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTypeProbe {
    field: String,
    storage_types: BTreeSet<ValueKind>,
    value_count: usize,
    null_count: usize,
    empty_string_count: usize,
}

impl FieldTypeProbe {
    pub fn new<S: Into<String>>(field: S) -> Self {
        Self {
            field: field.into(),
            ..Default::default()
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// All kinds observed so far, in a stable order.
    pub fn storage_types(&self) -> impl Iterator<Item = ValueKind> + '_ {
        self.storage_types.iter().copied()
    }

    pub fn value_count(&self) -> usize {
        self.value_count
    }

    pub fn null_count(&self) -> usize {
        self.null_count
    }

    pub fn empty_string_count(&self) -> usize {
        self.empty_string_count
    }
}

impl TypeProbe for FieldTypeProbe {
    fn probe(&mut self, value: &Value) -> Result<()> {
        self.value_count += 1;
        match value {
            Value::Null => self.null_count += 1,
            Value::String(s) if s.is_empty() => self.empty_string_count += 1,
            _ => {}
        }
        self.storage_types.insert(ValueKind::of(value));
        Ok(())
    }

    fn unique_storage_type(&self) -> Option<ValueKind> {
        if self.storage_types.len() == 1 {
            self.storage_types.first().copied()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unique_type_requires_agreement() -> Result<()> {
        let mut p = FieldTypeProbe::new("a");
        assert_eq!(p.unique_storage_type(), None);

        p.probe(&json!(1))?;
        p.probe(&json!(2))?;
        assert_eq!(p.unique_storage_type(), Some(ValueKind::Integer));

        p.probe(&json!("x"))?;
        assert_eq!(p.unique_storage_type(), None);
        assert_eq!(p.value_count(), 3);
        Ok(())
    }

    #[test]
    fn counts_nulls_and_empty_strings() -> Result<()> {
        let mut p = FieldTypeProbe::new("a");
        for v in [json!(null), json!(""), json!("x"), json!(null)] {
            p.probe(&v)?;
        }
        assert_eq!(p.null_count(), 2);
        assert_eq!(p.empty_string_count(), 1);
        assert_eq!(
            p.storage_types().collect::<Vec<_>>(),
            vec![ValueKind::Null, ValueKind::String]
        );
        Ok(())
    }
}
