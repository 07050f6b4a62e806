//! Field inference: discover fields and storage types from a record stream.
//!
//! [`FieldInference`] pulls records one at a time, feeds each value into a
//! per-key [`TypeProbe`] and, once the scan is over, turns every probe into a
//! [`Field`]. Keys are reported in first-seen order.
//!
//! Nested objects can be handled two independent ways:
//! - **collapse**: each record is flattened with [`collapse_record`] before
//!   probing;
//! - **expand**: the engine itself descends into object values and probes their
//!   children under dotted keys.
//!
//! With either, `{"a": {"b": 1}}` yields a field `a.b` and no field `a`.
//! With neither, `a` is probed as an object value.
//!
//! # Example
//!
//! ```
//! use ironflow::{FieldInference, InferenceOptions, StorageType};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let records = vec![
//!     json!({"id": 1, "name": "Alice"}),
//!     json!({"id": 2, "name": "Bob", "tags": ["x"]}),
//! ];
//! let records = records
//!     .into_iter()
//!     .map(|v| Ok(v.as_object().cloned().unwrap_or_default()));
//!
//! let fields = FieldInference::new(InferenceOptions::default()).infer(records)?;
//! assert_eq!(fields.names(), vec!["id", "name", "tags"]);
//! assert_eq!(fields[0].storage_type, StorageType::Integer);
//! # Ok(())
//! # }
//! ```

use crate::collapse::{KEY_SEPARATOR, collapse_record};
use crate::error::StreamError;
use crate::field::{Field, FieldList, StorageType};
use crate::probe::{FieldTypeProbe, TypeProbe};
use crate::value::{Record, ValueKind};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Settings for one inference scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceOptions {
    /// Maximum number of records to probe; `0` scans the whole stream.
    pub limit: usize,
    /// Flatten each record before probing.
    pub collapse: bool,
    /// Descend into object values and probe their children.
    pub expand: bool,
    /// Joins parent and child keys.
    pub separator: String,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            limit: 0,
            collapse: false,
            expand: false,
            separator: KEY_SEPARATOR.to_string(),
        }
    }
}

impl InferenceOptions {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_collapse(mut self, collapse: bool) -> Self {
        self.collapse = collapse;
        self
    }

    pub fn with_expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    pub fn with_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.separator = separator.into();
        self
    }
}

/// Storage type for a native kind, if the kind has a direct mapping.
pub fn normalized_storage_type(kind: ValueKind) -> Option<StorageType> {
    match kind {
        ValueKind::String => Some(StorageType::String),
        ValueKind::Integer => Some(StorageType::Integer),
        ValueKind::Float => Some(StorageType::Float),
        ValueKind::Boolean => Some(StorageType::Boolean),
        ValueKind::Null | ValueKind::Array | ValueKind::Object => None,
    }
}

/// Build the field for a key from its probe summary.
///
/// Mixed or absent evidence gives `unknown`. A unique kind without a mapping
/// gives `unknown` and keeps the kind as `concrete_storage_type`.
pub fn field_from_summary(name: &str, unique: Option<ValueKind>) -> Field {
    let mut field = Field::new(name);
    match unique {
        None => field.storage_type = StorageType::Unknown,
        Some(kind) => match normalized_storage_type(kind) {
            Some(storage_type) => field.storage_type = storage_type,
            None => {
                field.storage_type = StorageType::Unknown;
                field.concrete_storage_type = Some(kind);
            }
        },
    }
    field
}

fn default_probe(key: &str) -> FieldTypeProbe {
    FieldTypeProbe::new(key)
}

/// Inference engine, generic over the probe factory.
pub struct FieldInference<F> {
    options: InferenceOptions,
    new_probe: F,
}

impl FieldInference<fn(&str) -> FieldTypeProbe> {
    /// Engine using [`FieldTypeProbe`].
    pub fn new(options: InferenceOptions) -> Self {
        Self {
            options,
            new_probe: default_probe,
        }
    }
}

impl<F, P> FieldInference<F>
where
    F: FnMut(&str) -> P,
    P: TypeProbe,
{
    /// Replace the probe factory. The factory is called once per new key.
    pub fn with_probe<G, Q>(self, new_probe: G) -> FieldInference<G>
    where
        G: FnMut(&str) -> Q,
        Q: TypeProbe,
    {
        FieldInference {
            options: self.options,
            new_probe,
        }
    }

    pub fn options(&self) -> &InferenceOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut InferenceOptions {
        &mut self.options
    }

    /// Scan `records` and return the discovered fields.
    ///
    /// The record counter is checked after each probed record, so with
    /// `limit = n` exactly `n` records are pulled and probed (fewer if the
    /// stream ends first).
    ///
    /// # Errors
    /// The first error from the iterator or a probe aborts the scan and is
    /// returned unchanged.
    pub fn infer<I>(&mut self, records: I) -> Result<FieldList>
    where
        I: IntoIterator<Item = Result<Record>>,
    {
        let mut scan = Scan::<P>::default();
        let limit = self.options.limit;
        let mut count = 0usize;

        for record in records {
            let record = record?;
            if self.options.collapse {
                let flat = collapse_record(&record, &self.options.separator);
                scan.probe_record(&flat, None, &self.options, &mut self.new_probe)?;
            } else {
                scan.probe_record(&record, None, &self.options, &mut self.new_probe)?;
            }
            count += 1;
            if limit != 0 && count >= limit {
                break;
            }
        }

        let fields = scan.into_fields()?;
        debug!(
            records = count,
            fields = fields.len(),
            limit,
            collapse = self.options.collapse,
            expand = self.options.expand,
            "inferred fields"
        );
        Ok(fields)
    }
}

/// Probes keyed by qualified name, plus first-seen order.
struct Scan<P> {
    keys: Vec<String>,
    probes: HashMap<String, P>,
}

impl<P> Default for Scan<P> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            probes: HashMap::new(),
        }
    }
}

impl<P: TypeProbe> Scan<P> {
    fn probe_record<F>(
        &mut self,
        record: &Record,
        parent: Option<&str>,
        options: &InferenceOptions,
        new_probe: &mut F,
    ) -> Result<()>
    where
        F: FnMut(&str) -> P,
    {
        for (key, value) in record {
            let full_key = match parent {
                Some(p) => format!("{p}{}{key}", options.separator),
                None => key.clone(),
            };

            if options.expand
                && let Value::Object(nested) = value
            {
                self.probe_record(nested, Some(&full_key), options, new_probe)?;
                continue;
            }

            let keys = &mut self.keys;
            let probe = self.probes.entry(full_key).or_insert_with_key(|k| {
                keys.push(k.clone());
                new_probe(k.as_str())
            });
            probe.probe(value)?;
        }
        Ok(())
    }

    fn into_fields(self) -> Result<FieldList> {
        let mut fields = FieldList::new();
        for key in &self.keys {
            let unique = self
                .probes
                .get(key)
                .ok_or_else(|| StreamError::probe(key.as_str(), "probe missing after scan"))?
                .unique_storage_type();
            fields.push(field_from_summary(key, unique))?;
        }
        Ok(fields)
    }
}
