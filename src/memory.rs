//! In-memory streams.
//!
//! [`RecordListSource`] serves records from a `Vec` and can be traversed any
//! number of times. [`RecordListTarget`] validates and collects appended items.
//! Both refuse to be used outside an initialize/finalize scope, just like a
//! file- or connection-backed stream would.
//!
//! Once fields have been inferred with collapse or expansion, the source's
//! rows are read from the flattened records, so nested values land in the
//! dotted fields that inference produced.

use crate::collapse::collapse_record;
use crate::error::StreamError;
use crate::field::FieldList;
use crate::inference::{FieldInference, InferenceOptions};
use crate::probe::TypeProbe;
use crate::source::{DataSource, RecordIter, RowIter};
use crate::stream::DataStream;
use crate::target::DataTarget;
use crate::value::{Item, Record, Row};
use anyhow::{Context, Result, bail};
use serde_json::Value;

/// Lifecycle bookkeeping shared by the in-memory streams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Lifecycle {
    open: bool,
    initialized: usize,
    finalized: usize,
}

impl Lifecycle {
    fn initialize(&mut self) {
        self.open = true;
        self.initialized += 1;
    }

    fn finalize(&mut self) {
        self.open = false;
        self.finalized += 1;
    }

    fn ensure_open(&self) -> Result<()> {
        if !self.open {
            return Err(StreamError::NotInitialized.into());
        }
        Ok(())
    }
}

/// Source reading records held in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordListSource {
    records: Vec<Record>,
    fields: FieldList,
    expand: bool,
    /// Set when rows are projected from flattened records.
    row_separator: Option<String>,
    lifecycle: Lifecycle,
}

impl RecordListSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    /// Build from JSON values. Every value must be an object.
    pub fn from_values(values: Vec<Value>) -> Result<Self> {
        let records = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| match v {
                Value::Object(record) => Ok(record),
                other => bail!("value #{} is not an object: {}", i + 1, other),
            })
            .collect::<Result<Vec<_>>>()
            .context("build record list source")?;
        Ok(Self::new(records))
    }

    /// Start with a known field list instead of inferring one.
    pub fn with_fields(mut self, fields: FieldList) -> Self {
        self.fields = fields;
        self
    }

    /// Let inference descend into nested objects.
    pub fn with_expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    /// Flatten records with `separator` before projecting them onto rows.
    ///
    /// Inference sets this on its own; use it with
    /// [`with_fields`](Self::with_fields) when the field list already holds
    /// dotted names.
    pub fn with_flattened_rows<S: Into<String>>(mut self, separator: S) -> Self {
        self.row_separator = Some(separator.into());
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn initialize_count(&self) -> usize {
        self.lifecycle.initialized
    }

    pub fn finalize_count(&self) -> usize {
        self.lifecycle.finalized
    }

    fn adopt_inferred(&mut self, fields: &FieldList, options: &InferenceOptions) {
        self.row_separator =
            (options.collapse || options.expand).then(|| options.separator.clone());
        self.fields = fields.clone();
    }
}

impl DataStream for RecordListSource {
    fn initialize(&mut self) -> Result<()> {
        self.lifecycle.initialize();
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.lifecycle.finalize();
        Ok(())
    }

    fn fields(&self) -> &FieldList {
        &self.fields
    }
}

impl DataSource for RecordListSource {
    /// Records projected onto the current field list. Keys outside the field
    /// list fail with [`StreamError::UnknownField`]; missing keys read as null.
    fn rows(&mut self) -> Result<RowIter<'_>> {
        self.lifecycle.ensure_open()?;
        let fields = &self.fields;
        let separator = self.row_separator.as_deref();
        Ok(Box::new(self.records.iter().map(move |r| match separator {
            Some(sep) => fields.record_to_row(&collapse_record(r, sep)),
            None => fields.record_to_row(r),
        })))
    }

    fn records(&mut self) -> Result<RecordIter<'_>> {
        self.lifecycle.ensure_open()?;
        Ok(Box::new(self.records.iter().cloned().map(Ok)))
    }

    fn set_fields(&mut self, fields: FieldList) {
        self.fields = fields;
    }

    fn expand_nested(&self) -> bool {
        self.expand
    }

    fn read_fields(&mut self, limit: usize, collapse: bool) -> Result<FieldList> {
        let options = InferenceOptions::default()
            .with_limit(limit)
            .with_collapse(collapse)
            .with_expand(self.expand);
        let fields = FieldInference::new(options.clone()).infer(self.records()?)?;
        self.adopt_inferred(&fields, &options);
        Ok(fields)
    }

    fn read_fields_with<F, P>(&mut self, mut engine: FieldInference<F>) -> Result<FieldList>
    where
        Self: Sized,
        F: FnMut(&str) -> P,
        P: TypeProbe,
    {
        let fields = engine.infer(self.records()?)?;
        self.adopt_inferred(&fields, engine.options());
        Ok(fields)
    }
}

/// Target collecting appended items as records.
#[derive(Debug, Clone, Default)]
pub struct RecordListTarget {
    fields: FieldList,
    records: Vec<Record>,
    lifecycle: Lifecycle,
}

impl RecordListTarget {
    pub fn new(fields: FieldList) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    /// Records appended so far. Rows are stored keyed by field name.
    pub fn appended(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn initialize_count(&self) -> usize {
        self.lifecycle.initialized
    }

    pub fn finalize_count(&self) -> usize {
        self.lifecycle.finalized
    }
}

impl DataStream for RecordListTarget {
    fn initialize(&mut self) -> Result<()> {
        self.lifecycle.initialize();
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.lifecycle.finalize();
        Ok(())
    }

    fn fields(&self) -> &FieldList {
        &self.fields
    }
}

impl DataTarget for RecordListTarget {
    fn append(&mut self, item: Item) -> Result<()> {
        match item {
            Item::Row(row) => self.append_row(row),
            Item::Record(record) => self.append_record(record),
        }
    }

    fn append_row(&mut self, row: Row) -> Result<()> {
        self.lifecycle.ensure_open()?;
        let record = self.fields.row_to_record(row)?;
        self.records.push(record);
        Ok(())
    }

    fn append_record(&mut self, record: Record) -> Result<()> {
        self.lifecycle.ensure_open()?;
        self.fields.check_record(&record)?;
        self.records.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::with_stream;
    use serde_json::json;

    #[test]
    fn use_outside_scope_is_rejected() -> Result<()> {
        let mut source = RecordListSource::from_values(vec![json!({"a": 1})])?;
        let err = source.records().err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("stream is not initialized"));

        let mut target = RecordListTarget::new(FieldList::from_names(["a"])?);
        assert!(target.append_row(vec![json!(1)]).is_err());
        Ok(())
    }

    #[test]
    fn from_values_rejects_scalars() {
        let err = RecordListSource::from_values(vec![json!({"a": 1}), json!(3)]).unwrap_err();
        assert!(format!("{err:#}").contains("value #2 is not an object"));
    }

    #[test]
    fn rows_follow_field_order() -> Result<()> {
        let mut source = RecordListSource::from_values(vec![json!({"a": 1, "b": 2})])?
            .with_fields(FieldList::from_names(["b", "a"])?);
        let rows = with_stream(&mut source, |s| s.rows()?.collect::<Result<Vec<_>>>())?;
        assert_eq!(rows, vec![vec![json!(2), json!(1)]]);
        Ok(())
    }

    #[test]
    fn flattened_rows_with_known_fields() -> Result<()> {
        let mut source = RecordListSource::from_values(vec![json!({"a": {"b": 1}, "c": 2})])?
            .with_fields(FieldList::from_names(["c", "a/b"])?)
            .with_flattened_rows("/");
        let rows = with_stream(&mut source, |s| s.rows()?.collect::<Result<Vec<_>>>())?;
        assert_eq!(rows, vec![vec![json!(2), json!(1)]]);
        Ok(())
    }

    #[test]
    fn plain_inference_reads_rows_unflattened() -> Result<()> {
        let mut source = RecordListSource::from_values(vec![json!({"a": {"b": 1}})])?;
        let rows = with_stream(&mut source, |s| {
            s.read_fields(0, false)?;
            s.rows()?.collect::<Result<Vec<_>>>()
        })?;
        assert_eq!(rows, vec![vec![json!({"b": 1})]]);
        Ok(())
    }
}
