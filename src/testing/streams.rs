//! Instrumented streams and probe stubs.

use crate::error::StreamError;
use crate::field::FieldList;
use crate::probe::{FieldTypeProbe, TypeProbe};
use crate::source::{DataSource, RecordIter, RowIter};
use crate::stream::DataStream;
use crate::value::{Record, ValueKind};
use anyhow::{Result, anyhow};
use serde_json::Value;
use std::cell::Cell;
use std::rc::Rc;

/// Source that counts how many records have been pulled from it.
///
/// Needs no initialize/finalize scope.
#[derive(Debug, Clone, Default)]
pub struct CountingSource {
    records: Vec<Record>,
    fields: FieldList,
    expand: bool,
    pulled: usize,
}

impl CountingSource {
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    /// Records handed out by `rows()` and `records()` so far.
    #[must_use]
    pub fn pulled(&self) -> usize {
        self.pulled
    }
}

impl DataStream for CountingSource {
    fn fields(&self) -> &FieldList {
        &self.fields
    }
}

impl DataSource for CountingSource {
    fn rows(&mut self) -> Result<RowIter<'_>> {
        let fields = &self.fields;
        let pulled = &mut self.pulled;
        Ok(Box::new(self.records.iter().map(move |r| {
            *pulled += 1;
            fields.record_to_row(r)
        })))
    }

    fn records(&mut self) -> Result<RecordIter<'_>> {
        let pulled = &mut self.pulled;
        Ok(Box::new(self.records.iter().map(move |r| {
            *pulled += 1;
            Ok(r.clone())
        })))
    }

    fn set_fields(&mut self, fields: FieldList) {
        self.fields = fields;
    }

    fn expand_nested(&self) -> bool {
        self.expand
    }
}

/// Source that yields its records and then fails with a backend error.
#[derive(Debug, Clone, Default)]
pub struct FailingSource {
    records: Vec<Record>,
    fields: FieldList,
    message: String,
}

impl FailingSource {
    /// Yield `records`, then an error carrying `message`.
    #[must_use]
    pub fn new<S: Into<String>>(records: Vec<Record>, message: S) -> Self {
        Self {
            records,
            fields: FieldList::new(),
            message: message.into(),
        }
    }
}

impl DataStream for FailingSource {
    fn fields(&self) -> &FieldList {
        &self.fields
    }
}

impl DataSource for FailingSource {
    fn rows(&mut self) -> Result<RowIter<'_>> {
        let fields = &self.fields;
        let message = self.message.clone();
        Ok(Box::new(
            self.records
                .iter()
                .map(move |r| fields.record_to_row(r))
                .chain(std::iter::once_with(move || Err(anyhow!(message)))),
        ))
    }

    fn records(&mut self) -> Result<RecordIter<'_>> {
        let message = self.message.clone();
        Ok(Box::new(
            self.records
                .iter()
                .cloned()
                .map(Ok)
                .chain(std::iter::once_with(move || Err(anyhow!(message)))),
        ))
    }

    fn set_fields(&mut self, fields: FieldList) {
        self.fields = fields;
    }
}

/// Stream that records lifecycle calls and can be told to fail them.
#[derive(Debug, Clone, Default)]
pub struct TrackedStream {
    pub fields: FieldList,
    pub initialized: usize,
    pub finalized: usize,
    pub fail_initialize: bool,
    pub fail_finalize: bool,
}

impl TrackedStream {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataStream for TrackedStream {
    fn initialize(&mut self) -> Result<()> {
        self.initialized += 1;
        if self.fail_initialize {
            return Err(anyhow!("initialize failed"));
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.finalized += 1;
        if self.fail_finalize {
            return Err(anyhow!("finalize failed"));
        }
        Ok(())
    }

    fn fields(&self) -> &FieldList {
        &self.fields
    }
}

/// Shared counter of probe calls across all probes made by its factory.
///
/// # Example
///
/// ```
/// use ironflow::{DataSource, FieldInference, InferenceOptions};
/// use ironflow::testing::*;
///
/// # fn main() -> anyhow::Result<()> {
/// let counter = ProbeCounter::new();
/// let engine = FieldInference::new(InferenceOptions::default()).with_probe(counter.factory());
///
/// let mut source = CountingSource::new(sample_flat_records());
/// source.read_fields_with(engine)?;
/// assert_eq!(counter.probes_created(), 5);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProbeCounter {
    values: Rc<Cell<usize>>,
    probes: Rc<Cell<usize>>,
}

impl ProbeCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory producing [`CountingProbe`]s tied to this counter.
    pub fn factory(&self) -> impl FnMut(&str) -> CountingProbe + use<> {
        let values = Rc::clone(&self.values);
        let probes = Rc::clone(&self.probes);
        move |key: &str| {
            probes.set(probes.get() + 1);
            CountingProbe {
                inner: FieldTypeProbe::new(key),
                values: Rc::clone(&values),
            }
        }
    }

    /// Values fed to any probe.
    #[must_use]
    pub fn values_probed(&self) -> usize {
        self.values.get()
    }

    /// Probes created, one per distinct key.
    #[must_use]
    pub fn probes_created(&self) -> usize {
        self.probes.get()
    }
}

/// [`FieldTypeProbe`] that also bumps a shared counter.
#[derive(Debug)]
pub struct CountingProbe {
    inner: FieldTypeProbe,
    values: Rc<Cell<usize>>,
}

impl TypeProbe for CountingProbe {
    fn probe(&mut self, value: &Value) -> Result<()> {
        self.values.set(self.values.get() + 1);
        self.inner.probe(value)
    }

    fn unique_storage_type(&self) -> Option<ValueKind> {
        self.inner.unique_storage_type()
    }
}

/// Probe that fails on values of one kind.
#[derive(Debug, Clone)]
pub struct RejectingProbe {
    field: String,
    reject: ValueKind,
    inner: FieldTypeProbe,
}

impl RejectingProbe {
    #[must_use]
    pub fn new<S: Into<String>>(field: S, reject: ValueKind) -> Self {
        let field = field.into();
        Self {
            inner: FieldTypeProbe::new(field.clone()),
            field,
            reject,
        }
    }

    /// Factory rejecting `reject` values for every key.
    pub fn factory(reject: ValueKind) -> impl FnMut(&str) -> RejectingProbe {
        move |key: &str| RejectingProbe::new(key, reject)
    }
}

impl TypeProbe for RejectingProbe {
    fn probe(&mut self, value: &Value) -> Result<()> {
        let kind = ValueKind::of(value);
        if kind == self.reject {
            let message = format!("{kind} values are not accepted");
            return Err(StreamError::probe(&self.field, message).into());
        }
        self.inner.probe(value)
    }

    fn unique_storage_type(&self) -> Option<ValueKind> {
        self.inner.unique_storage_type()
    }
}
