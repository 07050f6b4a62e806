//! Readable streams.

use crate::field::FieldList;
use crate::inference::{FieldInference, InferenceOptions};
use crate::probe::TypeProbe;
use crate::stream::DataStream;
use crate::value::{Record, Row};
use anyhow::Result;

/// Lazy sequence of positional rows.
pub type RowIter<'a> = Box<dyn Iterator<Item = Result<Row>> + 'a>;

/// Lazy sequence of key-value records.
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<Record>> + 'a>;

/// A stream that can be read from.
///
/// Backends provide [`rows`](Self::rows) and [`records`](Self::records).
/// Whether either can be traversed more than once is backend-specific; for a
/// single-pass backend run [`read_fields`](Self::read_fields) before any other
/// consumption.
pub trait DataSource: DataStream {
    /// Values in field order, one tuple per record.
    fn rows(&mut self) -> Result<RowIter<'_>>;

    /// One key-value mapping per record.
    fn records(&mut self) -> Result<RecordIter<'_>>;

    /// Replace the stream's field list.
    fn set_fields(&mut self, fields: FieldList);

    /// Whether inference descends into nested objects. Off by default.
    fn expand_nested(&self) -> bool {
        false
    }

    /// Discover fields by probing records.
    ///
    /// Intended for backends without their own metadata (CSV, document
    /// stores, directories of structured files). Reads at most `limit` records,
    /// or all of them when `limit` is `0`, which can be costly. With `collapse`
    /// every record is flattened before probing.
    ///
    /// On success the result is also assigned to the stream's fields, where it
    /// may be refined further. On failure the fields are left untouched.
    fn read_fields(&mut self, limit: usize, collapse: bool) -> Result<FieldList> {
        let options = InferenceOptions::default()
            .with_limit(limit)
            .with_collapse(collapse)
            .with_expand(self.expand_nested());
        let fields = FieldInference::new(options).infer(self.records()?)?;
        self.set_fields(fields.clone());
        Ok(fields)
    }

    /// [`read_fields`](Self::read_fields) with a caller-configured engine.
    fn read_fields_with<F, P>(&mut self, mut engine: FieldInference<F>) -> Result<FieldList>
    where
        Self: Sized,
        F: FnMut(&str) -> P,
        P: TypeProbe,
    {
        let fields = engine.infer(self.records()?)?;
        self.set_fields(fields.clone());
        Ok(fields)
    }
}
