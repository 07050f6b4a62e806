#![cfg_attr(docsrs, feature(doc_cfg))]
//! # Ironflow
//!
//! **Data stream contracts and field inference** for ETL pipelines in Rust.
//! Ironflow gives every backend (file, database, web resource) the same
//! read/write surface and can discover the schema of record streams that do not
//! describe themselves.
//!
//! ## Key Features
//!
//! - **Scoped lifecycle** - `initialize` on entry, `finalize` on every exit path
//! - **Source contract** - read a stream as positional rows or key-value records
//! - **Target contract** - append rows or records, validated against the fields
//! - **Field inference** - discover fields in first-seen order and infer their
//!   storage types from observed values
//! - **Nested data** - flatten records or let inference descend into objects
//! - **Serde metadata** - field lists and inference options are plain serde types
//!
//! ## Quick Start
//!
//! ```
//! use ironflow::*;
//! use serde_json::json;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let mut source = RecordListSource::from_values(vec![
//!     json!({"id": 1, "user": {"name": "Alice"}}),
//!     json!({"id": 2, "user": {"name": "Bob"}, "vip": true}),
//! ])?;
//!
//! let fields = with_stream(&mut source, |s| s.read_fields(0, true))?;
//! assert_eq!(fields.names(), vec!["id", "user.name", "vip"]);
//! assert_eq!(fields[0].storage_type, StorageType::Integer);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Streams
//!
//! A [`DataStream`] is constructed without doing any I/O. [`open`] runs
//! [`DataStream::initialize`] and returns a [`StreamGuard`]; closing or dropping
//! the guard runs [`DataStream::finalize`] exactly once. [`with_stream`] wraps a
//! closure in that scope.
//!
//! ### Sources and targets
//!
//! A [`DataSource`] yields [`Row`]s and [`Record`]s lazily. A [`DataTarget`]
//! accepts an [`Item`], which is either of the two. Both expose their
//! [`FieldList`].
//!
//! ### Field inference
//!
//! [`DataSource::read_fields`] probes up to `limit` records (`0` for all),
//! builds one [`Field`] per distinct key, and stores the list on the stream.
//! [`FieldInference`] is the engine behind it and accepts custom
//! [`TypeProbe`]s.
//!
//! ## Module Overview
//!
//! - [`stream`] - lifecycle trait and scope guard
//! - [`source`] / [`target`] - read and write contracts
//! - [`inference`] - the field inference engine
//! - [`probe`] - per-field type evidence
//! - [`field`] - field metadata
//! - [`collapse`] - flattening nested records
//! - [`memory`] - in-memory source and target
//! - [`testing`] - fixtures and instrumented streams for tests

pub mod collapse;
pub mod error;
pub mod field;
pub mod inference;
pub mod memory;
pub mod probe;
pub mod source;
pub mod stream;
pub mod target;
pub mod value;

#[cfg_attr(docsrs, doc(cfg(feature = "testing")))]
#[cfg(feature = "testing")]
pub mod testing;

pub use collapse::{KEY_SEPARATOR, collapse_record, expand_record};
pub use error::StreamError;
pub use field::{AnalyticalType, Field, FieldList, FieldMut, StorageType};
pub use inference::{
    FieldInference, InferenceOptions, field_from_summary, normalized_storage_type,
};
pub use memory::{RecordListSource, RecordListTarget};
pub use probe::{FieldTypeProbe, TypeProbe};
pub use source::{DataSource, RecordIter, RowIter};
pub use stream::{DataStream, StreamGuard, open, with_stream};
pub use target::DataTarget;
pub use value::{Item, Record, Row, ValueKind};
