//! Testing utilities for code built on Ironflow streams.
//!
//! This module provides:
//!
//! - **Fixtures**: sample record sets, flat and nested
//! - **Instrumented streams**: [`CountingSource`], [`FailingSource`] and
//!   [`TrackedStream`] for checking how many records were pulled and how often
//!   lifecycle hooks ran
//! - **Probe stubs**: [`ProbeCounter`] and [`RejectingProbe`]
//! - **Assertions**: compare inferred field lists with expectations
//! - **Scratch files**: self-cleaning JSON files and directories for field
//!   list persistence
//!
//! # Quick Start
//!
//! ```
//! use ironflow::DataSource;
//! use ironflow::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut source = CountingSource::new(sample_flat_records());
//! let fields = source.read_fields(2, false)?;
//!
//! assert_eq!(source.pulled(), 2);
//! assert_field_names(&fields, &["id", "name", "score"]);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod scratch;
pub mod streams;

pub use assertions::*;
pub use fixtures::*;
pub use scratch::*;
pub use streams::*;
