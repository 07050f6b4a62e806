//! Writable streams.

use crate::stream::DataStream;
use crate::value::{Item, Record, Row};
use anyhow::Result;

/// A stream that can be written to.
///
/// A positional [`Item::Row`] must carry exactly one value per field, in field
/// order; otherwise the append fails with
/// [`StreamError::CardinalityMismatch`](crate::StreamError::CardinalityMismatch).
/// Every key of an [`Item::Record`] must be a field name; otherwise the append
/// fails with [`StreamError::UnknownField`](crate::StreamError::UnknownField).
/// [`FieldList::check_row`](crate::FieldList::check_row) and
/// [`FieldList::check_record`](crate::FieldList::check_record) implement both
/// checks for backends.
pub trait DataTarget: DataStream {
    /// Append a row or a record.
    fn append(&mut self, item: Item) -> Result<()>;

    /// Append a row. Backends may override this to skip dispatch.
    fn append_row(&mut self, row: Row) -> Result<()> {
        self.append(Item::Row(row))
    }

    /// Append a record. Backends may override this to skip dispatch.
    fn append_record(&mut self, record: Record) -> Result<()> {
        self.append(Item::Record(record))
    }
}
