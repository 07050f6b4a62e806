//! Stream lifecycle shared by data sources and targets.
//!
//! Streams are constructed inert. [`DataStream::initialize`] acquires the
//! backend resource (file handle, connection, session) and
//! [`DataStream::finalize`] releases it. Use [`open`] or [`with_stream`] rather
//! than calling the hooks directly: both guarantee that `finalize` runs exactly
//! once per scope, whether the body returns normally, returns an error or
//! panics.
//!
//! ```
//! use ironflow::{DataSource, RecordListSource, with_stream};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut source = RecordListSource::from_values(vec![json!({"id": 1})])?;
//! let ids = with_stream(&mut source, |s| {
//!     s.records()?
//!         .map(|r| r.map(|rec| rec["id"].clone()))
//!         .collect::<anyhow::Result<Vec<_>>>()
//! })?;
//! assert_eq!(ids, vec![json!(1)]);
//! # Ok(())
//! # }
//! ```

use crate::field::FieldList;
use anyhow::Result;
use std::ops::{Deref, DerefMut};
use tracing::{trace, warn};

/// Behaviour shared by every readable or writable stream.
pub trait DataStream {
    /// Acquire backend resources. Called once when a scope is entered.
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release backend resources. Called once when a scope is left, on every
    /// exit path.
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Fields passed through this stream. Empty until assigned.
    fn fields(&self) -> &FieldList;
}

/// An initialized stream. Finalizes the stream on [`close`](Self::close) or,
/// failing that, on drop.
pub struct StreamGuard<'a, S: DataStream + ?Sized> {
    stream: &'a mut S,
    finalized: bool,
}

/// Initialize `stream` and return a guard that finalizes it.
///
/// If `initialize` fails, no guard is created and `finalize` is not called.
pub fn open<S: DataStream + ?Sized>(stream: &mut S) -> Result<StreamGuard<'_, S>> {
    stream.initialize()?;
    trace!("stream initialized");
    Ok(StreamGuard {
        stream,
        finalized: false,
    })
}

/// Run `body` inside an initialize/finalize scope.
///
/// `finalize` runs even when `body` fails. A body error takes precedence over a
/// finalize error; the latter is then only logged.
pub fn with_stream<S, T, F>(stream: &mut S, body: F) -> Result<T>
where
    S: DataStream + ?Sized,
    F: FnOnce(&mut S) -> Result<T>,
{
    let mut guard = open(stream)?;
    let result = body(&mut *guard);
    let closed = guard.close();
    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(finalize_err)) => {
            warn!(error = %finalize_err, "finalize failed after stream error");
            Err(err)
        }
    }
}

impl<S: DataStream + ?Sized> StreamGuard<'_, S> {
    /// Finalize the stream and report the outcome.
    pub fn close(mut self) -> Result<()> {
        self.finish()
    }

    fn finish(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }
        self.finalized = true;
        trace!("stream finalized");
        self.stream.finalize()
    }
}

impl<S: DataStream + ?Sized> Drop for StreamGuard<'_, S> {
    fn drop(&mut self) {
        if let Err(err) = self.finish() {
            warn!(error = %err, "finalize failed while dropping stream guard");
        }
    }
}

impl<S: DataStream + ?Sized> Deref for StreamGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.stream
    }
}

impl<S: DataStream + ?Sized> DerefMut for StreamGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.stream
    }
}
