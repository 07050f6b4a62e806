//! Error taxonomy for data streams.
//!
//! Public operations in this crate return [`anyhow::Result`]. Failures that
//! callers may want to match on are raised as [`StreamError`] values, which can
//! be recovered from an [`anyhow::Error`] with `downcast_ref::<StreamError>()`.
//! Errors coming from a backend or a probe are propagated unchanged.

use thiserror::Error;

/// Typed failures raised by stream contracts and field metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// A positional row did not have one value per declared field.
    #[error("row has {actual} values but {expected} fields are declared")]
    CardinalityMismatch { expected: usize, actual: usize },

    /// A record key does not name any field in the field list.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A field with this name is already present in the field list.
    #[error("duplicate field '{0}'")]
    DuplicateField(String),

    /// A dotted key cannot be expanded because a prefix already holds a value.
    #[error("key '{0}' conflicts with an existing non-object value")]
    KeyConflict(String),

    /// The stream was used outside an initialize/finalize scope.
    #[error("stream is not initialized")]
    NotInitialized,

    /// A type probe rejected a value.
    #[error("probe for field '{field}' failed: {message}")]
    Probe { field: String, message: String },
}

impl StreamError {
    /// Shorthand for [`StreamError::Probe`].
    pub fn probe<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Probe {
            field: field.into(),
            message: message.into(),
        }
    }
}
