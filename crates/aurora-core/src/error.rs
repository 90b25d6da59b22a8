//! Error types for the aurora reconciler
//!
//! This module defines all error types used throughout the crate.

use std::time::Duration;
use thiserror::Error;

use crate::types::ObjectKey;

/// Result type alias for reconciler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the reconciler
#[derive(Error, Debug)]
pub enum Error {
    /// Transient provider failure (network, throttling, invalid state)
    #[error("Provider error ({kind}): {message}")]
    Provider {
        /// Resource kind the call was made for
        kind: String,
        /// Error message
        message: String,
    },

    /// The provider (or the store) has no such resource
    #[error("Not found: {0}")]
    NotFound(String),

    /// Deletion blocked because something still references the target
    #[error("Still referenced: {0}")]
    StillReferenced(String),

    /// Optimistic-concurrency failure while committing a status
    #[error("Conflict on {key}: expected version {expected}, found {actual}")]
    Conflict {
        /// Object whose status could not be committed
        key: ObjectKey,
        /// Version the writer read
        expected: u64,
        /// Version currently stored
        actual: u64,
    },

    /// Object store errors
    #[error("Object store error: {0}")]
    Store(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a provider error for the given resource kind
    pub fn provider(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a "still referenced" error
    pub fn still_referenced(msg: impl Into<String>) -> Self {
        Self::StillReferenced(msg.into())
    }

    /// Create an object store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// `true` for [`Error::NotFound`]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// `true` for [`Error::StillReferenced`]
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::StillReferenced(_))
    }

    /// `true` for [`Error::Conflict`]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// A failed reconcile pass
///
/// The status handed to the pass is left untouched; the caller retries the
/// whole pass after `requeue_after`.
#[derive(Error, Debug)]
#[error("{source} (retry in {}s)", .requeue_after.as_secs())]
pub struct ReconcileError {
    /// What went wrong
    #[source]
    pub source: Error,
    /// Suggested delay before the next pass
    pub requeue_after: Duration,
}

impl ReconcileError {
    /// Pair an error with its retry delay
    pub fn new(source: Error, requeue_after: Duration) -> Self {
        Self {
            source,
            requeue_after,
        }
    }
}
