//! # Storage Errors

use thiserror::Error;

/// Errors raised by key-value store backends.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KVStoreError {
    /// Underlying I/O or engine failure.
    #[error("I/O error: {message}")]
    IOError { message: String },
}
