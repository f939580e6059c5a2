//! # Lifecycle Errors

use lk_01_kv_store::KVStoreError;
use shared_types::ResponseCode;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// Corrupt root state or a failed commit write. The node must halt.
    #[error("fatal invariant violation: {0}")]
    FatalInvariantViolation(String),

    #[error("cannot remove non-existent validator {0}")]
    ValidatorNotFound(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("store error: {0}")]
    Store(#[from] KVStoreError),
}

impl LifecycleError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, LifecycleError::FatalInvariantViolation(_))
    }

    pub fn response_code(&self) -> ResponseCode {
        match self {
            LifecycleError::ValidatorNotFound(_) => ResponseCode::Unauthorized,
            LifecycleError::Encoding(_) => ResponseCode::EncodingError,
            _ => ResponseCode::UnknownError,
        }
    }
}
