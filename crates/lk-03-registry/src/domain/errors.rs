//! # Registry Errors

use lk_01_kv_store::KVStoreError;
use shared_types::Identity;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("store error: {0}")]
    Store(#[from] KVStoreError),

    /// A stored record did not decode, or a record failed to encode.
    #[error("serialization error at {key}: {message}")]
    Serialization { key: String, message: String },

    #[error("miner status not found: {0}")]
    MinerStatusNotFound(Identity),

    #[error("invalid miner status: {0}")]
    InvalidMinerStatus(u8),

    #[error("invalid job status: {0}")]
    InvalidJobStatus(u8),
}
