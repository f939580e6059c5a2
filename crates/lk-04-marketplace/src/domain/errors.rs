//! # Marketplace Errors

use lk_02_tx_auth::CodecError;
use lk_03_registry::{JobStatus, RegistryError};
use shared_types::{Identity, ResponseCode};
use thiserror::Error;

/// Domain failure of a single transaction. The transaction's writes are
/// discarded and `size` is not incremented.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MarketError {
    #[error("no miners available for service type {0}")]
    NoMinersAvailable(u64),

    #[error("service {0} already requested")]
    DuplicateServiceId(String),

    #[error("job {service_id} not found for miner {miner}")]
    JobNotFound { miner: Identity, service_id: String },

    #[error("miner not registered: {0}")]
    MinerNotRegistered(Identity),

    #[error("job {service_id} cannot start from status {from:?}")]
    InvalidJobTransition { service_id: String, from: JobStatus },

    #[error("payload error: {0}")]
    Payload(#[from] CodecError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl MarketError {
    pub fn response_code(&self) -> ResponseCode {
        ResponseCode::UnknownError
    }
}
