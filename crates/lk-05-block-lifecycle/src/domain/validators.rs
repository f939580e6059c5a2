//! # Validator Records
//!
//! Each validator is a bincode `ValidatorUpdate` under `val:<pubkey bytes>`.
//! The address index maps consensus addresses (used by evidence) back to keys.

use super::errors::LifecycleError;
use shared_types::{ValidatorPubKey, ValidatorUpdate};
use std::collections::BTreeMap;

pub const VALIDATOR_PREFIX: &[u8] = b"val:";

pub fn validator_key(pub_key: &ValidatorPubKey) -> Vec<u8> {
    let mut key = VALIDATOR_PREFIX.to_vec();
    key.extend_from_slice(pub_key.as_bytes());
    key
}

pub fn encode_validator(update: &ValidatorUpdate) -> Result<Vec<u8>, LifecycleError> {
    bincode::serialize(update).map_err(|e| LifecycleError::Encoding(e.to_string()))
}

pub fn decode_validator(bytes: &[u8]) -> Result<ValidatorUpdate, LifecycleError> {
    bincode::deserialize(bytes)
        .map_err(|e| LifecycleError::FatalInvariantViolation(format!("corrupt validator record: {e}")))
}

/// Consensus address → public key.
#[derive(Debug, Clone, Default)]
pub struct ValidatorIndex {
    by_address: BTreeMap<Vec<u8>, ValidatorPubKey>,
}

impl ValidatorIndex {
    /// Rebuild from `val:` records as returned by a prefix scan.
    pub fn from_records(records: &[(Vec<u8>, Vec<u8>)]) -> Result<Self, LifecycleError> {
        let mut index = Self::default();
        for (_, value) in records {
            let update = decode_validator(value)?;
            index.insert(update.pub_key);
        }
        Ok(index)
    }

    pub fn insert(&mut self, pub_key: ValidatorPubKey) {
        self.by_address.insert(pub_key.address(), pub_key);
    }

    pub fn remove(&mut self, pub_key: &ValidatorPubKey) {
        self.by_address.remove(&pub_key.address());
    }

    pub fn lookup(&self, address: &[u8]) -> Option<ValidatorPubKey> {
        self.by_address.get(address).copied()
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}
