//! # Root State
//!
//! Stored as JSON under `stateKey`, rewritten at every commit.

use super::errors::LifecycleError;
use lk_01_kv_store::KeyValueStore;
use lk_03_registry::MinerWorkRecords;
use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::serde_as;

pub const STATE_KEY: &[u8] = b"stateKey";

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Successfully applied transactions since genesis.
    pub size: i64,
    /// Number of committed blocks.
    pub height: i64,
    #[serde_as(as = "Base64")]
    #[serde(default)]
    pub app_hash: Vec<u8>,
    #[serde(default)]
    pub miner_activity_records: MinerWorkRecords,
}

impl AppState {
    /// Load the root record; an empty store yields the genesis state.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, LifecycleError> {
        let bytes = store
            .get(STATE_KEY)
            .map_err(|e| LifecycleError::FatalInvariantViolation(format!("reading state: {e}")))?;
        match bytes {
            None => Ok(Self::default()),
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                LifecycleError::FatalInvariantViolation(format!("corrupt state record: {e}"))
            }),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, LifecycleError> {
        serde_json::to_vec(self).map_err(|e| LifecycleError::Encoding(e.to_string()))
    }
}
