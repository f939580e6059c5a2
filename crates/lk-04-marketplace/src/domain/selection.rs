//! # Deterministic Miner Selection
//!
//! `index = U256(sha256(decimal(height) || hex(app_hash) || service_id)) mod n`
//!
//! The app hash is the one committed before the block started, so the draw
//! cannot be known before the block is built yet every replica reproduces it.

use primitive_types::U256;
use sha2::{Digest, Sha256};
use shared_types::{Hash, Identity};

pub fn selection_digest(height: i64, app_hash: &[u8], service_id: &str) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(height.to_string().as_bytes());
    hasher.update(hex::encode(app_hash).as_bytes());
    hasher.update(service_id.as_bytes());
    hasher.finalize().into()
}

/// Pick one candidate. `None` when there are no candidates.
pub fn select_miner<'a>(
    candidates: &'a [Identity],
    height: i64,
    app_hash: &[u8],
    service_id: &str,
) -> Option<&'a Identity> {
    if candidates.is_empty() {
        return None;
    }
    let digest = selection_digest(height, app_hash, service_id);
    let index = U256::from_big_endian(&digest) % U256::from(candidates.len());
    candidates.get(index.low_u64() as usize)
}

/// `hex(sha256(sender || meta || decimal(height)))`
pub fn derive_service_id(sender: &Identity, meta: &[u8], height: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sender.as_bytes());
    hasher.update(meta);
    hasher.update(height.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
