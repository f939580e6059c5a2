//! # Commit Hashing
//!
//! `app_hash = sha256(json{size, height, app_hash} || json(activity) || digest(block writes))`
//!
//! All inputs are canonical: struct fields serialize in declaration order,
//! maps are ordered, and the write set is walked in key order.

use super::errors::LifecycleError;
use super::state::AppState;
use lk_01_kv_store::WriteSet;
use serde::Serialize;
use serde_with::base64::Base64;
use serde_with::serde_as;
use sha2::{Digest, Sha256};
use shared_types::Hash;

#[serde_as]
#[derive(Serialize)]
struct StateHeader {
    size: i64,
    height: i64,
    #[serde_as(as = "Base64")]
    app_hash: Vec<u8>,
}

/// Digest of every key/value mutated in a block.
pub fn write_set_digest(writes: &WriteSet) -> Hash {
    let mut hasher = Sha256::new();
    for (key, value) in writes.iter() {
        hasher.update((key.len() as u64).to_be_bytes());
        hasher.update(key);
        match value {
            Some(value) => {
                hasher.update([1u8]);
                hasher.update((value.len() as u64).to_be_bytes());
                hasher.update(value);
            }
            None => hasher.update([0u8]),
        }
    }
    hasher.finalize().into()
}

/// Hash the pre-commit state together with the block's writes.
pub fn commit_hash(state: &AppState, writes: &WriteSet) -> Result<Hash, LifecycleError> {
    let header = serde_json::to_vec(&StateHeader {
        size: state.size,
        height: state.height,
        app_hash: state.app_hash.clone(),
    })
    .map_err(|e| LifecycleError::Encoding(e.to_string()))?;
    let activity = serde_json::to_vec(&state.miner_activity_records)
        .map_err(|e| LifecycleError::Encoding(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(&header);
    hasher.update(&activity);
    hasher.update(write_set_digest(writes));
    Ok(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_sensitive_to_every_write() {
        let mut a = WriteSet::new();
        a.put(b"k", b"v");
        let mut b = WriteSet::new();
        b.put(b"k", b"w");
        let mut c = WriteSet::new();
        c.delete(b"k");

        let digests = [write_set_digest(&a), write_set_digest(&b), write_set_digest(&c)];
        assert_ne!(digests[0], digests[1]);
        assert_ne!(digests[0], digests[2]);
        assert_ne!(digests[1], digests[2]);
        assert_ne!(digests[0], write_set_digest(&WriteSet::new()));
    }

    #[test]
    fn test_digest_ignores_insertion_order() {
        let mut a = WriteSet::new();
        a.put(b"x", b"1");
        a.put(b"y", b"2");
        let mut b = WriteSet::new();
        b.put(b"y", b"2");
        b.put(b"x", b"1");
        assert_eq!(write_set_digest(&a), write_set_digest(&b));
    }

    #[test]
    fn test_commit_hash_covers_size() {
        let writes = WriteSet::new();
        let base = AppState::default();
        let bumped = AppState {
            size: 1,
            ..AppState::default()
        };
        assert_ne!(
            commit_hash(&base, &writes).unwrap(),
            commit_hash(&bumped, &writes).unwrap()
        );
    }
}
