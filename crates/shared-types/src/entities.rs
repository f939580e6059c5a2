//! # Core Domain Entities
//!
//! Types shared by every layer of the state machine.
//!
//! ## Clusters
//!
//! - **Identity**: `Identity`, `Hash`
//! - **Blocks**: `BlockHeader`
//! - **Validators**: `ValidatorPubKey`, `ValidatorUpdate`, `Validator`, `Misbehavior`

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte hash (SHA-256 or Keccak-256).
pub type Hash = [u8; 32];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

// =============================================================================
// IDENTITY
// =============================================================================

/// Textual account identity derived from a recovered public key.
///
/// This is the `0x`-prefixed, EIP-55 checksummed address string. It is the
/// only notion of "account" in the marketplace: whoever can produce a
/// signature that recovers to it is its owner.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// =============================================================================
// BLOCKS
// =============================================================================

/// Block metadata delivered by the consensus engine at `BeginBlock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockHeader {
    /// Chain identifier.
    pub chain_id: String,
    /// Height of the block being executed.
    pub height: i64,
    /// Address of the proposing validator.
    pub proposer_address: Vec<u8>,
}

// =============================================================================
// VALIDATORS
// =============================================================================

/// Ed25519 consensus key of a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValidatorPubKey(pub PublicKey);

impl ValidatorPubKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consensus address: first 20 bytes of SHA-256 over the key.
    pub fn address(&self) -> Vec<u8> {
        let digest = Sha256::digest(self.0);
        digest[..20].to_vec()
    }
}

/// A change to the validator set. `power == 0` removes the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorUpdate {
    pub pub_key: ValidatorPubKey,
    pub power: i64,
}

impl ValidatorUpdate {
    pub fn new(pub_key: ValidatorPubKey, power: i64) -> Self {
        Self { pub_key, power }
    }
}

/// Validator as referenced by consensus evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Validator {
    pub address: Vec<u8>,
    pub power: i64,
}

/// Kind of byzantine behaviour reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MisbehaviorType {
    #[default]
    Unknown,
    DuplicateVote,
    LightClientAttack,
}

/// One piece of byzantine-fault evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Misbehavior {
    #[serde(rename = "type")]
    pub kind: MisbehaviorType,
    pub validator: Validator,
    pub height: i64,
    pub total_voting_power: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_address_is_truncated_sha256() {
        let key = ValidatorPubKey([7u8; 32]);
        let address = key.address();
        assert_eq!(address.len(), 20);
        assert_eq!(address, Sha256::digest([7u8; 32])[..20].to_vec());
    }

    #[test]
    fn test_identity_serializes_as_plain_string() {
        let id = Identity::new("0xAbC");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"0xAbC\"");
    }
}
