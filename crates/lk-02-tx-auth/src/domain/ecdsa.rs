//! # Personal-Message Signatures (secp256k1)
//!
//! Wallet-style `personal_sign` hashing and signer recovery.
//!
//! ## Notes
//!
//! - `v` must be 27 or 28; it is translated to a recovery id on a copy, the
//!   caller's bytes are never touched.
//! - High-S signatures are folded to low-S (with the y-parity flipped) before
//!   recovery, so both forms recover the same key.
//! - The identity is the EIP-55 checksummed address of the recovered key.

use super::envelope::SIGNATURE_LENGTH;
use super::errors::SignatureError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use shared_types::{Hash, Identity};

const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// `keccak256(prefix || decimal(len(message)) || message)`
pub fn hash_personal_message(message: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

/// Recover the signer identity from a 65-byte `r || s || v` signature.
pub fn recover_signer(message_hash: &Hash, signature: &[u8]) -> Result<Identity, SignatureError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(SignatureError::InvalidLength(signature.len()));
    }

    let recovery_id = parse_recovery_id(signature[64])?;
    let sig = Signature::from_slice(&signature[..64]).map_err(|_| SignatureError::InvalidFormat)?;

    let (sig, recovery_id) = match sig.normalize_s() {
        Some(low_s) => (
            low_s,
            RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
        ),
        None => (sig, recovery_id),
    };

    let key = VerifyingKey::recover_from_prehash(message_hash, &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;
    Ok(identity_from_key(&key))
}

/// Sign `message` the way a wallet's `personal_sign` does.
///
/// Returns `0x`-prefixed hex of `r || s || v` with `v` in {27, 28}.
pub fn sign_personal_message(message: &[u8], key: &SigningKey) -> Result<String, SignatureError> {
    let hash = hash_personal_message(message);
    let (sig, recovery_id) = key
        .sign_prehash_recoverable(&hash)
        .map_err(|_| SignatureError::SigningFailed)?;

    let mut bytes = Vec::with_capacity(SIGNATURE_LENGTH);
    bytes.extend_from_slice(&sig.to_bytes());
    bytes.push(recovery_id.to_byte() + 27);
    Ok(format!("0x{}", hex::encode(bytes)))
}

/// Identity of a public key: checksummed address of its Keccak-256 tail.
pub fn identity_from_key(key: &VerifyingKey) -> Identity {
    let encoded = key.to_encoded_point(false);
    // skip the 0x04 SEC1 tag
    let hash = keccak256(&encoded.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Identity::new(checksum_address(&address))
}

/// EIP-55 mixed-case hex encoding of a 20-byte address.
pub fn checksum_address(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(2 + lower.len());
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignatureError> {
    let id = match v {
        27 => 0,
        28 => 1,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };
    RecoveryId::try_from(id).map_err(|_| SignatureError::InvalidRecoveryId(v))
}
