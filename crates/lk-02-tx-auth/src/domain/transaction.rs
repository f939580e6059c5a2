//! # Transactions
//!
//! A transaction is a `Message` plus the signature over its exact wire bytes.

use super::ecdsa::{hash_personal_message, recover_signer, sign_personal_message};
use super::envelope::{decode_envelope, encode_envelope};
use super::errors::{AuthError, CodecError, SignatureError};
use super::message::Message;
use k256::ecdsa::SigningKey;
use shared_types::Identity;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub msg: Message,
    /// Lowercase hex of `r || s || v`, no prefix.
    pub signature: String,
    /// Message bytes as signed.
    raw: Vec<u8>,
}

impl Transaction {
    pub fn from_wire(wire: &str) -> Result<Self, CodecError> {
        let (raw, signature) = decode_envelope(wire)?;
        let msg: Message = serde_json::from_slice(&raw)
            .map_err(|e| CodecError::DecodingError(format!("message: {e}")))?;
        Ok(Self {
            msg,
            signature,
            raw,
        })
    }

    pub fn to_wire(&self) -> Result<String, CodecError> {
        encode_envelope(&self.raw, &self.signature)
    }

    /// Serialize and sign `msg` with `key`.
    pub fn signed(msg: Message, key: &SigningKey) -> Result<Self, AuthError> {
        let raw = serde_json::to_vec(&msg).map_err(|e| CodecError::EncodingError(e.to_string()))?;
        let signature = sign_personal_message(&raw, key)?;
        Ok(Self {
            msg,
            signature: signature.trim_start_matches("0x").to_string(),
            raw,
        })
    }

    pub fn message_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn recover_sender(&self) -> Result<Identity, SignatureError> {
        let signature = hex::decode(self.signature.trim_start_matches("0x"))
            .map_err(|_| SignatureError::InvalidFormat)?;
        recover_signer(&hash_personal_message(&self.raw), &signature)
    }
}

/// A transaction whose signer has been recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedTx {
    pub sender: Identity,
    pub message: Message,
}

/// Decode the envelope and recover the sender. No state is consulted.
pub fn authenticate(wire: &str) -> Result<AuthenticatedTx, AuthError> {
    let tx = Transaction::from_wire(wire)?;
    let sender = tx.recover_sender()?;
    debug!(sender = %sender, message_type = tx.msg.kind, "Authenticated transaction");
    Ok(AuthenticatedTx {
        sender,
        message: tx.msg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ecdsa::test_helpers::{generate_key, identity_of};
    use crate::domain::envelope::encode_envelope;
    use crate::domain::message::{ClientRegistration, Payload};
    use shared_types::ResponseCode;

    fn registration() -> Message {
        Payload::ClientRegistration(ClientRegistration {
            client_name: "alice".into(),
        })
        .into_message()
        .unwrap()
    }

    #[test]
    fn test_signed_transaction_authenticates() {
        let key = generate_key();
        let tx = Transaction::signed(registration(), &key).unwrap();
        let wire = tx.to_wire().unwrap();

        let authed = authenticate(&wire).unwrap();
        assert_eq!(authed.sender, identity_of(&key));
        assert_eq!(authed.message, registration());
    }

    #[test]
    fn test_wire_round_trip_preserves_signed_bytes() {
        let key = generate_key();
        let tx = Transaction::signed(registration(), &key).unwrap();
        let decoded = Transaction::from_wire(&tx.to_wire().unwrap()).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn test_signature_covers_raw_bytes() {
        // same message, different but equivalent JSON layout
        let key = generate_key();
        let tx = Transaction::signed(registration(), &key).unwrap();
        let reordered = br#"{"content":"eyJjbGllbnRfbmFtZSI6ImFsaWNlIn0=","type":1}"#;
        let wire = encode_envelope(reordered, &tx.signature).unwrap();

        let authed = authenticate(&wire).unwrap();
        assert_eq!(authed.message, registration());
        assert_ne!(authed.sender, identity_of(&key));
    }

    #[test]
    fn test_bad_v_is_unauthorized() {
        let key = generate_key();
        let tx = Transaction::signed(registration(), &key).unwrap();
        let mut signature = hex::decode(&tx.signature).unwrap();
        signature[64] = 3;
        let wire = encode_envelope(tx.message_bytes(), &hex::encode(signature)).unwrap();

        let err = authenticate(&wire).unwrap_err();
        assert_eq!(err.response_code(), ResponseCode::Unauthorized);
    }

    #[test]
    fn test_non_json_message_is_encoding_error() {
        let key = generate_key();
        let tx = Transaction::signed(registration(), &key).unwrap();
        let wire = encode_envelope(b"not json", &tx.signature).unwrap();

        let err = authenticate(&wire).unwrap_err();
        assert_eq!(err.response_code(), ResponseCode::EncodingError);
    }

    #[test]
    fn test_garbage_wire_is_encoding_error() {
        let err = authenticate("zz").unwrap_err();
        assert_eq!(err.response_code(), ResponseCode::EncodingError);
    }
}
