//! # Codec and Signature Errors

use shared_types::ResponseCode;
use thiserror::Error;

/// Failures while decoding the wire envelope or the message inside it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Malformed hex, truncated length-prefixed field, or bad signature bytes.
    #[error("decoding error: {0}")]
    DecodingError(String),

    /// Message could not be serialized for the wire.
    #[error("encoding error: {0}")]
    EncodingError(String),

    /// Message type outside 1..=8.
    #[error("unknown message type: {0}")]
    UnknownMessageType(u8),

    /// Content did not match the shape selected by the message type.
    #[error("invalid payload for message type {message_type}: {reason}")]
    InvalidPayload { message_type: u8, reason: String },
}

/// Failures while recovering a signer from a signature.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid signature length: {0}")]
    InvalidLength(usize),

    /// `v` must be 27 or 28.
    #[error("invalid signature 'v' value: {0}")]
    InvalidRecoveryId(u8),

    #[error("invalid signature format")]
    InvalidFormat,

    #[error("failed to recover public key")]
    RecoveryFailed,

    #[error("signing failed")]
    SigningFailed,
}

/// Rejection at the authentication boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Signature(#[from] SignatureError),
}

impl AuthError {
    /// Response code reported to the consensus engine.
    pub fn response_code(&self) -> ResponseCode {
        match self {
            AuthError::Codec(_) => ResponseCode::EncodingError,
            AuthError::Signature(_) => ResponseCode::Unauthorized,
        }
    }
}
