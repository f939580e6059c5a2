//! # Codec & Auth Layer (LK-02)
//!
//! Turns the hex wire string handed over by the consensus engine into an
//! authenticated, typed transaction.
//!
//! ## Pipeline
//!
//! ```text
//! wire hex ─► envelope ─► (message JSON, signature) ─► personal-message hash
//!                                │                         │
//!                                ▼                         ▼
//!                          Message{type, content}    recover_signer ─► Identity
//!                                │
//!                                ▼
//!                     Payload (one variant per message type)
//! ```
//!
//! The signature always covers the message bytes exactly as they appeared on
//! the wire; nothing is re-serialized before hashing.

pub mod domain;

pub use domain::ecdsa::{
    checksum_address, hash_personal_message, identity_from_key, keccak256, recover_signer,
    sign_personal_message,
};
pub use domain::envelope::{decode_envelope, encode_envelope, SIGNATURE_LENGTH};
pub use domain::errors::{AuthError, CodecError, SignatureError};
pub use domain::message::{
    ClientRating, ClientRegistration, Message, MessageType, MinerRegistration, MinerRewardClaim,
    MinerServiceDone, MinerServiceStarting, MinerStatusUpdate, Payload, ServiceRequest,
};
pub use domain::transaction::{authenticate, AuthenticatedTx, Transaction};
