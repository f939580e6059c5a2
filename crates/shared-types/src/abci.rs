//! # Engine Boundary Types
//!
//! Request and response shapes for the lifecycle calls the consensus engine
//! makes into the application: `Info`, `InitChain`, `BeginBlock`, `CheckTx`,
//! `DeliverTx`, `EndBlock`, `Commit` and `Query`.

use crate::entities::{BlockHeader, Misbehavior, ValidatorUpdate};
use serde::{Deserialize, Serialize};

/// Result code carried by `CheckTx` / `DeliverTx` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(u32)]
pub enum ResponseCode {
    #[default]
    Ok = 0,
    /// Malformed envelope, bad hex, or undecodable message.
    EncodingError = 1,
    /// Reserved for nonce checks.
    BadNonce = 2,
    /// Signature does not recover to an identity.
    Unauthorized = 3,
    /// Domain-level failure; the log carries the reason.
    UnknownError = 4,
}

impl ResponseCode {
    pub fn value(self) -> u32 {
        self as u32
    }

    pub fn is_ok(self) -> bool {
        self == ResponseCode::Ok
    }
}

/// Key/value attribute of an emitted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAttribute {
    pub key: String,
    pub value: String,
    pub index: bool,
}

/// Observability event attached to a `DeliverTx` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: Vec<EventAttribute>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseInfo {
    pub data: String,
    pub version: String,
    pub app_version: u64,
    pub last_block_height: i64,
    pub last_block_app_hash: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestInitChain {
    pub chain_id: String,
    pub validators: Vec<ValidatorUpdate>,
}

#[derive(Debug, Clone, Default)]
pub struct ResponseInitChain {
    pub validators: Vec<ValidatorUpdate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestBeginBlock {
    /// Hash of the block as computed by the engine.
    pub hash: Vec<u8>,
    pub header: BlockHeader,
    pub byzantine_validators: Vec<Misbehavior>,
}

#[derive(Debug, Clone, Default)]
pub struct ResponseBeginBlock {
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseCheckTx {
    pub code: ResponseCode,
    pub log: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseDeliverTx {
    pub code: ResponseCode,
    pub log: String,
    pub events: Vec<Event>,
}

impl ResponseDeliverTx {
    pub fn failed(code: ResponseCode, log: impl Into<String>) -> Self {
        Self {
            code,
            log: log.into(),
            events: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestEndBlock {
    pub height: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseEndBlock {
    pub validator_updates: Vec<ValidatorUpdate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseCommit {
    /// New application hash.
    pub data: Vec<u8>,
    /// Blocks below this height may be pruned by the engine (0 = keep all).
    pub retain_height: i64,
}

#[derive(Debug, Clone, Default)]
pub struct RequestQuery {
    pub path: String,
    pub data: Vec<u8>,
    pub height: i64,
    pub prove: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseQuery {
    pub code: ResponseCode,
    pub log: String,
    pub index: i64,
    pub key: Vec<u8>,
    pub value: Option<Vec<u8>>,
    pub height: i64,
}
