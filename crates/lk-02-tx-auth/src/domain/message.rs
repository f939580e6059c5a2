//! # Messages and Payloads
//!
//! A `Message` is `{"type": n, "content": "<base64>"}`. The type tag selects
//! exactly one payload shape; decoding goes straight into that shape.

use super::errors::CodecError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::{serde_as, DefaultOnNull};
use shared_types::Identity;
use std::fmt;

/// Message type tags as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    ClientRegistration = 1,
    ServiceRequest = 2,
    ClientRating = 3,
    MinerRegistration = 4,
    MinerServiceDone = 5,
    MinerStatusUpdate = 6,
    MinerRewardClaim = 7,
    MinerServiceStarting = 8,
}

impl MessageType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            MessageType::ClientRegistration => "ClientRegistration",
            MessageType::ServiceRequest => "ServiceRequest",
            MessageType::ClientRating => "ClientRating",
            MessageType::MinerRegistration => "MinerRegistration",
            MessageType::MinerServiceDone => "MinerServiceDone",
            MessageType::MinerStatusUpdate => "MinerStatusUpdate",
            MessageType::MinerRewardClaim => "MinerRewardClaim",
            MessageType::MinerServiceStarting => "MinerServiceStarting",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for MessageType {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => MessageType::ClientRegistration,
            2 => MessageType::ServiceRequest,
            3 => MessageType::ClientRating,
            4 => MessageType::MinerRegistration,
            5 => MessageType::MinerServiceDone,
            6 => MessageType::MinerStatusUpdate,
            7 => MessageType::MinerRewardClaim,
            8 => MessageType::MinerServiceStarting,
            other => return Err(CodecError::UnknownMessageType(other)),
        })
    }
}

/// Signed unit of a transaction.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde_as(as = "Base64")]
    pub content: Vec<u8>,
}

impl Message {
    pub fn new(kind: MessageType, content: Vec<u8>) -> Self {
        Self {
            kind: kind.as_u8(),
            content,
        }
    }

    pub fn message_type(&self) -> Result<MessageType, CodecError> {
        MessageType::try_from(self.kind)
    }

    /// Decode `content` into the payload shape selected by `kind`.
    pub fn decode_payload(&self) -> Result<Payload, CodecError> {
        let content = &self.content;
        Ok(match self.message_type()? {
            MessageType::ClientRegistration => Payload::ClientRegistration(parse(self.kind, content)?),
            MessageType::ServiceRequest => Payload::ServiceRequest(parse(self.kind, content)?),
            MessageType::ClientRating => Payload::ClientRating(parse(self.kind, content)?),
            MessageType::MinerRegistration => Payload::MinerRegistration(parse(self.kind, content)?),
            MessageType::MinerServiceDone => Payload::MinerServiceDone(parse(self.kind, content)?),
            MessageType::MinerStatusUpdate => Payload::MinerStatusUpdate(parse(self.kind, content)?),
            MessageType::MinerRewardClaim => Payload::MinerRewardClaim(parse(self.kind, content)?),
            MessageType::MinerServiceStarting => {
                Payload::MinerServiceStarting(parse(self.kind, content)?)
            }
        })
    }
}

fn parse<T: DeserializeOwned>(message_type: u8, content: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(content).map_err(|e| CodecError::InvalidPayload {
        message_type,
        reason: e.to_string(),
    })
}

// =============================================================================
// PAYLOADS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRegistration {
    pub client_name: String,
}

/// Request for work of one service type. `meta` is opaque to the chain.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    #[serde(rename = "service_id")]
    pub service_type: u64,
    #[serde_as(as = "DefaultOnNull<Base64>")]
    #[serde(default)]
    pub meta: Vec<u8>,
}

/// Rating of a miner by a client. Out-of-range values are clamped on apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRating {
    pub miner_addr: Identity,
    pub rating: i64,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerRegistration {
    pub miner_name: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub service_types: Vec<u64>,
    pub ip: String,
    pub status: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerServiceDone {
    pub service_id: String,
    pub service_type: u64,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerStatusUpdate {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub add_service_types: Vec<u64>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub remove_service_types: Vec<u64>,
    pub status: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerRewardClaim {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerServiceStarting {
    pub service_id: String,
    pub max_timeout_block: i64,
}

/// Decoded content of a message, one variant per message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    ClientRegistration(ClientRegistration),
    ServiceRequest(ServiceRequest),
    ClientRating(ClientRating),
    MinerRegistration(MinerRegistration),
    MinerServiceDone(MinerServiceDone),
    MinerStatusUpdate(MinerStatusUpdate),
    MinerRewardClaim(MinerRewardClaim),
    MinerServiceStarting(MinerServiceStarting),
}

impl Payload {
    pub fn message_type(&self) -> MessageType {
        match self {
            Payload::ClientRegistration(_) => MessageType::ClientRegistration,
            Payload::ServiceRequest(_) => MessageType::ServiceRequest,
            Payload::ClientRating(_) => MessageType::ClientRating,
            Payload::MinerRegistration(_) => MessageType::MinerRegistration,
            Payload::MinerServiceDone(_) => MessageType::MinerServiceDone,
            Payload::MinerStatusUpdate(_) => MessageType::MinerStatusUpdate,
            Payload::MinerRewardClaim(_) => MessageType::MinerRewardClaim,
            Payload::MinerServiceStarting(_) => MessageType::MinerServiceStarting,
        }
    }

    /// Serialize into a `Message` ready for signing.
    pub fn into_message(self) -> Result<Message, CodecError> {
        let kind = self.message_type();
        let content = match &self {
            Payload::ClientRegistration(p) => serde_json::to_vec(p),
            Payload::ServiceRequest(p) => serde_json::to_vec(p),
            Payload::ClientRating(p) => serde_json::to_vec(p),
            Payload::MinerRegistration(p) => serde_json::to_vec(p),
            Payload::MinerServiceDone(p) => serde_json::to_vec(p),
            Payload::MinerStatusUpdate(p) => serde_json::to_vec(p),
            Payload::MinerRewardClaim(p) => serde_json::to_vec(p),
            Payload::MinerServiceStarting(p) => serde_json::to_vec(p),
        }
        .map_err(|e| CodecError::EncodingError(e.to_string()))?;
        Ok(Message::new(kind, content))
    }
}
