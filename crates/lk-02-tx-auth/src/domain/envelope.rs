//! # Wire Envelope
//!
//! `hex( [u32 BE length][message bytes][65 signature bytes] )`

use super::errors::CodecError;

/// Length of an `r || s || v` signature.
pub const SIGNATURE_LENGTH: usize = 65;

const LENGTH_PREFIX: usize = 4;

/// Frame a message and its signature for the wire.
///
/// `signature_hex` may carry a `0x` prefix.
pub fn encode_envelope(message: &[u8], signature_hex: &str) -> Result<String, CodecError> {
    let signature = decode_hex(signature_hex)
        .map_err(|e| CodecError::DecodingError(format!("signature: {e}")))?;
    let length = u32::try_from(message.len())
        .map_err(|_| CodecError::EncodingError(format!("message too large: {}", message.len())))?;

    let mut buffer = Vec::with_capacity(LENGTH_PREFIX + message.len() + signature.len());
    buffer.extend_from_slice(&length.to_be_bytes());
    buffer.extend_from_slice(message);
    buffer.extend_from_slice(&signature);
    Ok(hex::encode(buffer))
}

/// Split a wire string into the message bytes and the lowercase signature hex.
pub fn decode_envelope(wire: &str) -> Result<(Vec<u8>, String), CodecError> {
    let data = decode_hex(wire).map_err(|e| CodecError::DecodingError(format!("envelope: {e}")))?;
    if data.len() < LENGTH_PREFIX {
        return Err(CodecError::DecodingError(format!(
            "envelope shorter than length prefix: {} bytes",
            data.len()
        )));
    }

    let (prefix, rest) = data.split_at(LENGTH_PREFIX);
    let mut length_bytes = [0u8; LENGTH_PREFIX];
    length_bytes.copy_from_slice(prefix);
    let length = u32::from_be_bytes(length_bytes) as usize;
    if length > rest.len() {
        return Err(CodecError::DecodingError(format!(
            "length prefix {length} exceeds remaining {} bytes",
            rest.len()
        )));
    }

    let (message, signature) = rest.split_at(length);
    if signature.len() != SIGNATURE_LENGTH {
        return Err(CodecError::DecodingError(format!(
            "expected {SIGNATURE_LENGTH} signature bytes, found {}",
            signature.len()
        )));
    }
    Ok((message.to_vec(), hex::encode(signature)))
}

fn decode_hex(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(value.strip_prefix("0x").unwrap_or(value))
}
