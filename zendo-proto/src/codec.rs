//! JSON encode/decode for the Zendo wire types.
//!
//! Thin wrappers around `serde_json` that collapse its error type into
//! [`CodecError`], so callers can tell a malformed body apart from a
//! transport failure without depending on `serde_json` themselves.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::chat::{ChatReply, ChatRequest};
use crate::task::{StatusPatch, Task};

/// Error type for codec encode/decode operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The value could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// The bytes are not JSON of the expected shape.
    #[error("malformed body: {0}")]
    Malformed(String),
}

/// Serializes any wire value to JSON bytes.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the value cannot be serialized.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(value).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Deserializes any wire value from JSON bytes.
///
/// # Errors
///
/// Returns `CodecError::Malformed` if the bytes do not decode to `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::Malformed(e.to_string()))
}

/// Decodes the body of `GET /api/{user}/tasks`.
///
/// # Errors
///
/// Returns `CodecError::Malformed` if the body is not a JSON task array.
pub fn decode_task_list(bytes: &[u8]) -> Result<Vec<Task>, CodecError> {
    decode(bytes)
}

/// Decodes the body of `POST /api/{user}/chat`.
///
/// # Errors
///
/// Returns `CodecError::Malformed` if the body is not a chat reply object.
pub fn decode_chat_reply(bytes: &[u8]) -> Result<ChatReply, CodecError> {
    decode(bytes)
}

/// Encodes a chat request body.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if encoding fails.
pub fn encode_chat_request(request: &ChatRequest) -> Result<Vec<u8>, CodecError> {
    encode(request)
}

/// Encodes a status patch body.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if encoding fails.
pub fn encode_status_patch(patch: &StatusPatch) -> Result<Vec<u8>, CodecError> {
    encode(patch)
}
