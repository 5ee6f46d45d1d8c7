//! Text codec for [`SignalingMessage`].
//!
//! Decoding is tolerant: unknown fields are ignored and an unknown `type`
//! is reported as a recoverable [`CodecError`] so the caller can log and drop
//! the frame without tearing the connection down.

use crate::model::{MessageType, SdpKind, SignalingMessage};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("message has no `type` field")]
    MissingType,

    #[error("unrecognized message type `{0}`")]
    UnknownType(String),

    #[error("message is not a JSON object")]
    NotAnObject,

    #[error("`{tag}` message carries a `{found}` description")]
    KindMismatch { tag: MessageType, found: SdpKind },

    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub fn encode(msg: &SignalingMessage) -> Result<String, CodecError> {
    Ok(serde_json::to_string(msg)?)
}

pub fn decode(text: &str) -> Result<SignalingMessage, CodecError> {
    let value: Value = serde_json::from_str(text)?;
    let object = value.as_object().ok_or(CodecError::NotAnObject)?;

    let tag = match object.get("type") {
        None | Some(Value::Null) => return Err(CodecError::MissingType),
        Some(Value::String(tag)) => tag
            .parse::<MessageType>()
            .map_err(|_| CodecError::UnknownType(tag.clone()))?,
        Some(other) => return Err(CodecError::UnknownType(other.to_string())),
    };

    let msg: SignalingMessage = serde_json::from_value(value)?;
    validate(tag, &msg)?;
    Ok(msg)
}

fn validate(tag: MessageType, msg: &SignalingMessage) -> Result<(), CodecError> {
    let (expected, found) = match msg {
        SignalingMessage::Offer { sdp } => (SdpKind::Offer, sdp.kind),
        SignalingMessage::Answer { sdp } => (SdpKind::Answer, sdp.kind),
        _ => return Ok(()),
    };
    if expected != found {
        return Err(CodecError::KindMismatch { tag, found });
    }
    Ok(())
}
