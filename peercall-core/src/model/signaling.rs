use crate::model::session::{IceCandidateDescriptor, SdpKind, SessionDescriptor};
use crate::utils::{DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

impl Default for IceServerConfig {
    fn default() -> Self {
        Self {
            urls: vec![DEFAULT_STUN_ADDR.to_owned(), DEFAULT_STUN_ADDR_2.to_owned()],
            username: None,
            credential: None,
        }
    }
}

/// Signaling envelope exchanged with the relay, one JSON object per text frame.
///
/// The `type` tag selects the variant; the rest of the object is the
/// variant's payload. Unknown fields are ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalingMessage {
    Join {
        room: String,
        username: String,
    },
    Joined {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room: Option<String>,
    },
    Leave {
        #[serde(default)]
        room: String,
        #[serde(default)]
        username: String,
    },
    Offer {
        sdp: SessionDescriptor,
    },
    Answer {
        sdp: SessionDescriptor,
    },
    IceCandidate {
        ice: IceCandidateDescriptor,
    },
}

impl SignalingMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            SignalingMessage::Join { .. } => MessageType::Join,
            SignalingMessage::Joined { .. } => MessageType::Joined,
            SignalingMessage::Leave { .. } => MessageType::Leave,
            SignalingMessage::Offer { .. } => MessageType::Offer,
            SignalingMessage::Answer { .. } => MessageType::Answer,
            SignalingMessage::IceCandidate { .. } => MessageType::IceCandidate,
        }
    }

    /// Wraps a descriptor in the envelope matching its kind.
    pub fn description(sdp: SessionDescriptor) -> Self {
        match sdp.kind {
            SdpKind::Offer => SignalingMessage::Offer { sdp },
            SdpKind::Answer => SignalingMessage::Answer { sdp },
        }
    }
}

/// Wire values of the `type` tag this build understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Join,
    Joined,
    Leave,
    Offer,
    Answer,
    IceCandidate,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Join => "join",
            MessageType::Joined => "joined",
            MessageType::Leave => "leave",
            MessageType::Offer => "offer",
            MessageType::Answer => "answer",
            MessageType::IceCandidate => "ice_candidate",
        }
    }
}

impl FromStr for MessageType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "join" => Ok(MessageType::Join),
            "joined" => Ok(MessageType::Joined),
            "leave" => Ok(MessageType::Leave),
            "offer" => Ok(MessageType::Offer),
            "answer" => Ok(MessageType::Answer),
            "ice_candidate" => Ok(MessageType::IceCandidate),
            _ => Err(()),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
