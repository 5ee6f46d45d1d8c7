use crate::negotiation::NegotiationState;
use peercall_core::CodecError;
use thiserror::Error;

/// Failure reported by a media engine operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Device or engine setup failure. Fatal to starting a session, never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("media resource unavailable: {0}")]
pub struct ResourceError(pub String);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("failed to connect to relay: {0}")]
    Connect(String),

    #[error("failed to send to relay: {0}")]
    Send(String),

    #[error("relay channel is closed")]
    Closed,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NegotiationError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: NegotiationState,
        action: &'static str,
    },

    #[error("{step} failed: {source}")]
    Engine {
        step: &'static str,
        source: EngineError,
    },

    #[error("a call is already in progress")]
    Busy,

    #[error("not joined to a room")]
    NotJoined,
}

#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("protocol violation: {0}")]
    Protocol(#[from] CodecError),

    #[error("negotiation failed: {0}")]
    Negotiation(#[from] NegotiationError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("signaling client is no longer running")]
    ClientGone,
}
