use crate::engine::RemoteStream;
use crate::negotiation::NegotiationState;

/// What the application gets to see. Protocol and channel problems are only
/// logged; negotiation and resource failures show up here because they need
/// someone to act on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientNotice {
    RelayConnected,
    RelayDisconnected,
    Joined { room: String },
    CallState(NegotiationState),
    CallFailed(String),
    RemoteStream(RemoteStream),
    ResourceFailure(String),
    Left,
}
