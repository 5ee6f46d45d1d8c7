use crate::error::EngineError;
use peercall_core::{IceCandidateDescriptor, SessionDescriptor};
use std::fmt;
use tokio::sync::mpsc;

/// Identifies one negotiation session. Notices from an older session are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionSide {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStream {
    pub stream_id: String,
    pub track_id: String,
    pub kind: String,
}

/// Work handed to the media engine, executed in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    CreateOffer,
    CreateAnswer,
    SetLocalDescription(SessionDescriptor),
    SetRemoteDescription(SessionDescriptor),
    AddRemoteCandidate(IceCandidateDescriptor),
}

/// Everything the media engine reports back to the signaling sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    OfferCreated(Result<SessionDescriptor, EngineError>),
    AnswerCreated(Result<SessionDescriptor, EngineError>),
    DescriptionSet {
        side: DescriptionSide,
        result: Result<(), EngineError>,
    },
    CandidateAdded(Result<(), EngineError>),
    LocalCandidate(IceCandidateDescriptor),
    RemoteStreamAdded(RemoteStream),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineNotice {
    pub session: SessionId,
    pub event: EngineEvent,
}

/// Redelivers engine events onto the signaling sequence, tagged with the
/// session that produced them.
#[derive(Debug, Clone)]
pub struct EngineEventSender {
    session: SessionId,
    tx: mpsc::UnboundedSender<EngineNotice>,
}

impl EngineEventSender {
    pub fn new(session: SessionId, tx: mpsc::UnboundedSender<EngineNotice>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Returns false once the signaling sequence has gone away.
    pub fn send(&self, event: EngineEvent) -> bool {
        self.tx
            .send(EngineNotice {
                session: self.session,
                event,
            })
            .is_ok()
    }
}
