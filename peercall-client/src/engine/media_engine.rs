use crate::engine::EngineEventSender;
use crate::error::{EngineError, ResourceError};
use async_trait::async_trait;
use peercall_core::{IceCandidateDescriptor, SessionDescriptor};
use std::sync::Arc;

/// Control-plane surface of the media engine.
///
/// Unsolicited callbacks (local candidates, remote streams) go through the
/// [`EngineEventSender`] handed to the factory. Remote candidates added
/// before the remote description is set must be buffered by the engine.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescriptor, EngineError>;

    async fn create_answer(&self) -> Result<SessionDescriptor, EngineError>;

    async fn set_local_description(&self, desc: SessionDescriptor) -> Result<(), EngineError>;

    async fn set_remote_description(&self, desc: SessionDescriptor) -> Result<(), EngineError>;

    async fn add_remote_candidate(
        &self,
        candidate: IceCandidateDescriptor,
    ) -> Result<(), EngineError>;

    /// Releases capture devices, tracks and the transport.
    async fn close(&self);
}

/// Builds one engine per negotiation session.
#[async_trait]
pub trait MediaEngineFactory: Send + Sync {
    async fn create(&self, events: EngineEventSender)
    -> Result<Arc<dyn MediaEngine>, ResourceError>;
}
