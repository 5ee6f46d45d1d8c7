use crate::error::ChannelError;
use crate::relay::RelayEvent;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Ordered, reliable, message-oriented duplex connection to the relay.
///
/// Sends are fire-and-forget; nothing correlates a send with a reply.
#[async_trait]
pub trait RelayChannel: Send + Sync {
    async fn send(&self, text: String) -> Result<(), ChannelError>;

    async fn disconnect(&self);
}

/// Opens relay channels. The returned receiver yields `Connected` first and
/// `Disconnected` last.
#[async_trait]
pub trait RelayConnector: Send + Sync {
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(Arc<dyn RelayChannel>, mpsc::Receiver<RelayEvent>), ChannelError>;
}
