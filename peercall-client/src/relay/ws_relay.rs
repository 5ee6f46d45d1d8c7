use crate::error::ChannelError;
use crate::relay::{RelayChannel, RelayConnector, RelayEvent};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

const EVENT_BUFFER: usize = 256;

/// Relay connector over a WebSocket text stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsRelayConnector;

impl WsRelayConnector {
    pub fn new() -> Self {
        Self
    }
}

struct WsRelayChannel {
    out_tx: mpsc::UnboundedSender<Message>,
}

#[async_trait]
impl RelayChannel for WsRelayChannel {
    async fn send(&self, text: String) -> Result<(), ChannelError> {
        self.out_tx
            .send(Message::text(text))
            .map_err(|_| ChannelError::Closed)
    }

    async fn disconnect(&self) {
        let _ = self.out_tx.send(Message::Close(None));
    }
}

#[async_trait]
impl RelayConnector for WsRelayConnector {
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(Arc<dyn RelayChannel>, mpsc::Receiver<RelayEvent>), ChannelError> {
        info!("Connecting to relay {}", url);

        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| ChannelError::Connect(e.to_string()))?;

        let (mut sink, mut source) = stream.split();
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();

        let _ = event_tx.send(RelayEvent::Connected).await;

        let mut send_task = tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let closing = matches!(msg, Message::Close(_));
                if let Err(e) = sink.send(msg).await {
                    warn!("Relay send failed: {}", e);
                    break;
                }
                if closing {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let mut recv_task = tokio::spawn({
            let event_tx = event_tx.clone();

            async move {
                while let Some(frame) = source.next().await {
                    match frame {
                        Ok(Message::Text(text)) => {
                            if event_tx
                                .send(RelayEvent::Message(text.as_str().to_owned()))
                                .await
                                .is_err()
                            {
                                break;
                            }
                        }
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(e) => {
                            let _ = event_tx.send(RelayEvent::Error(e.to_string())).await;
                            break;
                        }
                    }
                }
            }
        });

        tokio::spawn(async move {
            tokio::select! {
                _ = (&mut send_task) => recv_task.abort(),
                _ = (&mut recv_task) => send_task.abort(),
            };

            debug!("Relay socket closed");
            let _ = event_tx.send(RelayEvent::Disconnected).await;
        });

        Ok((Arc::new(WsRelayChannel { out_tx }), event_rx))
    }
}
