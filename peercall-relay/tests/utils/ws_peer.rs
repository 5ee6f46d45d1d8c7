use anyhow::{Context, Result, bail};
use futures::{SinkExt, StreamExt};
use peercall_core::{SignalingMessage, codec};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Timeout for a single expected frame (ms).
pub const FRAME_TIMEOUT_MS: u64 = 2000;

/// Bare WebSocket peer speaking the wire protocol directly.
pub struct WsPeer {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsPeer {
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _) = connect_async(url)
            .await
            .context("Failed to connect to relay")?;
        Ok(Self { stream })
    }

    pub async fn send(&mut self, msg: &SignalingMessage) -> Result<()> {
        let text = codec::encode(msg)?;
        self.send_text(&text).await
    }

    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.stream
            .send(Message::text(text))
            .await
            .context("Failed to send frame")
    }

    pub async fn join(&mut self, room: &str, username: &str) -> Result<()> {
        self.send(&SignalingMessage::Join {
            room: room.into(),
            username: username.into(),
        })
        .await?;

        match self.recv().await? {
            SignalingMessage::Joined { .. } => Ok(()),
            other => bail!("Expected joined, got {:?}", other),
        }
    }

    pub async fn recv(&mut self) -> Result<SignalingMessage> {
        let deadline = Duration::from_millis(FRAME_TIMEOUT_MS);

        loop {
            let frame = tokio::time::timeout(deadline, self.stream.next())
                .await
                .context("Timeout waiting for frame")?;

            match frame {
                Some(Ok(Message::Text(text))) => return Ok(codec::decode(text.as_str())?),
                Some(Ok(Message::Close(_))) | None => bail!("Relay closed the socket"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => bail!("Socket error: {}", e),
            }
        }
    }

    /// True if nothing arrives within `ms`.
    pub async fn is_quiet(&mut self, ms: u64) -> bool {
        tokio::time::timeout(Duration::from_millis(ms), self.stream.next())
            .await
            .is_err()
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await.context("Failed to close")
    }
}
