use async_trait::async_trait;
use peercall_client::{ChannelError, RelayChannel, RelayConnector, RelayEvent};
use peercall_core::{SignalingMessage, codec};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Mutex, mpsc};

#[derive(Default)]
struct MockRelayState {
    connects: AtomicUsize,
    failing_connects: AtomicUsize,
    disconnects: AtomicUsize,
    sends_closed: AtomicBool,
    urls: Mutex<Vec<String>>,
    events: Mutex<Option<mpsc::Sender<RelayEvent>>>,
    sent: Mutex<Vec<SignalingMessage>>,
}

/// Mock relay connector. Captures everything the client sends and lets the
/// test push inbound events into the current connection.
#[derive(Clone)]
pub struct MockRelay {
    state: Arc<MockRelayState>,
    sent_tx: mpsc::UnboundedSender<SignalingMessage>,
}

impl MockRelay {
    /// Create a MockRelay and the receiver of decoded outbound messages.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SignalingMessage>) {
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        let relay = Self {
            state: Arc::new(MockRelayState::default()),
            sent_tx,
        };
        (relay, sent_rx)
    }

    /// Number of connection attempts, failed ones included.
    pub fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.state.disconnects.load(Ordering::SeqCst)
    }

    /// Make the next `n` connection attempts fail.
    pub fn fail_next_connects(&self, n: usize) {
        self.state.failing_connects.store(n, Ordering::SeqCst);
    }

    /// Make every send on the current connection fail as closed, without
    /// any disconnect event. The next connection sends normally again.
    pub fn close_sends(&self) {
        self.state.sends_closed.store(true, Ordering::SeqCst);
    }

    pub async fn urls(&self) -> Vec<String> {
        self.state.urls.lock().await.clone()
    }

    pub async fn sent(&self) -> Vec<SignalingMessage> {
        self.state.sent.lock().await.clone()
    }

    /// Deliver a message as if the relay had forwarded it.
    pub async fn inject(&self, msg: SignalingMessage) {
        let text = codec::encode(&msg).expect("encodable message");
        self.inject_text(&text).await;
    }

    pub async fn inject_text(&self, text: &str) {
        self.push(RelayEvent::Message(text.to_owned())).await;
    }

    /// Simulate the relay going away without the client asking for it.
    pub async fn drop_connection(&self) {
        self.push(RelayEvent::Disconnected).await;
        self.state.events.lock().await.take();
    }

    async fn push(&self, event: RelayEvent) {
        let events = self.state.events.lock().await;
        let tx = events.as_ref().expect("no open relay connection");
        tx.send(event).await.expect("client dropped the relay");
    }
}

#[async_trait]
impl RelayConnector for MockRelay {
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(Arc<dyn RelayChannel>, mpsc::Receiver<RelayEvent>), ChannelError> {
        tracing::debug!("[MockRelay] connect to {}", url);
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        self.state.urls.lock().await.push(url.to_owned());

        let failing = self.state.failing_connects.load(Ordering::SeqCst);
        if failing > 0 {
            self.state.failing_connects.store(failing - 1, Ordering::SeqCst);
            return Err(ChannelError::Connect("connection refused".into()));
        }

        self.state.sends_closed.store(false, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(64);
        tx.send(RelayEvent::Connected)
            .await
            .map_err(|_| ChannelError::Closed)?;
        *self.state.events.lock().await = Some(tx);

        let channel = MockRelayChannel {
            state: self.state.clone(),
            sent_tx: self.sent_tx.clone(),
        };
        Ok((Arc::new(channel), rx))
    }
}

struct MockRelayChannel {
    state: Arc<MockRelayState>,
    sent_tx: mpsc::UnboundedSender<SignalingMessage>,
}

#[async_trait]
impl RelayChannel for MockRelayChannel {
    async fn send(&self, text: String) -> Result<(), ChannelError> {
        if self.state.sends_closed.load(Ordering::SeqCst) {
            return Err(ChannelError::Closed);
        }
        let msg = codec::decode(&text).map_err(|e| ChannelError::Send(e.to_string()))?;
        tracing::debug!("[MockRelay] client sent {}", msg.message_type());

        self.state.sent.lock().await.push(msg.clone());
        let _ = self.sent_tx.send(msg);
        Ok(())
    }

    async fn disconnect(&self) {
        self.state.disconnects.fetch_add(1, Ordering::SeqCst);
        self.state.events.lock().await.take();
    }
}
