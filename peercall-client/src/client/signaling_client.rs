use crate::client::{ClientCommand, ClientHandle, ClientNotice};
use crate::config::ClientConfig;
use crate::engine::{EngineEventSender, EngineNotice, EngineWorker, MediaEngineFactory, SessionId};
use crate::error::{ChannelError, NegotiationError};
use crate::negotiation::{Effect, NegotiationSession, NegotiationState, Role};
use crate::reconnect::{ReconnectDecision, ReconnectSupervisor};
use crate::relay::{RelayChannel, RelayConnector, RelayEvent};
use crate::room::RoomSession;
use peercall_core::{SignalingMessage, codec};
use std::future::pending;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info, warn};

const COMMAND_BUFFER: usize = 100;

struct ActiveCall {
    session: NegotiationSession,
    worker: EngineWorker,
}

/// The signaling context: owns the relay connection, room membership, the
/// current negotiation and its engine, and the reconnect policy.
///
/// Everything runs on the single task driving [`run`](SignalingClient::run),
/// so relay messages, engine completions and application commands are applied
/// one at a time in arrival order.
pub struct SignalingClient {
    config: ClientConfig,
    connector: Arc<dyn RelayConnector>,
    engines: Arc<dyn MediaEngineFactory>,
    command_rx: mpsc::Receiver<ClientCommand>,
    relay: Option<Arc<dyn RelayChannel>>,
    relay_rx: Option<mpsc::Receiver<RelayEvent>>,
    engine_tx: mpsc::UnboundedSender<EngineNotice>,
    engine_rx: mpsc::UnboundedReceiver<EngineNotice>,
    room: RoomSession,
    call: Option<ActiveCall>,
    supervisor: ReconnectSupervisor,
    notices: mpsc::UnboundedSender<ClientNotice>,
    next_session: u64,
    /// Set when a send found the relay channel closed.
    relay_closed: bool,
}

impl SignalingClient {
    pub fn new(
        config: ClientConfig,
        connector: Arc<dyn RelayConnector>,
        engines: Arc<dyn MediaEngineFactory>,
    ) -> (Self, ClientHandle, mpsc::UnboundedReceiver<ClientNotice>) {
        let (cmd_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (engine_tx, engine_rx) = mpsc::unbounded_channel();
        let (notices, notice_rx) = mpsc::unbounded_channel();
        let supervisor = ReconnectSupervisor::new(config.reconnect_interval);

        let client = Self {
            config,
            connector,
            engines,
            command_rx,
            relay: None,
            relay_rx: None,
            engine_tx,
            engine_rx,
            room: RoomSession::new(),
            call: None,
            supervisor,
            notices,
            next_session: 0,
            relay_closed: false,
        };

        (client, ClientHandle::new(cmd_tx), notice_rx)
    }

    pub async fn run(mut self) {
        info!("Signaling client started");
        self.connect().await;

        loop {
            let retry_at = self.supervisor.retry_at();

            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(ClientCommand::Shutdown) | None => {
                            self.shutdown().await;
                            break;
                        }
                        Some(c) => self.handle_command(c).await,
                    }
                }

                evt = next_relay_event(&mut self.relay_rx) => {
                    self.handle_relay_event(evt).await;
                }

                Some(notice) = self.engine_rx.recv() => {
                    self.handle_engine_notice(notice).await;
                }

                _ = sleep_until_deadline(retry_at) => {
                    if self.supervisor.take_due(Instant::now()) {
                        self.connect().await;
                    }
                }
            }

            if std::mem::take(&mut self.relay_closed) {
                self.on_relay_lost().await;
            }
        }

        info!("Signaling client stopped");
    }

    async fn handle_command(&mut self, cmd: ClientCommand) {
        match cmd {
            ClientCommand::Join { room, username } => {
                if self.room.room().is_some_and(|current| current != room) {
                    info!("Switching to room '{}', closing current call", room);
                    self.close_call().await;
                }
                if let Some(msg) = self.room.join(&room, &username) {
                    self.send(msg).await;
                } else if self.relay.is_none() && self.supervisor.retry_at().is_none() {
                    self.connect().await;
                }
            }

            ClientCommand::StartCall => {
                if let Err(e) = self.start_call().await {
                    warn!("Cannot start call: {}", e);
                    self.notify(ClientNotice::CallFailed(e.to_string()));
                }
            }

            ClientCommand::HangUp => {
                info!("Hanging up");
                self.close_call().await;
            }

            ClientCommand::Leave => self.leave().await,

            ClientCommand::Shutdown => self.shutdown().await,
        }
    }

    async fn handle_relay_event(&mut self, event: Option<RelayEvent>) {
        match event {
            Some(RelayEvent::Connected) => {
                info!("Connected to relay");
                self.supervisor.on_connected();
                self.notify(ClientNotice::RelayConnected);

                if let Some(join) = self.room.on_connected() {
                    self.send(join).await;
                }
            }

            Some(RelayEvent::Message(text)) => match codec::decode(&text) {
                Ok(msg) => self.handle_message(msg).await,
                Err(e) => warn!("Dropping relay message: {}", e),
            },

            Some(RelayEvent::Error(reason)) => warn!("Relay error: {}", reason),

            Some(RelayEvent::Disconnected) | None => self.on_relay_lost().await,
        }
    }

    async fn handle_message(&mut self, msg: SignalingMessage) {
        debug!("Received {}", msg.message_type());

        match msg {
            SignalingMessage::Joined { room } => {
                if !self.room.on_joined(room.as_deref()) {
                    return;
                }
                if !self.has_live_call() {
                    self.open_session(Role::Callee).await;
                }
                if let Some(room) = self.room.room() {
                    let room = room.to_owned();
                    self.notify(ClientNotice::Joined { room });
                }
            }

            SignalingMessage::Join { .. } => {
                debug!("Ignoring join echoed by relay");
            }

            msg @ (SignalingMessage::Offer { .. } | SignalingMessage::IceCandidate { .. }) => {
                if !self.room.is_joined() {
                    warn!("Dropping {} received outside a room", msg.message_type());
                    return;
                }
                if !self.has_live_call() && !self.open_session(Role::Callee).await {
                    return;
                }
                self.apply_to_call(msg).await;
            }

            msg @ (SignalingMessage::Answer { .. } | SignalingMessage::Leave { .. }) => {
                if self.has_live_call() {
                    self.apply_to_call(msg).await;
                } else {
                    debug!("No live call for {}, ignoring", msg.message_type());
                }
            }
        }
    }

    async fn handle_engine_notice(&mut self, notice: EngineNotice) {
        let effects = match self.call.as_mut() {
            Some(call) if call.session.id() == notice.session => {
                call.session.handle_engine_event(notice.event)
            }
            _ => {
                debug!("Dropping engine notice from stale session {}", notice.session);
                return;
            }
        };
        self.apply_effects(effects).await;
    }

    async fn apply_to_call(&mut self, msg: SignalingMessage) {
        let Some(call) = self.call.as_mut() else {
            return;
        };
        let effects = call.session.handle_message(msg);
        self.apply_effects(effects).await;
    }

    async fn start_call(&mut self) -> Result<(), NegotiationError> {
        if !self.room.is_joined() {
            return Err(NegotiationError::NotJoined);
        }

        if let Some(call) = &self.call {
            let session = &call.session;
            let replaceable = session.is_terminal()
                || (session.role() == Role::Callee
                    && session.state() == NegotiationState::AwaitingOffer);
            if !replaceable {
                return Err(NegotiationError::Busy);
            }
        }

        if !self.open_session(Role::Caller).await {
            return Ok(());
        }

        let effects = match self.call.as_mut() {
            Some(call) => call.session.start_call()?,
            None => return Ok(()),
        };
        self.apply_effects(effects).await;
        Ok(())
    }

    /// Creates a session and its engine, replacing whatever was there. A
    /// failure to build the engine is reported and leaves no session behind.
    async fn open_session(&mut self, role: Role) -> bool {
        self.release_call().await;

        let Some(membership) = self.room.membership() else {
            return false;
        };
        let (room, username) = (membership.room.clone(), membership.username.clone());

        self.next_session += 1;
        let id = SessionId(self.next_session);
        let session = match role {
            Role::Caller => NegotiationSession::caller(id, room, username),
            Role::Callee => NegotiationSession::callee(id, room, username),
        };

        let events = EngineEventSender::new(id, self.engine_tx.clone());
        let engine = match self.engines.create(events.clone()).await {
            Ok(engine) => engine,
            Err(e) => {
                error!("Failed to create media engine for session {}: {}", id, e);
                self.notify(ClientNotice::ResourceFailure(e.to_string()));
                return false;
            }
        };

        info!("Session {} opened as {}", id, role);
        let state = session.state();
        self.call = Some(ActiveCall {
            session,
            worker: EngineWorker::spawn(engine, events),
        });
        self.notify(ClientNotice::CallState(state));
        true
    }

    async fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Engine(cmd) => match &self.call {
                    Some(call) => call.worker.submit(cmd),
                    None => debug!("No engine for {:?}", cmd),
                },
                Effect::Send(msg) => self.send(msg).await,
                Effect::StateChanged(state) => self.notify(ClientNotice::CallState(state)),
                Effect::Failed(e) => self.notify(ClientNotice::CallFailed(e.to_string())),
                Effect::RemoteStream(stream) => self.notify(ClientNotice::RemoteStream(stream)),
            }
        }

        if self.call.as_ref().is_some_and(|c| c.session.is_terminal()) {
            self.release_call().await;
        }
    }

    async fn close_call(&mut self) {
        let effects = match self.call.as_mut() {
            Some(call) => call.session.close(),
            None => return,
        };
        self.apply_effects(effects).await;
    }

    async fn release_call(&mut self) {
        let Some(call) = self.call.take() else {
            return;
        };
        debug!(
            "Releasing session {} ({})",
            call.session.id(),
            call.session.state()
        );
        call.worker.shutdown().await;
    }

    fn has_live_call(&self) -> bool {
        self.call.as_ref().is_some_and(|c| !c.session.is_terminal())
    }

    async fn connect(&mut self) {
        match self.connector.connect(&self.config.relay_url).await {
            Ok((relay, events)) => {
                self.relay = Some(relay);
                self.relay_rx = Some(events);
            }
            Err(e) => {
                warn!("{}", e);
                self.supervisor.on_connect_failed(Instant::now());
            }
        }
    }

    async fn on_relay_lost(&mut self) {
        self.relay_closed = false;
        self.relay = None;
        self.relay_rx = None;
        self.room.on_disconnected();
        self.close_call().await;
        self.notify(ClientNotice::RelayDisconnected);

        if let ReconnectDecision::Stop = self.supervisor.on_disconnected(Instant::now()) {
            info!("Relay connection closed");
        }
    }

    async fn leave(&mut self) {
        let was_in_room = self.room.room().is_some();

        if let Some(msg) = self.room.leave() {
            self.send(msg).await;
        }
        self.close_call().await;
        self.disconnect_relay().await;

        if was_in_room {
            self.notify(ClientNotice::Left);
        }
    }

    async fn shutdown(&mut self) {
        info!("Shutting down signaling client");
        self.leave().await;
    }

    async fn disconnect_relay(&mut self) {
        self.relay_closed = false;
        self.supervisor.expect_disconnect();
        self.relay_rx = None;
        if let Some(relay) = self.relay.take() {
            relay.disconnect().await;
        }
        self.room.on_disconnected();
    }

    async fn send(&mut self, msg: SignalingMessage) {
        let Some(relay) = self.relay.clone() else {
            debug!("Relay down, dropping outbound {}", msg.message_type());
            return;
        };

        let text = match codec::encode(&msg) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to encode {}: {}", msg.message_type(), e);
                return;
            }
        };

        match relay.send(text).await {
            Ok(()) => {}
            Err(ChannelError::Closed) => {
                warn!("Relay closed while sending {}", msg.message_type());
                self.relay_closed = true;
            }
            Err(e) => warn!("{}", e),
        }
    }

    fn notify(&self, notice: ClientNotice) {
        let _ = self.notices.send(notice);
    }
}

async fn next_relay_event(rx: &mut Option<mpsc::Receiver<RelayEvent>>) -> Option<RelayEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => pending().await,
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => pending().await,
    }
}
