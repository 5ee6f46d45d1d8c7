use crate::engine::{DescriptionSide, EngineCommand, EngineEvent, RemoteStream, SessionId};
use crate::error::{EngineError, NegotiationError};
use crate::negotiation::{NegotiationState, Role};
use peercall_core::{IceCandidateDescriptor, SessionDescriptor, SignalingMessage};
use std::collections::VecDeque;
use tracing::{debug, error, info, warn};

/// Side effect requested by a transition. The dispatcher carries them out in
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Engine(EngineCommand),
    Send(SignalingMessage),
    StateChanged(NegotiationState),
    Failed(NegotiationError),
    RemoteStream(RemoteStream),
}

/// One offer/answer negotiation with a single remote peer.
///
/// Pure state machine: inputs are relay messages, engine events and local
/// commands; outputs are [`Effect`]s. Local descriptions are only sent once the
/// engine confirms them, and local candidates gathered before that point are
/// held back and flushed right after the description goes out.
#[derive(Debug)]
pub struct NegotiationSession {
    id: SessionId,
    role: Role,
    state: NegotiationState,
    room: String,
    local_user: String,
    pending_local_candidates: VecDeque<IceCandidateDescriptor>,
    unconfirmed_local: Option<SessionDescriptor>,
    local_confirmed: bool,
    remote_requested: bool,
    remote_confirmed: bool,
}

impl NegotiationSession {
    pub fn caller(id: SessionId, room: impl Into<String>, local_user: impl Into<String>) -> Self {
        Self::new(id, Role::Caller, NegotiationState::Idle, room, local_user)
    }

    pub fn callee(id: SessionId, room: impl Into<String>, local_user: impl Into<String>) -> Self {
        Self::new(
            id,
            Role::Callee,
            NegotiationState::AwaitingOffer,
            room,
            local_user,
        )
    }

    fn new(
        id: SessionId,
        role: Role,
        state: NegotiationState,
        room: impl Into<String>,
        local_user: impl Into<String>,
    ) -> Self {
        Self {
            id,
            role,
            state,
            room: room.into(),
            local_user: local_user.into(),
            pending_local_candidates: VecDeque::new(),
            unconfirmed_local: None,
            local_confirmed: false,
            remote_requested: false,
            remote_confirmed: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn local_user(&self) -> &str {
        &self.local_user
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn pending_local_candidates(&self) -> impl Iterator<Item = &IceCandidateDescriptor> {
        self.pending_local_candidates.iter()
    }

    pub fn start_call(&mut self) -> Result<Vec<Effect>, NegotiationError> {
        if self.role != Role::Caller || self.state != NegotiationState::Idle {
            return Err(NegotiationError::InvalidTransition {
                state: self.state,
                action: "start a call",
            });
        }

        let mut effects = Vec::new();
        self.transition(NegotiationState::OfferSent, &mut effects);
        effects.push(Effect::Engine(EngineCommand::CreateOffer));
        Ok(effects)
    }

    pub fn handle_message(&mut self, msg: SignalingMessage) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.is_terminal() {
            debug!(
                "Session {} is {}, ignoring {}",
                self.id,
                self.state,
                msg.message_type()
            );
            return effects;
        }

        match msg {
            SignalingMessage::Offer { sdp } => match self.state {
                NegotiationState::AwaitingOffer => {
                    self.remote_requested = true;
                    self.transition(NegotiationState::AnswerPending, &mut effects);
                    effects.push(Effect::Engine(EngineCommand::SetRemoteDescription(sdp)));
                }
                NegotiationState::OfferSent => {
                    warn!("Session {}: offer collision, dropping remote offer", self.id);
                }
                state => warn!("Session {}: unexpected offer while {}", self.id, state),
            },

            SignalingMessage::Answer { sdp } => {
                if self.state == NegotiationState::OfferSent
                    && self.local_confirmed
                    && !self.remote_requested
                {
                    self.remote_requested = true;
                    effects.push(Effect::Engine(EngineCommand::SetRemoteDescription(sdp)));
                } else {
                    warn!("Session {}: unexpected answer while {}", self.id, self.state);
                }
            }

            SignalingMessage::IceCandidate { ice } => {
                effects.push(Effect::Engine(EngineCommand::AddRemoteCandidate(ice)));
            }

            SignalingMessage::Leave { username, .. } => {
                info!("Session {}: remote peer '{}' left", self.id, username);
                self.transition(NegotiationState::Closed, &mut effects);
            }

            SignalingMessage::Join { .. } | SignalingMessage::Joined { .. } => {}
        }

        effects
    }

    pub fn handle_engine_event(&mut self, event: EngineEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.is_terminal() {
            return effects;
        }

        match event {
            EngineEvent::OfferCreated(Ok(desc)) => {
                if self.state == NegotiationState::OfferSent && self.awaiting_local_description() {
                    self.unconfirmed_local = Some(desc.clone());
                    effects.push(Effect::Engine(EngineCommand::SetLocalDescription(desc)));
                } else {
                    debug!("Session {}: stale offer ignored", self.id);
                }
            }
            EngineEvent::OfferCreated(Err(e)) => self.fail("create offer", e, &mut effects),

            EngineEvent::AnswerCreated(Ok(desc)) => {
                if self.state == NegotiationState::AnswerPending
                    && self.remote_confirmed
                    && self.awaiting_local_description()
                {
                    self.unconfirmed_local = Some(desc.clone());
                    effects.push(Effect::Engine(EngineCommand::SetLocalDescription(desc)));
                } else {
                    debug!("Session {}: stale answer ignored", self.id);
                }
            }
            EngineEvent::AnswerCreated(Err(e)) => self.fail("create answer", e, &mut effects),

            EngineEvent::DescriptionSet {
                side: DescriptionSide::Local,
                result: Ok(()),
            } => self.on_local_confirmed(&mut effects),
            EngineEvent::DescriptionSet {
                side: DescriptionSide::Local,
                result: Err(e),
            } => self.fail("set local description", e, &mut effects),

            EngineEvent::DescriptionSet {
                side: DescriptionSide::Remote,
                result: Ok(()),
            } => self.on_remote_confirmed(&mut effects),
            EngineEvent::DescriptionSet {
                side: DescriptionSide::Remote,
                result: Err(e),
            } => self.fail("set remote description", e, &mut effects),

            EngineEvent::CandidateAdded(Ok(())) => {}
            EngineEvent::CandidateAdded(Err(e)) => {
                warn!("Session {}: remote candidate rejected: {}", self.id, e);
            }

            EngineEvent::LocalCandidate(candidate) => {
                if self.local_confirmed {
                    effects.push(Effect::Send(SignalingMessage::IceCandidate { ice: candidate }));
                } else {
                    self.pending_local_candidates.push_back(candidate);
                }
            }

            EngineEvent::RemoteStreamAdded(stream) => {
                info!(
                    "Session {}: remote {} stream {} added",
                    self.id, stream.kind, stream.stream_id
                );
                effects.push(Effect::RemoteStream(stream));
            }
        }

        effects
    }

    /// Hang-up, leave or teardown. No-op once terminal.
    pub fn close(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.is_terminal() {
            self.transition(NegotiationState::Closed, &mut effects);
        }
        effects
    }

    fn awaiting_local_description(&self) -> bool {
        self.unconfirmed_local.is_none() && !self.local_confirmed
    }

    fn on_local_confirmed(&mut self, effects: &mut Vec<Effect>) {
        let Some(desc) = self.unconfirmed_local.take() else {
            debug!("Session {}: unsolicited local description result", self.id);
            return;
        };

        self.local_confirmed = true;
        info!("Session {}: sending {}", self.id, desc.kind);
        effects.push(Effect::Send(SignalingMessage::description(desc)));

        for candidate in self.pending_local_candidates.drain(..) {
            effects.push(Effect::Send(SignalingMessage::IceCandidate { ice: candidate }));
        }

        if self.role == Role::Callee {
            self.transition(NegotiationState::Established, effects);
        }
    }

    fn on_remote_confirmed(&mut self, effects: &mut Vec<Effect>) {
        if !self.remote_requested || self.remote_confirmed {
            debug!("Session {}: unsolicited remote description result", self.id);
            return;
        }
        self.remote_confirmed = true;

        match (self.role, self.state) {
            (Role::Callee, NegotiationState::AnswerPending) => {
                effects.push(Effect::Engine(EngineCommand::CreateAnswer));
            }
            (Role::Caller, NegotiationState::OfferSent) => {
                self.transition(NegotiationState::Established, effects);
            }
            (role, state) => {
                debug!(
                    "Session {}: remote description confirmed for {} while {}",
                    self.id, role, state
                );
            }
        }
    }

    fn fail(&mut self, step: &'static str, source: EngineError, effects: &mut Vec<Effect>) {
        error!("Session {}: {} failed: {}", self.id, step, source);
        self.transition(NegotiationState::Failed, effects);
        effects.push(Effect::Failed(NegotiationError::Engine { step, source }));
    }

    fn transition(&mut self, next: NegotiationState, effects: &mut Vec<Effect>) {
        if self.state == next {
            return;
        }
        info!(
            "Session {} ({}): {} -> {}",
            self.id, self.role, self.state, next
        );
        self.state = next;
        if next.is_terminal() {
            self.pending_local_candidates.clear();
            self.unconfirmed_local = None;
        }
        effects.push(Effect::StateChanged(next));
    }
}
