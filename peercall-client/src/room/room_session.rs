use crate::room::{JoinState, RoomMembership};
use peercall_core::SignalingMessage;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
struct JoinIntent {
    room: String,
    username: String,
}

/// Tracks which room this client wants to be in and whether the relay has
/// confirmed it.
///
/// The intent survives relay drops; the [`RoomMembership`] does not. A fresh
/// membership is built every time the relay comes back so nothing learned on
/// the old connection leaks into the new one.
#[derive(Debug, Default)]
pub struct RoomSession {
    intent: Option<JoinIntent>,
    membership: Option<RoomMembership>,
    connected: bool,
}

impl RoomSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_joined(&self) -> bool {
        self.join_state() == JoinState::Joined
    }

    pub fn join_state(&self) -> JoinState {
        self.membership
            .as_ref()
            .map_or(JoinState::NotJoined, |m| m.join_state)
    }

    pub fn membership(&self) -> Option<&RoomMembership> {
        self.membership.as_ref()
    }

    pub fn room(&self) -> Option<&str> {
        self.intent.as_ref().map(|i| i.room.as_str())
    }

    pub fn username(&self) -> Option<&str> {
        self.intent.as_ref().map(|i| i.username.as_str())
    }

    /// Records the join intent and returns the `join` to send, if the relay is
    /// up. Otherwise the join goes out on the next [`on_connected`].
    ///
    /// Joining again while already joined to the same room re-sends `join`
    /// and keeps the existing membership.
    ///
    /// [`on_connected`]: RoomSession::on_connected
    pub fn join(&mut self, room: &str, username: &str) -> Option<SignalingMessage> {
        self.intent = Some(JoinIntent {
            room: room.to_owned(),
            username: username.to_owned(),
        });

        if !self.connected {
            debug!("Relay not connected, deferring join to '{}'", room);
            return None;
        }

        let same = self
            .membership
            .as_ref()
            .is_some_and(|m| m.room == room && m.username == username);

        if same {
            if let Some(m) = self.membership.as_mut()
                && m.join_state == JoinState::NotJoined
            {
                m.join_state = JoinState::JoinRequested;
            }
        } else {
            let mut membership = RoomMembership::new(room, username);
            membership.join_state = JoinState::JoinRequested;
            self.membership = Some(membership);
        }

        info!("Joining room '{}' as '{}'", room, username);
        Some(join_message(room, username))
    }

    /// Relay connection is up. Returns the `join` to (re-)send if a room was
    /// requested.
    pub fn on_connected(&mut self) -> Option<SignalingMessage> {
        self.connected = true;

        let intent = self.intent.as_ref()?;
        let mut membership = RoomMembership::new(&intent.room, &intent.username);
        membership.join_state = JoinState::JoinRequested;
        self.membership = Some(membership);

        info!("Joining room '{}' as '{}'", intent.room, intent.username);
        Some(join_message(&intent.room, &intent.username))
    }

    /// Relay confirmed the join. Returns true only on the transition into
    /// `Joined`, so a confirmation of a duplicate join is not counted twice.
    pub fn on_joined(&mut self, room: Option<&str>) -> bool {
        let Some(membership) = self.membership.as_mut() else {
            warn!("Received joined without a pending join, ignoring");
            return false;
        };

        if let Some(room) = room
            && room != membership.room
        {
            warn!(
                "Received joined for room '{}' while joining '{}', ignoring",
                room, membership.room
            );
            return false;
        }

        match membership.join_state {
            JoinState::JoinRequested => {
                membership.join_state = JoinState::Joined;
                info!("Joined room '{}'", membership.room);
                true
            }
            JoinState::Joined => {
                debug!("Room '{}' already joined", membership.room);
                false
            }
            JoinState::NotJoined => {
                warn!("Received joined before join was sent, ignoring");
                false
            }
        }
    }

    /// Drops the intent and the membership. Returns the `leave` to send if the
    /// relay is up and a membership existed.
    pub fn leave(&mut self) -> Option<SignalingMessage> {
        self.intent = None;
        let membership = self.membership.take()?;

        if !self.connected {
            return None;
        }

        info!("Leaving room '{}'", membership.room);
        Some(SignalingMessage::Leave {
            room: membership.room,
            username: membership.username,
        })
    }

    /// Relay connection is gone. The membership dies with it; the intent is
    /// kept for the reconnect.
    pub fn on_disconnected(&mut self) {
        self.connected = false;
        if let Some(membership) = self.membership.take() {
            debug!(
                "Dropped membership of '{}' ({})",
                membership.room, membership.join_state
            );
        }
    }
}

fn join_message(room: &str, username: &str) -> SignalingMessage {
    SignalingMessage::Join {
        room: room.to_owned(),
        username: username.to_owned(),
    }
}
