use crate::room::RoomRegistry;
use axum::extract::ws::Message;
use dashmap::DashMap;
use peercall_core::{PeerId, SignalingMessage, codec};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

struct SignalingInner {
    peers: DashMap<PeerId, mpsc::UnboundedSender<Message>>,
    rooms: RoomRegistry,
}

/// Relay side of the signaling protocol: confirms joins and forwards
/// negotiation messages to the other members of the sender's room.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                rooms: RoomRegistry::new(),
            }),
        }
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.inner.rooms
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(peer_id, tx);
    }

    /// Forgets the socket. Remaining room members are told the peer left.
    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.inner.peers.remove(peer_id);
        self.leave_room(peer_id);
    }

    pub fn handle_text(&self, peer_id: PeerId, text: &str) {
        let msg = match codec::decode(text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Invalid signaling message from {}: {}", peer_id, e);
                return;
            }
        };

        match msg {
            SignalingMessage::Join { room, username } => {
                info!("Peer {} joins room '{}' as '{}'", peer_id, room, username);
                if let Some(previous) = self.inner.rooms.join(peer_id, &room, &username) {
                    self.announce_leave(peer_id, &previous.room, previous.username);
                }
                self.send_signal(peer_id, &SignalingMessage::Joined { room: Some(room) });
            }

            SignalingMessage::Leave { .. } => self.leave_room(&peer_id),

            msg @ (SignalingMessage::Offer { .. }
            | SignalingMessage::Answer { .. }
            | SignalingMessage::IceCandidate { .. }) => {
                if self.inner.rooms.member(&peer_id).is_none() {
                    warn!(
                        "Peer {} sent {} outside a room, dropping",
                        peer_id,
                        msg.message_type()
                    );
                    return;
                }
                self.forward(peer_id, &msg);
            }

            SignalingMessage::Joined { .. } => {
                warn!("Peer {} sent joined, dropping", peer_id);
            }
        }
    }

    pub fn send_signal(&self, peer_id: PeerId, msg: &SignalingMessage) {
        let Some(peer) = self.inner.peers.get(&peer_id) else {
            warn!("Attempted to send signal to disconnected peer {}", peer_id);
            return;
        };

        match codec::encode(msg) {
            Ok(json) => {
                if let Err(e) = peer.send(Message::Text(json.into())) {
                    error!("Failed to send WS message to {}: {}", peer_id, e);
                }
            }
            Err(e) => error!("Failed to serialize signal message: {}", e),
        }
    }

    fn forward(&self, from: PeerId, msg: &SignalingMessage) {
        let others = self.inner.rooms.others(&from);
        debug!(
            "Forwarding {} from {} to {} peer(s)",
            msg.message_type(),
            from,
            others.len()
        );
        for peer_id in others {
            self.send_signal(peer_id, msg);
        }
    }

    fn leave_room(&self, peer_id: &PeerId) {
        let Some(member) = self.inner.rooms.leave(peer_id) else {
            return;
        };
        info!("Peer {} left room '{}'", peer_id, member.room);
        self.announce_leave(*peer_id, &member.room, member.username);
    }

    fn announce_leave(&self, peer_id: PeerId, room: &str, username: String) {
        let msg = SignalingMessage::Leave {
            room: room.to_owned(),
            username,
        };
        for other in self.inner.rooms.peers_in(room) {
            if other != peer_id {
                self.send_signal(other, &msg);
            }
        }
    }
}
