use dashmap::DashMap;
use peercall_core::PeerId;
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMember {
    pub room: String,
    pub username: String,
}

/// Which peer sits in which room. A peer is in at most one room; rooms exist
/// only while they have members.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, HashSet<PeerId>>,
    members: DashMap<PeerId, RoomMember>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts the peer in `room`. Returns the membership it had to give up, if
    /// it was in a different room. Re-joining the same room only refreshes
    /// the username.
    pub fn join(&self, peer_id: PeerId, room: &str, username: &str) -> Option<RoomMember> {
        let previous = match self.member(&peer_id) {
            Some(member) if member.room == room => None,
            Some(_) => self.leave(&peer_id),
            None => None,
        };

        if !self.rooms.contains_key(room) {
            info!("Creating room '{}'", room);
        }
        self.rooms
            .entry(room.to_owned())
            .or_default()
            .insert(peer_id);
        self.members.insert(
            peer_id,
            RoomMember {
                room: room.to_owned(),
                username: username.to_owned(),
            },
        );

        previous
    }

    pub fn leave(&self, peer_id: &PeerId) -> Option<RoomMember> {
        let (_, member) = self.members.remove(peer_id)?;

        if let Some(mut peers) = self.rooms.get_mut(&member.room) {
            peers.remove(peer_id);
        }
        if self
            .rooms
            .remove_if(&member.room, |_, peers| peers.is_empty())
            .is_some()
        {
            debug!("Room '{}' is empty, dropping it", member.room);
        }

        Some(member)
    }

    pub fn member(&self, peer_id: &PeerId) -> Option<RoomMember> {
        self.members.get(peer_id).map(|m| m.clone())
    }

    /// Everyone in the peer's room except the peer itself.
    pub fn others(&self, peer_id: &PeerId) -> Vec<PeerId> {
        let Some(member) = self.member(peer_id) else {
            return Vec::new();
        };
        self.peers_in(&member.room)
            .into_iter()
            .filter(|p| p != peer_id)
            .collect()
    }

    pub fn peers_in(&self, room: &str) -> Vec<PeerId> {
        self.rooms
            .get(room)
            .map(|peers| peers.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
