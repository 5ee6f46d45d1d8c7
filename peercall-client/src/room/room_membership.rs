use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinState {
    NotJoined,
    JoinRequested,
    Joined,
}

impl fmt::Display for JoinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinState::NotJoined => f.write_str("not-joined"),
            JoinState::JoinRequested => f.write_str("join-requested"),
            JoinState::Joined => f.write_str("joined"),
        }
    }
}

/// Membership in one room for the lifetime of one relay connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMembership {
    pub room: String,
    pub username: String,
    pub join_state: JoinState,
}

impl RoomMembership {
    pub fn new(room: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            username: username.into(),
            join_state: JoinState::NotJoined,
        }
    }
}
