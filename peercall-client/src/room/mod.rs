mod room_membership;
mod room_session;

pub use room_membership::*;
pub use room_session::*;
