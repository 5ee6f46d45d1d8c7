mod peer;
mod session;
mod signaling;

pub use peer::PeerId;
pub use session::{IceCandidateDescriptor, SdpKind, SessionDescriptor};
pub use signaling::{IceServerConfig, MessageType, SignalingMessage};
