mod negotiation_session;
mod negotiation_state;

pub use negotiation_session::*;
pub use negotiation_state::*;
