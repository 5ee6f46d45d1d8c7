mod relay_channel;
mod relay_event;
mod ws_relay;

pub use relay_channel::*;
pub use relay_event::*;
pub use ws_relay::*;
