mod engine_event;
mod engine_worker;
mod media_engine;
#[cfg(feature = "webrtc-engine")]
mod webrtc_engine;

pub use engine_event::*;
pub use engine_worker::*;
pub use media_engine::*;
#[cfg(feature = "webrtc-engine")]
pub use webrtc_engine::*;
