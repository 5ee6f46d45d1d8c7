mod client;
mod config;
mod engine;
mod error;
mod negotiation;
mod reconnect;
mod relay;
mod room;

pub use client::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use negotiation::*;
pub use reconnect::*;
pub use relay::*;
pub use room::*;
