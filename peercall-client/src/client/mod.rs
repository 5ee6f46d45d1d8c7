mod client_command;
mod client_handle;
mod client_notice;
mod signaling_client;

pub use client_command::*;
pub use client_handle::*;
pub use client_notice::*;
pub use signaling_client::*;
