mod reconnect_supervisor;

pub use reconnect_supervisor::*;
