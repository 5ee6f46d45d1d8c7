pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";

/// Delay between relay reconnect attempts. Constant, no growth.
pub const RECONNECT_INTERVAL_SECS: u64 = 5;
