use peercall_core::IceServerConfig;
use peercall_core::utils::RECONNECT_INTERVAL_SECS;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the signaling relay.
    pub relay_url: String,
    /// Fixed delay before each reconnect attempt after an unexpected drop.
    pub reconnect_interval: Duration,
    /// Handed to the media engine when one is built from this config.
    pub ice_servers: Vec<IceServerConfig>,
}

impl ClientConfig {
    pub fn new(relay_url: impl Into<String>) -> Self {
        Self {
            relay_url: relay_url.into(),
            ..Default::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: "ws://127.0.0.1:8080/ws".to_owned(),
            reconnect_interval: Duration::from_secs(RECONNECT_INTERVAL_SECS),
            ice_servers: vec![IceServerConfig::default()],
        }
    }
}
