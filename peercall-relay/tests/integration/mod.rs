
use anyhow::Result;
use peercall_relay::{RelayConfig, RelayServer};
use std::net::SocketAddr;
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Start a relay on an ephemeral local port and return its WebSocket URL.
pub async fn start_relay() -> Result<String> {
    let config = RelayConfig {
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        ..Default::default()
    };
    let server = RelayServer::bind(config).await?;
    let url = server.ws_url()?;

    tokio::spawn(async move {
        if let Err(e) = server.run().await {
            tracing::error!("Relay failed: {:#}", e);
        }
    });

    Ok(url)
}
