use crate::{RelayConfig, SignalingService, ws_handler};
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

pub fn router(service: SignalingService, config: &RelayConfig) -> Router {
    Router::new()
        .route(&config.ws_path, get(ws_handler))
        .with_state(service)
}

/// A bound relay, ready to serve.
pub struct RelayServer {
    listener: TcpListener,
    config: RelayConfig,
    service: SignalingService,
}

impl RelayServer {
    pub async fn bind(config: RelayConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

        Ok(Self {
            listener,
            config,
            service: SignalingService::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Listener has no local address")
    }

    /// WebSocket URL clients should connect to.
    pub fn ws_url(&self) -> Result<String> {
        Ok(format!("ws://{}{}", self.local_addr()?, self.config.ws_path))
    }

    pub fn service(&self) -> SignalingService {
        self.service.clone()
    }

    pub async fn run(self) -> Result<()> {
        let addr = self.local_addr()?;
        let app = router(self.service, &self.config);

        info!("Relay listening on ws://{}{}", addr, self.config.ws_path);
        axum::serve(self.listener, app)
            .await
            .context("Relay server stopped")
    }
}
