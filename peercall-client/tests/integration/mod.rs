pub mod reconnect_tests;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Level;

use anyhow::{Result, ensure};
use peercall_client::{ClientConfig, ClientHandle, ClientNotice, SignalingClient};
use peercall_core::SignalingMessage;

use crate::utils::{MockEngineFactory, MockRelay, next_sent, wait_for_notice};

pub const TEST_RELAY_URL: &str = "ws://relay.test/ws";
pub const TEST_ROOM: &str = "lobby";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub struct TestClient {
    pub handle: ClientHandle,
    pub notices: mpsc::UnboundedReceiver<ClientNotice>,
    pub relay: MockRelay,
    pub sent: mpsc::UnboundedReceiver<SignalingMessage>,
    pub engines: MockEngineFactory,
}

pub fn create_test_client() -> TestClient {
    create_test_client_with(MockRelay::new(), MockEngineFactory::new())
}

pub fn create_test_client_with(
    (relay, sent): (MockRelay, mpsc::UnboundedReceiver<SignalingMessage>),
    engines: MockEngineFactory,
) -> TestClient {
    let config = ClientConfig {
        reconnect_interval: Duration::from_secs(5),
        ..ClientConfig::new(TEST_RELAY_URL)
    };

    let (client, handle, notices) =
        SignalingClient::new(config, Arc::new(relay.clone()), Arc::new(engines.clone()));

    tokio::spawn(async move {
        client.run().await;
    });

    TestClient {
        handle,
        notices,
        relay,
        sent,
        engines,
    }
}

/// Join [`TEST_ROOM`] and have the relay confirm it.
pub async fn join_room(client: &mut TestClient, username: &str) -> Result<()> {
    client.handle.join(TEST_ROOM, username).await?;

    let msg = next_sent(&mut client.sent).await?;
    ensure!(
        msg == SignalingMessage::Join {
            room: TEST_ROOM.into(),
            username: username.into(),
        },
        "unexpected first message {:?}",
        msg
    );

    client
        .relay
        .inject(SignalingMessage::Joined {
            room: Some(TEST_ROOM.into()),
        })
        .await;

    wait_for_notice(&mut client.notices, |n| {
        matches!(n, ClientNotice::Joined { .. })
    })
    .await?;
    Ok(())
}
