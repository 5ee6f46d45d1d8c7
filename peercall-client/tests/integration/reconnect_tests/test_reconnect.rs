use std::time::Duration;

use peercall_client::{ClientNotice, NegotiationState, SessionId};
use peercall_core::SignalingMessage;

use crate::integration::{
    TEST_ROOM, create_test_client, create_test_client_with, init_tracing, join_room,
};
use crate::utils::{EngineCall, MockEngineFactory, MockRelay, next_sent, wait_for_notice};

#[tokio::test(start_paused = true)]
async fn test_unexpected_drop_rejoins_after_interval() {
    init_tracing();

    let mut client = create_test_client();
    join_room(&mut client, "ann").await.expect("Failed to join");

    client.relay.drop_connection().await;

    let mut seen = Vec::new();
    wait_for_notice(&mut client.notices, |n| {
        seen.push(n.clone());
        *n == ClientNotice::RelayDisconnected
    })
    .await
    .expect("No disconnect notice");
    assert!(seen.contains(&ClientNotice::CallState(NegotiationState::Closed)));
    assert_eq!(
        client.engines.calls_for(SessionId(1)).await,
        vec![EngineCall::Close]
    );

    tokio::time::sleep(Duration::from_millis(4900)).await;
    assert_eq!(client.relay.connects(), 1, "reconnected before the interval");

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(client.relay.connects(), 2);
    assert_eq!(
        next_sent(&mut client.sent).await.expect("No join re-sent"),
        SignalingMessage::Join {
            room: TEST_ROOM.into(),
            username: "ann".into(),
        }
    );

    // the rejoined room gets a fresh session
    client
        .relay
        .inject(SignalingMessage::Joined {
            room: Some(TEST_ROOM.into()),
        })
        .await;
    wait_for_notice(&mut client.notices, |n| {
        matches!(n, ClientNotice::Joined { .. })
    })
    .await
    .expect("Not rejoined");
    assert_eq!(client.engines.last_session().await, Some(SessionId(2)));
}

#[tokio::test(start_paused = true)]
async fn test_failed_connect_retried_at_fixed_interval() {
    init_tracing();

    let (relay, sent) = MockRelay::new();
    relay.fail_next_connects(2);
    let mut client = create_test_client_with((relay, sent), MockEngineFactory::new());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(client.relay.connects(), 1);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(client.relay.connects(), 2);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(client.relay.connects(), 3);

    wait_for_notice(&mut client.notices, |n| *n == ClientNotice::RelayConnected)
        .await
        .expect("Never connected");
    join_room(&mut client, "ann").await.expect("Failed to join");
}

#[tokio::test(start_paused = true)]
async fn test_join_while_offline_waits_for_reconnect() {
    init_tracing();

    let mut client = create_test_client();
    wait_for_notice(&mut client.notices, |n| *n == ClientNotice::RelayConnected)
        .await
        .expect("Not connected");
    client.relay.drop_connection().await;
    wait_for_notice(&mut client.notices, |n| *n == ClientNotice::RelayDisconnected)
        .await
        .expect("No disconnect notice");

    client.handle.join(TEST_ROOM, "ann").await.expect("Client gone");
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(client.relay.connects(), 1);
    assert!(client.relay.sent().await.is_empty());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(client.relay.connects(), 2);
    assert!(matches!(
        next_sent(&mut client.sent).await.expect("No join sent"),
        SignalingMessage::Join { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_closed_send_counts_as_drop() {
    init_tracing();

    let mut client = create_test_client();
    join_room(&mut client, "ann").await.expect("Failed to join");

    client.relay.close_sends();
    client.handle.start_call().await.expect("Client gone");

    let mut seen = Vec::new();
    wait_for_notice(&mut client.notices, |n| {
        seen.push(n.clone());
        *n == ClientNotice::RelayDisconnected
    })
    .await
    .expect("Closed send not treated as a drop");
    assert!(seen.contains(&ClientNotice::CallState(NegotiationState::Closed)));
    let sent = client.relay.sent().await;
    assert!(!sent.iter().any(|m| matches!(m, SignalingMessage::Offer { .. })));
    assert_eq!(client.relay.connects(), 1);

    tokio::time::sleep(Duration::from_millis(5100)).await;
    assert_eq!(client.relay.connects(), 2);
    assert_eq!(
        next_sent(&mut client.sent).await.expect("No join re-sent"),
        SignalingMessage::Join {
            room: TEST_ROOM.into(),
            username: "ann".into(),
        }
    );
}
