use peercall_client::{ClientNotice, NegotiationState, SessionId};
use peercall_core::{SessionDescriptor, SignalingMessage};

use crate::integration::{TEST_RELAY_URL, TEST_ROOM, create_test_client, init_tracing, join_room};
use crate::utils::{MOCK_OFFER_SDP, next_sent, wait_for_notice};

#[tokio::test]
async fn test_join_opens_callee_session() {
    init_tracing();

    let mut client = create_test_client();
    client.handle.join(TEST_ROOM, "ann").await.expect("Client gone");
    next_sent(&mut client.sent).await.expect("No join sent");
    client
        .relay
        .inject(SignalingMessage::Joined {
            room: Some(TEST_ROOM.into()),
        })
        .await;

    let mut seen = Vec::new();
    wait_for_notice(&mut client.notices, |n| {
        seen.push(n.clone());
        matches!(n, ClientNotice::Joined { .. })
    })
    .await
    .expect("Not joined");

    assert_eq!(client.relay.urls().await, vec![TEST_RELAY_URL.to_owned()]);
    assert_eq!(client.engines.created(), 1);
    assert_eq!(client.engines.last_session().await, Some(SessionId(1)));
    assert_eq!(
        seen,
        vec![
            ClientNotice::RelayConnected,
            ClientNotice::CallState(NegotiationState::AwaitingOffer),
            ClientNotice::Joined {
                room: TEST_ROOM.into(),
            },
        ]
    );
}

#[tokio::test]
async fn test_duplicate_join_is_tolerated() {
    init_tracing();

    let mut client = create_test_client();
    join_room(&mut client, "ann").await.expect("Failed to join");

    client.handle.join(TEST_ROOM, "ann").await.expect("Client gone");
    assert_eq!(
        next_sent(&mut client.sent).await.expect("No join re-sent"),
        SignalingMessage::Join {
            room: TEST_ROOM.into(),
            username: "ann".into(),
        }
    );
    client
        .relay
        .inject(SignalingMessage::Joined {
            room: Some(TEST_ROOM.into()),
        })
        .await;

    // the existing callee session still takes the offer
    client
        .relay
        .inject(SignalingMessage::Offer {
            sdp: SessionDescriptor::offer(MOCK_OFFER_SDP),
        })
        .await;
    let msg = next_sent(&mut client.sent).await.expect("No answer sent");
    assert!(matches!(msg, SignalingMessage::Answer { .. }));

    let mut seen = Vec::new();
    wait_for_notice(&mut client.notices, |n| {
        seen.push(n.clone());
        *n == ClientNotice::CallState(NegotiationState::Established)
    })
    .await
    .expect("Call not established");

    assert!(!seen.iter().any(|n| matches!(n, ClientNotice::Joined { .. })));
    assert_eq!(client.engines.created(), 1);
}

#[tokio::test]
async fn test_join_before_connected_sent_once() {
    init_tracing();

    let mut client = create_test_client();
    client.handle.join(TEST_ROOM, "ann").await.expect("Client gone");

    next_sent(&mut client.sent).await.expect("No join sent");
    assert!(
        tokio::time::timeout(
            std::time::Duration::from_millis(100),
            client.sent.recv()
        )
        .await
        .is_err(),
        "join must be sent exactly once"
    );
}
