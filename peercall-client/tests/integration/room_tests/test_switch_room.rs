use peercall_client::{ClientNotice, NegotiationState, SessionId};
use peercall_core::{SessionDescriptor, SignalingMessage};

use crate::integration::{create_test_client, init_tracing, join_room};
use crate::utils::{EngineCall, MOCK_OFFER_SDP, next_sent, wait_for_notice};

const OTHER_ROOM: &str = "kitchen";

#[tokio::test]
async fn test_switching_rooms_replaces_call() {
    init_tracing();

    let mut client = create_test_client();
    join_room(&mut client, "ann").await.expect("Failed to join");

    client
        .relay
        .inject(SignalingMessage::Offer {
            sdp: SessionDescriptor::offer(MOCK_OFFER_SDP),
        })
        .await;
    next_sent(&mut client.sent).await.expect("No answer sent");
    wait_for_notice(&mut client.notices, |n| {
        *n == ClientNotice::CallState(NegotiationState::Established)
    })
    .await
    .expect("Call not established");

    client.handle.join(OTHER_ROOM, "ann").await.expect("Client gone");

    wait_for_notice(&mut client.notices, |n| {
        *n == ClientNotice::CallState(NegotiationState::Closed)
    })
    .await
    .expect("Old call not closed");
    assert_eq!(
        next_sent(&mut client.sent).await.expect("No join sent"),
        SignalingMessage::Join {
            room: OTHER_ROOM.into(),
            username: "ann".into(),
        }
    );
    assert_eq!(
        client.engines.calls_for(SessionId(1)).await.last(),
        Some(&EngineCall::Close)
    );

    client
        .relay
        .inject(SignalingMessage::Joined {
            room: Some(OTHER_ROOM.into()),
        })
        .await;
    wait_for_notice(&mut client.notices, |n| {
        *n == ClientNotice::Joined {
            room: OTHER_ROOM.into(),
        }
    })
    .await
    .expect("Not joined to the new room");
    assert_eq!(client.engines.created(), 2);
    assert_eq!(client.engines.last_session().await, Some(SessionId(2)));

    // an offer in the new room reaches the new callee
    client
        .relay
        .inject(SignalingMessage::Offer {
            sdp: SessionDescriptor::offer(MOCK_OFFER_SDP),
        })
        .await;
    let msg = next_sent(&mut client.sent).await.expect("No answer sent");
    assert!(matches!(msg, SignalingMessage::Answer { .. }));
    wait_for_notice(&mut client.notices, |n| {
        *n == ClientNotice::CallState(NegotiationState::Established)
    })
    .await
    .expect("Call in the new room not established");
}
