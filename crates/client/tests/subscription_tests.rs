//! Subscription lifecycle tests against scripted mock connections.

use futures::StreamExt;
use graphql_client_config::{AuthorizationConfig, ClientConfig};
use graphql_test_utils::fixtures::{Review, ReviewAdded};
use graphql_test_utils::{frames, MockSubscriptionTransport};
use graphql_typed_client::{
    ClientError, GraphQLClient, SubscriptionOperation, SubscriptionState, TransportError,
};
use serde_json::json;
use std::time::Duration;

fn client(transport: &MockSubscriptionTransport) -> GraphQLClient {
    GraphQLClient::new("https://swapi.example/graphql")
        .with_subscription_transport(transport.clone())
}

fn review(stars: i64) -> serde_json::Value {
    json!({"reviewAdded": {"stars": stars, "commentary": null}})
}

fn stars(item: Option<graphql_typed_client::Result<graphql_typed_client::Response<ReviewAdded>>>) -> i64 {
    item.expect("stream ended")
        .expect("item failed")
        .into_data()
        .expect("no data")
        .review_added
        .stars
}

#[tokio::test]
async fn test_messages_until_server_completes() {
    let transport = MockSubscriptionTransport::new().with_session([
        frames::ack(),
        frames::next(&review(5)),
        frames::next(&review(3)),
        frames::complete(),
    ]);
    let mut operation = client(&transport)
        .subscription::<ReviewAdded>()
        .unwrap()
        .with_argument("episode", "JEDI")
        .subscribe()
        .unwrap();

    let first = operation.next().await.unwrap().unwrap();
    assert_eq!(
        first.data(),
        Some(&ReviewAdded {
            review_added: Review {
                stars: 5,
                commentary: None
            }
        })
    );
    assert_eq!(stars(operation.next().await), 3);
    assert!(operation.next().await.is_none());
    assert_eq!(operation.state(), SubscriptionState::Stopped);

    let connections = transport.connections();
    assert_eq!(connections.len(), 1);
    let connection = &connections[0];
    assert_eq!(connection.url, "wss://swapi.example/graphql");
    assert_eq!(connection.sent_types(), vec!["connection_init", "subscribe"]);
    assert!(connection.is_closed());

    let subscribe = &connection.sent_frames()[1];
    assert_eq!(subscribe["id"], "1");
    insta::assert_json_snapshot!(subscribe["payload"], @r#"
    {
      "query": "subscription($episode:Episode){reviewAdded(episode:$episode){stars commentary}}",
      "variables": {
        "episode": "JEDI"
      }
    }
    "#);
}

#[tokio::test]
async fn test_stop_completes_and_closes() {
    let transport =
        MockSubscriptionTransport::new().with_session([frames::ack(), frames::next(&review(4))]);
    let mut operation = client(&transport)
        .subscription::<ReviewAdded>()
        .unwrap()
        .subscribe()
        .unwrap();
    let mut changes = operation.state_changes();

    assert_eq!(stars(operation.next().await), 4);
    assert_eq!(operation.state(), SubscriptionState::Active);

    operation.stop();
    assert!(operation.next().await.is_none());
    let state = *changes.wait_for(|state| state.is_terminal()).await.unwrap();
    assert_eq!(state, SubscriptionState::Stopped);

    let connection = &transport.connections()[0];
    assert_eq!(
        connection.sent_types(),
        vec!["connection_init", "subscribe", "complete"]
    );
    assert!(connection.is_closed());
}

#[tokio::test]
async fn test_reconnect_opens_new_connection() {
    let transport = MockSubscriptionTransport::new()
        .with_session([frames::ack(), frames::next(&review(1))])
        .with_session([frames::ack(), frames::next(&review(2))]);
    let mut operation = client(&transport)
        .subscription::<ReviewAdded>()
        .unwrap()
        .subscribe()
        .unwrap();

    assert_eq!(stars(operation.next().await), 1);
    operation.reconnect();
    assert_eq!(stars(operation.next().await), 2);
    assert_eq!(operation.state(), SubscriptionState::Active);

    let connections = transport.connections();
    assert_eq!(connections.len(), 2);
    assert!(connections[0].is_closed());
    assert_eq!(
        connections[0].sent_types(),
        vec!["connection_init", "subscribe", "complete"]
    );
    assert_eq!(connections[1].sent_types(), vec!["connection_init", "subscribe"]);

    operation.shutdown().await;
    assert!(transport.connections()[1].is_closed());
}

#[tokio::test]
async fn test_connect_failure() {
    let transport = MockSubscriptionTransport::new();
    let mut operation = client(&transport)
        .subscription::<ReviewAdded>()
        .unwrap()
        .subscribe()
        .unwrap();

    let error = operation.next().await.unwrap().unwrap_err();
    assert!(
        matches!(error, ClientError::Transport(TransportError::WebSocket(_))),
        "got {error:?}"
    );
    assert!(operation.next().await.is_none());
    assert_eq!(operation.state(), SubscriptionState::Failed);
}

#[tokio::test]
async fn test_error_frame_fails_operation() {
    let transport =
        MockSubscriptionTransport::new().with_session([frames::ack(), frames::error("boom")]);
    let mut operation = client(&transport)
        .subscription::<ReviewAdded>()
        .unwrap()
        .subscribe()
        .unwrap();

    let error = operation.next().await.unwrap().unwrap_err();
    assert_eq!(error.graphql_errors()[0].message, "boom");
    assert!(operation.next().await.is_none());
    assert_eq!(operation.state(), SubscriptionState::Failed);
}

#[tokio::test]
async fn test_errors_in_next_payload_do_not_end_stream() {
    let transport = MockSubscriptionTransport::new().with_session([
        frames::ack(),
        frames::next_with_errors("Review rejected"),
        frames::next(&review(2)),
    ]);
    let mut operation = client(&transport)
        .subscription::<ReviewAdded>()
        .unwrap()
        .subscribe()
        .unwrap();

    let error = operation.next().await.unwrap().unwrap_err();
    assert_eq!(error.graphql_errors()[0].message, "Review rejected");
    assert_eq!(stars(operation.next().await), 2);
}

#[tokio::test]
async fn test_ping_answered_with_pong() {
    let transport = MockSubscriptionTransport::new().with_session([
        frames::ack(),
        frames::ping(),
        frames::next(&review(5)),
    ]);
    let mut operation = client(&transport)
        .subscription::<ReviewAdded>()
        .unwrap()
        .subscribe()
        .unwrap();

    assert_eq!(stars(operation.next().await), 5);
    assert_eq!(
        transport.connections()[0].sent_types(),
        vec!["connection_init", "subscribe", "pong"]
    );
}

#[tokio::test]
async fn test_authorization_and_headers() {
    let mut config = ClientConfig::new("http://localhost:4000/graphql");
    config.authorization = Some(AuthorizationConfig::new("abc"));
    config
        .headers
        .insert("X-Client".to_string(), "tests".to_string());
    let transport =
        MockSubscriptionTransport::new().with_session([frames::ack(), frames::next(&review(1))]);
    let client = GraphQLClient::from_config(config).with_subscription_transport(transport.clone());

    let mut operation = client
        .subscription::<ReviewAdded>()
        .unwrap()
        .with_header("X-Trace", "7")
        .subscribe()
        .unwrap();
    assert_eq!(stars(operation.next().await), 1);

    let connection = &transport.connections()[0];
    assert_eq!(connection.url, "ws://localhost:4000/graphql");
    assert_eq!(
        connection.headers,
        vec![
            ("X-Client".to_string(), "tests".to_string()),
            ("X-Trace".to_string(), "7".to_string()),
        ]
    );
    assert_eq!(
        connection.sent_frames()[0],
        json!({"type": "connection_init", "payload": {"Authorization": "Bearer abc"}})
    );
}

#[tokio::test]
async fn test_missing_argument_fails_before_connecting() {
    let transport = MockSubscriptionTransport::new();
    let result = client(&transport)
        .subscription::<ReviewAdded>()
        .unwrap()
        .with_argument("unknown", 1)
        .subscribe();

    assert!(matches!(result, Err(ClientError::Query(_))));
    assert!(transport.connections().is_empty());
}

// ============================================================================
// Controls before the operation is active
// ============================================================================

async fn wait_for_state(operation: &SubscriptionOperation<ReviewAdded>, state: SubscriptionState) {
    let mut changes = operation.state_changes();
    tokio::time::timeout(Duration::from_secs(2), changes.wait_for(|current| *current == state))
        .await
        .expect("state not reached")
        .unwrap();
}

#[tokio::test]
async fn test_shutdown_while_waiting_for_ack() {
    let transport = MockSubscriptionTransport::new().with_session(Vec::new());
    let operation = client(&transport)
        .subscription::<ReviewAdded>()
        .unwrap()
        .subscribe()
        .unwrap();
    wait_for_state(&operation, SubscriptionState::Initializing).await;
    let changes = operation.state_changes();

    tokio::time::timeout(Duration::from_secs(2), operation.shutdown())
        .await
        .expect("shutdown hung while waiting for connection_ack");

    assert_eq!(*changes.borrow(), SubscriptionState::Stopped);
    let connection = &transport.connections()[0];
    assert!(connection.is_closed());
    assert_eq!(connection.sent_types(), vec!["connection_init"]);
}

#[tokio::test]
async fn test_reconnect_while_waiting_for_ack() {
    let transport = MockSubscriptionTransport::new()
        .with_session(Vec::new())
        .with_session([frames::ack(), frames::next(&review(1))]);
    let mut operation = client(&transport)
        .subscription::<ReviewAdded>()
        .unwrap()
        .subscribe()
        .unwrap();
    wait_for_state(&operation, SubscriptionState::Initializing).await;

    operation.reconnect();
    assert_eq!(stars(operation.next().await), 1);

    let connections = transport.connections();
    assert_eq!(connections.len(), 2);
    assert!(connections[0].is_closed());
    assert_eq!(connections[0].sent_types(), vec!["connection_init"]);
}

#[tokio::test]
async fn test_dropping_operation_before_ack_closes_connection() {
    let transport = MockSubscriptionTransport::new().with_session(Vec::new());
    let operation = client(&transport)
        .subscription::<ReviewAdded>()
        .unwrap()
        .subscribe()
        .unwrap();
    wait_for_state(&operation, SubscriptionState::Initializing).await;
    let mut changes = operation.state_changes();

    drop(operation);
    let state = *tokio::time::timeout(
        Duration::from_secs(2),
        changes.wait_for(|state| state.is_terminal()),
    )
    .await
    .expect("operation kept waiting for connection_ack")
    .unwrap();

    assert_eq!(state, SubscriptionState::Stopped);
    assert!(transport.connections()[0].is_closed());
}
