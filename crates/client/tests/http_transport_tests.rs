//! `HttpTransport` against a local mock server.

use graphql_client_config::{ClientConfig, RequestMethod};
use graphql_test_utils::fixtures::{introspection_body, HeroQuery};
use graphql_typed_client::{
    GraphQLClient, HttpExecutor, HttpTransport, TransportError, TransportRequest,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Request encoding
// ============================================================================

#[tokio::test]
async fn test_post_sends_json_envelope() {
    let server = MockServer::start().await;
    let envelope = json!({"query": "{hero{name}}"});
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("content-type", "application/json"))
        .and(body_json(&envelope))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":{}}"#))
        .expect(1)
        .mount(&server)
        .await;

    let request = TransportRequest::new(format!("{}/graphql", server.uri()), envelope);
    let response = HttpTransport::new().execute(request).await.unwrap();

    assert!(response.is_success());
    assert_eq!(response.body, r#"{"data":{}}"#);
}

#[tokio::test]
async fn test_get_encodes_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/graphql"))
        .and(query_param("query", "query($id:ID){node(id:$id){id}}"))
        .and(query_param("variables", r#"{"id":"1"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let request = TransportRequest::new(
        format!("{}/graphql", server.uri()),
        json!({"query": "query($id:ID){node(id:$id){id}}", "variables": {"id": "1"}}),
    )
    .with_method(RequestMethod::Get);
    let response = HttpTransport::new().execute(request).await.unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_transport_and_request_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-api-key", "key"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-request-id", "42"))
        .expect(1)
        .mount(&server)
        .await;

    let request = TransportRequest::new(server.uri(), json!({"query": "{a}"}))
        .with_header("Authorization", "Bearer abc");
    let response = HttpTransport::new()
        .with_header("X-API-Key", "key")
        .execute(request)
        .await
        .unwrap();

    assert!(response
        .headers
        .iter()
        .any(|(name, value)| name == "x-request-id" && value == "42"));
}

// ============================================================================
// Status handling and retries
// ============================================================================

#[tokio::test]
async fn test_client_error_returned_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let request = TransportRequest::new(server.uri(), json!({"query": "{a}"}));
    let response = HttpTransport::new()
        .with_retries(2)
        .execute(request)
        .await
        .unwrap();

    assert_eq!(response.status, 400);
    assert_eq!(response.body, "bad request");
}

#[tokio::test]
async fn test_server_error_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":null}"#))
        .expect(1)
        .mount(&server)
        .await;

    let request = TransportRequest::new(server.uri(), json!({"query": "{a}"}));
    let response = HttpTransport::new()
        .with_retries(1)
        .execute(request)
        .await
        .unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_final_server_error_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream"))
        .expect(1)
        .mount(&server)
        .await;

    let request = TransportRequest::new(server.uri(), json!({"query": "{a}"}));
    let response = HttpTransport::new().execute(request).await.unwrap();

    assert_eq!(response.status, 502);
    assert_eq!(response.body, "upstream");
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let server = MockServer::start().await;
    let url = server.uri();
    drop(server);

    let request = TransportRequest::new(url, json!({"query": "{a}"}));
    let result = HttpTransport::new().execute(request).await;
    assert!(matches!(result, Err(TransportError::Network(_))));
}

// ============================================================================
// End to end through the client
// ============================================================================

#[tokio::test]
async fn test_client_query_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("x-client", "tests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"hero": {"__typename": "Human", "name": "Luke Skywalker", "height": 1.72}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = ClientConfig::new(format!("{}/graphql", server.uri()));
    config
        .headers
        .insert("X-Client".to_string(), "tests".to_string());
    let client = GraphQLClient::from_config(config);

    let response = client
        .query::<HeroQuery>()
        .unwrap()
        .with_argument("episode", "EMPIRE")
        .execute()
        .await
        .unwrap();
    let hero = response.into_data().and_then(|query| query.hero).unwrap();
    assert_eq!(hero.name(), "Luke Skywalker");

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = received[0].body_json().unwrap();
    assert!(body["query"]
        .as_str()
        .unwrap()
        .starts_with("query($episode:Episode){hero(episode:$episode){"));
    assert_eq!(body["variables"], json!({"episode": "EMPIRE"}));
}

#[tokio::test]
async fn test_client_fetches_schema_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(introspection_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = GraphQLClient::new(server.uri());
    let schema = client.fetch_schema().await.unwrap();
    assert!(schema.find_type("Character").is_some());

    // Served from the cache.
    client.fetch_schema().await.unwrap();
}
