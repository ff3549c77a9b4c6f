//! HTTP-level tests for the gateway's refresh-and-retry contract.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dify_console::models::EmptyResponse;
use dify_console::{ApiError, ApiGateway, SessionStore};

fn authed_store(host: &str) -> Arc<SessionStore> {
    let store = SessionStore::in_memory(host);
    store.save_credential_pair("T1", "R1");
    Arc::new(store)
}

fn gateway(store: &Arc<SessionStore>) -> ApiGateway {
    ApiGateway::new(Arc::clone(store)).unwrap()
}

/// Mock for the refresh endpoint answering with a fresh T2/R2 pair
fn refresh_success() -> Mock {
    Mock::given(method("POST"))
        .and(path("/console/api/refresh-token"))
        .and(body_json(json!({ "refresh_token": "R1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "data": { "access_token": "T2", "refresh_token": "R2" }
        })))
}

#[tokio::test]
async fn healthy_request_never_triggers_refresh() {
    let server = MockServer::start().await;
    let store = authed_store(&server.uri());

    Mock::given(method("GET"))
        .and(path("/console/api/apps"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/console/api/refresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result: serde_json::Value = gateway(&store).get("/console/api/apps").await.unwrap();
    assert_eq!(result, json!({"ok": true}));
}

#[tokio::test]
async fn unauthenticated_fast_fail_makes_no_network_call() {
    let server = MockServer::start().await;
    let store = Arc::new(SessionStore::in_memory(server.uri()));

    let result: Result<EmptyResponse, _> = gateway(&store).get("/console/api/apps").await;
    assert!(matches!(result, Err(ApiError::Unauthenticated)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn retry_once_with_refreshed_token() {
    let server = MockServer::start().await;
    let store = authed_store(&server.uri());

    Mock::given(method("GET"))
        .and(path("/console/api/apps"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/console/api/apps"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;
    refresh_success().expect(1).mount(&server).await;

    let result: serde_json::Value = gateway(&store).get("/console/api/apps").await.unwrap();
    assert_eq!(result, json!({"data": []}));

    // Both stored tokens come from the refresh response, replaced together
    let pair = store.credential_pair().unwrap();
    assert_eq!(pair.access_token, "T2");
    assert_eq!(pair.refresh_token, "R2");
}

#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let server = MockServer::start().await;
    let store = authed_store(&server.uri());

    Mock::given(method("GET"))
        .and(path("/console/api/apps"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/console/api/apps"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(2)
        .mount(&server)
        .await;
    // Delay keeps the cycle in flight long enough for the second caller to
    // join it instead of starting its own. The expect(1) is the single-flight
    // assertion, verified when the server is dropped.
    Mock::given(method("POST"))
        .and(path("/console/api/refresh-token"))
        .and(body_json(json!({ "refresh_token": "R1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_json(json!({
                    "result": "success",
                    "data": { "access_token": "T2", "refresh_token": "R2" }
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway(&store);
    let (a, b) = futures::future::join(
        gw.get::<serde_json::Value>("/console/api/apps"),
        gw.get::<serde_json::Value>("/console/api/apps"),
    )
    .await;

    assert_eq!(a.unwrap(), json!({"ok": true}));
    assert_eq!(b.unwrap(), json!({"ok": true}));
}

#[tokio::test]
async fn second_unauthorized_fails_without_third_attempt() {
    let server = MockServer::start().await;
    let store = authed_store(&server.uri());

    // Token rejected no matter what the gateway presents
    Mock::given(method("GET"))
        .and(path("/console/api/apps"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    refresh_success().expect(1).mount(&server).await;

    let result: Result<EmptyResponse, _> = gateway(&store).get("/console/api/apps").await;
    assert!(matches!(
        result,
        Err(ApiError::RequestFailed { status: 401 })
    ));
}

#[tokio::test]
async fn refresh_failure_surfaces_session_expired() {
    let server = MockServer::start().await;
    let store = authed_store(&server.uri());

    Mock::given(method("POST"))
        .and(path("/console/api/apps/app1/api-keys"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/console/api/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "error",
            "message": "invalid refresh token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result: Result<EmptyResponse, _> = gateway(&store)
        .post("/console/api/apps/app1/api-keys", &json!({}))
        .await;
    assert!(matches!(result, Err(ApiError::SessionExpired)));

    // Clearing stored credentials is the session layer's call, not the
    // gateway's
    let pair = store.credential_pair().unwrap();
    assert_eq!(pair.access_token, "T1");
    assert_eq!(pair.refresh_token, "R1");
}

#[tokio::test]
async fn refresh_failure_fails_every_waiter() {
    let server = MockServer::start().await;
    let store = authed_store(&server.uri());

    Mock::given(method("GET"))
        .and(path("/console/api/apps"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/console/api/refresh-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_json(json!({ "result": "error", "message": "revoked" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway(&store);
    let (a, b, c) = futures::future::join3(
        gw.get::<EmptyResponse>("/console/api/apps"),
        gw.get::<EmptyResponse>("/console/api/apps"),
        gw.get::<EmptyResponse>("/console/api/apps"),
    )
    .await;

    assert!(matches!(a, Err(ApiError::SessionExpired)));
    assert!(matches!(b, Err(ApiError::SessionExpired)));
    assert!(matches!(c, Err(ApiError::SessionExpired)));
}

#[tokio::test]
async fn stalled_refresh_times_out_and_fails_every_waiter() {
    let server = MockServer::start().await;
    let store = authed_store(&server.uri());

    Mock::given(method("GET"))
        .and(path("/console/api/apps"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    // The refresh endpoint answers far later than the configured bound
    Mock::given(method("POST"))
        .and(path("/console/api/refresh-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(30))
                .set_body_json(json!({
                    "result": "success",
                    "data": { "access_token": "T2", "refresh_token": "R2" }
                })),
        )
        .mount(&server)
        .await;

    let gw = gateway(&store).with_refresh_timeout(Duration::from_millis(100));
    let (a, b) = futures::future::join(
        gw.get::<EmptyResponse>("/console/api/apps"),
        gw.get::<EmptyResponse>("/console/api/apps"),
    )
    .await;

    assert!(matches!(a, Err(ApiError::SessionExpired)));
    assert!(matches!(b, Err(ApiError::SessionExpired)));

    // The timed-out cycle must not have touched the stored pair
    let pair = store.credential_pair().unwrap();
    assert_eq!(pair.access_token, "T1");
    assert_eq!(pair.refresh_token, "R1");
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;
    let store = authed_store(&server.uri());

    Mock::given(method("GET"))
        .and(path("/console/api/apps"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/console/api/refresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result: Result<EmptyResponse, _> = gateway(&store).get("/console/api/apps").await;
    assert!(matches!(
        result,
        Err(ApiError::RequestFailed { status: 500 })
    ));
}

#[tokio::test]
async fn empty_body_decodes_as_empty_object() {
    let server = MockServer::start().await;
    let store = authed_store(&server.uri());

    Mock::given(method("DELETE"))
        .and(path("/console/api/apps/app1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let _: EmptyResponse = gateway(&store)
        .delete("/console/api/apps/app1")
        .await
        .unwrap();
}

#[tokio::test]
async fn non_json_content_type_decodes_as_empty_object() {
    let server = MockServer::start().await;
    let store = authed_store(&server.uri());

    Mock::given(method("GET"))
        .and(path("/console/api/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    let result: serde_json::Value = gateway(&store).get("/console/api/ping").await.unwrap();
    assert_eq!(result, json!({}));
}

#[tokio::test]
async fn transport_failure_surfaces_as_network_error() {
    // Nothing listens here; the connection is refused
    let store = authed_store("http://127.0.0.1:1");

    let result: Result<EmptyResponse, _> = gateway(&store).get("/console/api/apps").await;
    assert!(matches!(result, Err(ApiError::Network(_))));
}

#[tokio::test]
async fn bearer_header_attached_on_every_authenticated_call() {
    let server = MockServer::start().await;
    let store = authed_store(&server.uri());

    Mock::given(method("PUT"))
        .and(path("/console/api/apps/app1"))
        .and(header("authorization", "Bearer T1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "name": "renamed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let _: EmptyResponse = gateway(&store)
        .put("/console/api/apps/app1", &json!({ "name": "renamed" }))
        .await
        .unwrap();
}
