//! Relay round-trip tests against a stub node.
//!
//! Each test spins up a small axum server playing the node, points the relay
//! at it, and drives the relay router directly with `tower::oneshot`.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use btckit_core::{Network, RpcConfig};
use btckit_proxy::{build_router, AppState};

/// One request the stub node observed.
#[derive(Debug, Clone)]
struct SeenRequest {
    body: String,
    authorization: Option<String>,
}

#[derive(Clone)]
struct StubState {
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    reply: Arc<dyn Fn() -> Response + Send + Sync>,
}

async fn stub_handler(State(state): State<StubState>, headers: HeaderMap, body: String) -> Response {
    state.seen.lock().unwrap().push(SeenRequest {
        body,
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });
    (state.reply)()
}

/// Start a stub node on an ephemeral port; returns its address and the
/// requests it has seen.
async fn start_stub_node(
    reply: impl Fn() -> Response + Send + Sync + 'static,
) -> (SocketAddr, Arc<Mutex<Vec<SeenRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        seen: seen.clone(),
        reply: Arc::new(reply),
    };
    let router = Router::new().route("/", post(stub_handler)).with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, seen)
}

fn relay_router(addr: SocketAddr, credentials: Option<(&str, &str)>) -> Router {
    let mut node = RpcConfig::new(format!("http://{addr}/"), Network::Regtest);
    if let Some((user, password)) = credentials {
        node = node.with_credentials(user, password);
    }
    build_router(AppState::new(&node).unwrap())
}

async fn get_status(router: Router) -> Response {
    router
        .oneshot(
            Request::builder()
                .uri("/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

const STATUS_REPLY: &str =
    r#"{"result":{"chain":"regtest","blocks":101},"error":null,"id":1}"#;

#[tokio::test]
async fn forwards_reply_bytes_unaltered() {
    let (addr, seen) = start_stub_node(|| {
        ([(CONTENT_TYPE, "application/json")], STATUS_REPLY).into_response()
    })
    .await;

    let response = get_status(relay_router(addr, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), STATUS_REPLY.as_bytes());

    // Exactly one downstream call, carrying the fixed status command.
    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["method"], "getblockchaininfo");
    assert_eq!(body["params"], serde_json::json!([]));
}

#[tokio::test]
async fn attaches_basic_auth_when_configured() {
    let (addr, seen) = start_stub_node(|| STATUS_REPLY.into_response()).await;

    let response = get_status(relay_router(addr, Some(("user", "pass")))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let requests = seen.lock().unwrap().clone();
    // base64("user:pass")
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Basic dXNlcjpwYXNz")
    );
}

#[tokio::test]
async fn redirects_are_forwarded_not_followed() {
    let (addr, seen) = start_stub_node(|| {
        (
            StatusCode::FOUND,
            [(LOCATION, "http://example.invalid/elsewhere")],
            "",
        )
            .into_response()
    })
    .await;

    let response = get_status(relay_router(addr, None)).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    // Had the relay followed the redirect it would have either errored or
    // issued a second request; it must do neither.
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unreachable_node_maps_to_bad_gateway() {
    // Nothing is listening on this port.
    let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();
    let response = get_status(relay_router(addr, None)).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn serves_concurrent_inbound_requests() {
    let (addr, seen) = start_stub_node(|| STATUS_REPLY.into_response()).await;
    let router = relay_router(addr, None);

    let (a, b, c) = tokio::join!(
        get_status(router.clone()),
        get_status(router.clone()),
        get_status(router)
    );
    for response in [a, b, c] {
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(seen.lock().unwrap().len(), 3);
}
