//! Relay handlers.
//!
//! Each inbound request builds one fixed command invocation, posts it
//! downstream and pipes the reply body back chunk by chunk. The envelope is
//! never decoded here; backpressure falls out of only pulling upstream
//! chunks as the inbound caller consumes them.

use axum::body::Body;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::Response;
use tracing::debug;

use btckit_rpc::envelope::JsonRpcRequest;

use crate::server::{AppState, ProxyError};

/// Handle `GET /status`: relay a `getblockchaininfo` call.
pub async fn chain_status(State(state): State<AppState>) -> Result<Response, ProxyError> {
    let request = JsonRpcRequest::new(1, "getblockchaininfo", vec![]);
    let body = serde_json::to_string(&request)?;

    let mut outbound = state
        .http
        .post(&state.node_url)
        .header(CONTENT_TYPE, "application/json")
        .body(body);
    if let Some((user, password)) = &state.credentials {
        outbound = outbound.basic_auth(user, Some(password));
    }

    let upstream = outbound.send().await?;
    debug!("relaying node status reply ({})", upstream.status());

    let mut response = Response::builder().status(upstream.status());
    if let Some(content_type) = upstream.headers().get(CONTENT_TYPE) {
        response = response.header(CONTENT_TYPE, content_type.clone());
    }
    Ok(response.body(Body::from_stream(upstream.bytes_stream()))?)
}
