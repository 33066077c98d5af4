//! Relay route definitions.

use axum::routing::get;
use axum::Router;

use crate::handlers::chain_status;
use crate::server::AppState;

/// Builds the axum router for the relay.
///
/// Routes:
/// - `GET /status` — relay one `getblockchaininfo` call and stream the reply
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(chain_status))
        .with_state(state)
}
