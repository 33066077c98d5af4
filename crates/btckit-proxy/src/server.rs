//! Proxy configuration, shared state and startup.

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, info};

use btckit_core::RpcConfig;

use crate::routes::build_router;

/// Default bind address for the proxy.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:9330";

/// Errors from the proxy.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("request serialization failed: {0}")]
    Request(#[from] serde_json::Error),
    #[error("response assembly failed: {0}")]
    Response(#[from] axum::http::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error!("proxy request failed: {}", self);
        let status = match &self {
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Proxy settings: where to listen and which node to relay to.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Address the proxy listens on.
    pub listen: SocketAddr,
    /// The downstream node endpoint and credentials.
    pub node: RpcConfig,
}

/// Shared state available to every relay handler.
#[derive(Clone)]
pub struct AppState {
    /// Outbound HTTP client; redirect-following is disabled so the relay
    /// forwards exactly what the node answers.
    pub http: reqwest::Client,
    /// Downstream node endpoint.
    pub node_url: String,
    /// Basic-auth credentials for the downstream call, if configured.
    pub credentials: Option<(String, String)>,
}

impl AppState {
    /// Build relay state for the given node.
    pub fn new(node: &RpcConfig) -> Result<Self, ProxyError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        let credentials = node.username.as_ref().map(|user| {
            (
                user.clone(),
                node.password.clone().unwrap_or_default(),
            )
        });
        Ok(Self {
            http,
            node_url: node.url.clone(),
            credentials,
        })
    }
}

/// Bind and run the proxy until the listener fails.
pub async fn serve(config: ProxyConfig) -> Result<(), ProxyError> {
    let state = AppState::new(&config.node)?;
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!(
        "status proxy listening on {}, relaying to {}",
        listener.local_addr()?,
        config.node.url
    );
    axum::serve(listener, router).await?;
    Ok(())
}
