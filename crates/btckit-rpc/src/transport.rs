//! Request/response transport.
//!
//! The [`Transport`] trait is the seam between the dispatcher and the
//! network: one serialized request body in, one complete response body out,
//! or a classified [`TransportError`]. The production implementation posts
//! over HTTP with basic auth and redirect-following disabled.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use url::Url;

use btckit_core::RpcConfig;

use crate::error::{TransportError, TransportKind};

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers one serialized request and returns the complete response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_request(&self, body: String) -> Result<String, TransportError>;
}

/// HTTP transport for a node's JSON-RPC endpoint.
#[derive(Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    url: Url,
    credentials: Option<(String, String)>,
}

impl HttpTransport {
    /// Build a transport for the configured endpoint.
    pub fn new(config: &RpcConfig) -> Result<Self, TransportError> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    /// Build a transport with a custom per-request deadline.
    pub fn with_timeout(config: &RpcConfig, timeout: Duration) -> Result<Self, TransportError> {
        let url = Url::parse(&config.url)
            .map_err(|e| TransportError::new(TransportKind::Other, format!("invalid url: {e}")))?;
        let http = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::new(TransportKind::Other, e.to_string()))?;
        let credentials = match (&config.username, &config.password) {
            (Some(user), password) => Some((user.clone(), password.clone().unwrap_or_default())),
            _ => None,
        };
        Ok(Self {
            http,
            url,
            credentials,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_request(&self, body: String) -> Result<String, TransportError> {
        let mut request = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }

        let response = request.send().await.map_err(classify)?;
        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        // The node reports application errors as HTTP 500 with a JSON-RPC
        // error envelope in the body; those pass through for the dispatcher
        // to classify. Only a non-success status with an empty body is a
        // transport-level failure (e.g. 401 from the HTTP layer itself).
        if body.is_empty() && !status.is_success() {
            return Err(TransportError::new(
                TransportKind::Other,
                format!("HTTP status {status}"),
            ));
        }
        Ok(body)
    }
}

/// Map a reqwest error onto a semantic transport category.
fn classify(err: reqwest::Error) -> TransportError {
    let kind = if err.is_timeout() {
        TransportKind::Timeout
    } else {
        match io_error_kind(&err) {
            Some(io::ErrorKind::ConnectionRefused) => TransportKind::ConnectionRefused,
            Some(
                io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe,
            ) => TransportKind::ConnectionReset,
            Some(io::ErrorKind::UnexpectedEof) => TransportKind::UnexpectedEof,
            Some(io::ErrorKind::TimedOut) => TransportKind::Timeout,
            _ => TransportKind::Other,
        }
    };
    TransportError::new(kind, err.to_string())
}

/// Walk the source chain looking for the underlying `io::Error`.
fn io_error_kind(err: &reqwest::Error) -> Option<io::ErrorKind> {
    let mut source: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(err);
    while let Some(inner) = source {
        if let Some(io_err) = inner.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = inner.source();
    }
    None
}
