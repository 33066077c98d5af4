//! # btckit-proxy
//!
//! A streaming gateway in front of a node's JSON-RPC interface. Each inbound
//! request triggers one fixed status query downstream, and the node's reply
//! bytes are piped straight back to the caller — no buffering, no envelope
//! decoding, redirects disabled.

pub mod handlers;
pub mod routes;
pub mod server;

pub use routes::build_router;
pub use server::{serve, AppState, ProxyConfig, ProxyError};
