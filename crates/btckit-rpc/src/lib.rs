//! # btckit-rpc
//!
//! Typed client for the Bitcoin Core JSON-RPC control protocol: a single
//! dispatch primitive over a pluggable transport, typed operations on top of
//! it, version-gated command selection, and the readiness/height pollers
//! used while a node is starting up or catching up.

pub mod client;
pub mod envelope;
pub mod error;
pub mod poll;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

pub use client::NodeClient;
pub use error::{RpcError, TransportError, TransportKind, RPC_IN_WARMUP};
pub use poll::{HeightPoller, ReadinessPoller, WaitOutcome};
pub use transport::{HttpTransport, Transport};
