//! Client error taxonomy.
//!
//! Three failure kinds surface from a dispatch: the transport failed, the
//! node answered with an error envelope, or the response did not match the
//! expected shape. The dispatcher never retries or reclassifies; pollers
//! layer their own handling on top of these.

use thiserror::Error;

/// Status code the node reports while its startup checks are still running.
pub const RPC_IN_WARMUP: i64 = -28;

/// Semantic category of a transport-level failure.
///
/// Categories are derived from the `std::io::ErrorKind` chain rather than
/// platform error strings, so the startup-transient subset stays stable
/// across operating systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// The connection was not accepted.
    ConnectionRefused,
    /// The connection dropped mid-exchange.
    ConnectionReset,
    /// The stream ended before a complete response arrived.
    UnexpectedEof,
    /// The request deadline elapsed.
    Timeout,
    /// Anything else connectivity-related.
    Other,
}

/// A connectivity-level failure from the transport.
#[derive(Debug, Clone, Error)]
#[error("transport failure ({kind:?}): {message}")]
pub struct TransportError {
    pub kind: TransportKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether this failure belongs to the known vocabulary a node emits
    /// while still starting up.
    pub fn is_startup_transient(&self) -> bool {
        matches!(
            self.kind,
            TransportKind::ConnectionRefused
                | TransportKind::ConnectionReset
                | TransportKind::UnexpectedEof
        )
    }
}

/// A classified failure from one command dispatch.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The request never completed at the network level.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The node responded with an explicit error envelope.
    #[error("node returned error {code}: {message}")]
    Status { code: i64, message: String },

    /// The response arrived but did not match the expected shape.
    #[error("response marshalling failed: {0}")]
    Marshalling(String),
}

impl RpcError {
    pub(crate) fn marshalling(err: impl std::fmt::Display) -> Self {
        Self::Marshalling(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_transient_vocabulary() {
        for kind in [
            TransportKind::ConnectionRefused,
            TransportKind::ConnectionReset,
            TransportKind::UnexpectedEof,
        ] {
            assert!(TransportError::new(kind, "x").is_startup_transient());
        }
        assert!(!TransportError::new(TransportKind::Timeout, "x").is_startup_transient());
        assert!(!TransportError::new(TransportKind::Other, "x").is_startup_transient());
    }
}
