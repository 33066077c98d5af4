//! Network-scoped base58check addresses.
//!
//! An [`Address`] always knows which [`Network`] it belongs to. Decoding
//! requires the caller to name the expected network and fails with
//! [`AddressError::NetworkMismatch`] when the version byte belongs to a
//! different one — an address is never silently reinterpreted.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::network::Network;

/// The script template an address pays to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddressKind {
    /// Pay-to-pubkey-hash
    P2pkh,
    /// Pay-to-script-hash
    P2sh,
}

/// Errors from address decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid base58check encoding: {0}")]
    BadEncoding(String),
    #[error("invalid address payload length: expected 21 bytes, got {0}")]
    BadLength(usize),
    #[error("unknown address version byte: {0:#04x}")]
    UnknownVersion(u8),
    #[error("address belongs to {found}, expected {expected}")]
    NetworkMismatch { expected: Network, found: Network },
}

/// A base58check-encoded address bound to a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    network: Network,
    kind: AddressKind,
    hash: [u8; 20],
}

impl Address {
    /// Build an address from a 20-byte hash.
    pub const fn new(network: Network, kind: AddressKind, hash: [u8; 20]) -> Self {
        Self { network, kind, hash }
    }

    /// Decode a base58check string, validating it against `expected`.
    ///
    /// Testnet and regtest share version bytes, so either accepts the
    /// other's encoding; mainnet is always distinct.
    pub fn from_base58(s: &str, expected: Network) -> Result<Self, AddressError> {
        let payload = bs58::decode(s)
            .with_check(None)
            .into_vec()
            .map_err(|e| AddressError::BadEncoding(e.to_string()))?;
        let (&version, hash) = payload
            .split_first()
            .ok_or(AddressError::BadLength(0))?;
        let hash: [u8; 20] = hash
            .try_into()
            .map_err(|_| AddressError::BadLength(payload.len()))?;

        let (found, kind) = match version {
            0x00 => (Network::Mainnet, AddressKind::P2pkh),
            0x05 => (Network::Mainnet, AddressKind::P2sh),
            0x6f => (Network::Testnet, AddressKind::P2pkh),
            0xc4 => (Network::Testnet, AddressKind::P2sh),
            other => return Err(AddressError::UnknownVersion(other)),
        };
        if !expected.base58_matches(found) {
            return Err(AddressError::NetworkMismatch { expected, found });
        }

        Ok(Self {
            network: expected,
            kind,
            hash,
        })
    }

    /// The owning network.
    pub const fn network(&self) -> Network {
        self.network
    }

    /// The script template this address pays to.
    pub const fn kind(&self) -> AddressKind {
        self.kind
    }

    /// The 20-byte hash payload.
    pub const fn hash160(&self) -> &[u8; 20] {
        &self.hash
    }

    fn version_byte(&self) -> u8 {
        match self.kind {
            AddressKind::P2pkh => self.network.p2pkh_version(),
            AddressKind::P2sh => self.network.p2sh_version(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut payload = [0u8; 21];
        payload[0] = self.version_byte();
        payload[1..].copy_from_slice(&self.hash);
        f.write_str(&bs58::encode(payload).with_check().into_string())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
