//! Supported Bitcoin networks.
//!
//! Each network carries the address version bytes and default RPC port a
//! session needs to validate wire data against the node it is bound to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Networks a node session can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Network {
    /// Bitcoin mainnet
    Mainnet,
    /// Public test network
    Testnet,
    /// Local regression-test network
    Regtest,
}

/// Error returned when parsing an unknown network name.
#[derive(Debug, Error)]
#[error("unknown network: {0:?} (expected mainnet, testnet or regtest)")]
pub struct UnknownNetwork(pub String);

impl Network {
    /// All supported networks.
    pub const ALL: [Network; 3] = [Self::Mainnet, Self::Testnet, Self::Regtest];

    /// Canonical lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Regtest => "regtest",
        }
    }

    /// Base58 version byte for pay-to-pubkey-hash addresses.
    pub const fn p2pkh_version(self) -> u8 {
        match self {
            Self::Mainnet => 0x00,
            // Testnet and regtest share address version bytes.
            Self::Testnet | Self::Regtest => 0x6f,
        }
    }

    /// Base58 version byte for pay-to-script-hash addresses.
    pub const fn p2sh_version(self) -> u8 {
        match self {
            Self::Mainnet => 0x05,
            Self::Testnet | Self::Regtest => 0xc4,
        }
    }

    /// Default JSON-RPC port of a node on this network.
    pub const fn default_rpc_port(self) -> u16 {
        match self {
            Self::Mainnet => 8332,
            Self::Testnet => 18332,
            Self::Regtest => 18443,
        }
    }

    /// Whether `other` encodes addresses with the same version bytes.
    ///
    /// Testnet and regtest are indistinguishable on the wire; mainnet never
    /// matches either.
    pub const fn base58_matches(self, other: Network) -> bool {
        self.p2pkh_version() == other.p2pkh_version()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" | "bitcoin" => Ok(Self::Mainnet),
            "testnet" | "test" => Ok(Self::Testnet),
            "regtest" => Ok(Self::Regtest),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}

impl Serialize for Network {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
