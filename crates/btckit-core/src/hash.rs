//! Double-SHA256 content identifiers.
//!
//! Hashes are stored in internal (engine-output) byte order. The RPC wire
//! form is the hex string in display order, which is byte-reversed relative
//! to the internal order; the reversal is applied exactly once when parsing
//! and exactly once when formatting, so `from_hex(to_hex(h)) == h`.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from hash parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HashError {
    #[error("invalid hex in hash: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("invalid hash length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Compute SHA256(SHA256(data)).
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    let once = Sha256::digest(data);
    let twice = Sha256::digest(once);
    twice.into()
}

macro_rules! sha256d_newtype {
    ($(#[$attr:meta])* $name:ident, $expecting:literal) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name([u8; 32]);

        impl $name {
            /// Wrap bytes already in internal order.
            pub const fn from_bytes(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Internal-order bytes.
            pub const fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Hash arbitrary data with double-SHA256.
            pub fn hash(data: &[u8]) -> Self {
                Self(sha256d(data))
            }

            /// Parse the display-order hex wire form.
            pub fn from_hex(s: &str) -> Result<Self, HashError> {
                let decoded = hex::decode(s)?;
                let mut bytes: [u8; 32] = decoded
                    .try_into()
                    .map_err(|v: Vec<u8>| HashError::InvalidLength(v.len()))?;
                bytes.reverse();
                Ok(Self(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut display = self.0;
                display.reverse();
                f.write_str(&hex::encode(display))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self)
            }
        }

        impl FromStr for $name {
            type Err = HashError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                struct HexVisitor;

                impl<'de> Visitor<'de> for HexVisitor {
                    type Value = $name;

                    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                        formatter.write_str($expecting)
                    }

                    fn visit_str<E: de::Error>(self, v: &str) -> Result<$name, E> {
                        $name::from_hex(v).map_err(E::custom)
                    }
                }

                deserializer.deserialize_str(HexVisitor)
            }
        }
    };
}

sha256d_newtype!(
    /// A transaction identifier.
    Txid,
    "a 64 hex char transaction id"
);

sha256d_newtype!(
    /// A block header hash.
    BlockHash,
    "a 64 hex char block hash"
);

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS: &str = "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";

    #[test]
    fn hex_roundtrip_is_identity() {
        let hash = BlockHash::from_hex(GENESIS).unwrap();
        assert_eq!(hash.to_string(), GENESIS);
        assert_eq!(BlockHash::from_hex(&hash.to_string()).unwrap(), hash);
    }

    #[test]
    fn reversal_applied_exactly_once() {
        // Display order ends in ...01, so internal order starts with 0x01.
        let hex = "0000000000000000000000000000000000000000000000000000000000000001";
        let txid = Txid::from_hex(hex).unwrap();
        assert_eq!(txid.as_bytes()[0], 0x01);
        assert_eq!(txid.as_bytes()[31], 0x00);
        assert_eq!(txid.to_string(), hex);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(Txid::from_hex("ab"), Err(HashError::InvalidLength(1))));
        assert!(matches!(
            Txid::from_hex("zz00000000000000000000000000000000000000000000000000000000000000"),
            Err(HashError::InvalidHex(_))
        ));
    }

    #[test]
    fn serde_uses_display_order() {
        let hash = BlockHash::from_hex(GENESIS).unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{GENESIS}\""));
        let back: BlockHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn double_sha256_of_empty_input() {
        // SHA256d("") is a fixed, well-known vector.
        let digest = sha256d(b"");
        assert_eq!(
            hex::encode(digest),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }
}
