//! # btckit-core
//!
//! Domain value types for talking to a Bitcoin Core node: networks, exact
//! monetary amounts, double-SHA256 hashes, base58check addresses and raw
//! transaction decoding. Every type converts to and from its RPC wire form
//! without precision loss.

pub mod address;
pub mod amount;
pub mod config;
pub mod hash;
pub mod network;
pub mod tx;

pub use address::{Address, AddressKind};
pub use amount::Amount;
pub use config::RpcConfig;
pub use hash::{BlockHash, Txid};
pub use network::Network;
pub use tx::Transaction;
