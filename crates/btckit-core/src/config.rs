//! RPC endpoint configuration.
//!
//! A plain data holder naming the node endpoint, its network and optional
//! basic-auth credentials. Loading (flags, env) is the caller's concern.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::network::Network;

/// Connection coordinates for a node's JSON-RPC endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Endpoint URL, e.g. `http://127.0.0.1:18443/`.
    pub url: String,
    /// Network the node is expected to be on.
    pub network: Network,
    /// Basic-auth user name, if the node requires one.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
}

impl RpcConfig {
    /// Config for a node at `url` on `network`, without credentials.
    pub fn new(url: impl Into<String>, network: Network) -> Self {
        Self {
            url: url.into(),
            network,
            username: None,
            password: None,
        }
    }

    /// Config for a node on the default local port of `network`.
    pub fn localhost(network: Network) -> Self {
        Self::new(
            format!("http://127.0.0.1:{}/", network.default_rpc_port()),
            network,
        )
    }

    /// Attach basic-auth credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

impl fmt::Debug for RpcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcConfig")
            .field("url", &self.url)
            .field("network", &self.network)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
