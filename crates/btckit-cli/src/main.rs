//! # btckit CLI
//!
//! Entry point for the `btckit` binary.
//!
//! Subcommands:
//! - `btckit status`     — Print the node's chain state
//! - `btckit wait-ready` — Block until the node answers RPC
//! - `btckit wait-block` — Block until the chain reaches a height
//! - `btckit balance`    — Print the wallet balance
//! - `btckit proxy`      — Run the streaming status proxy

use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};

use btckit_core::{Network, RpcConfig};

mod commands;
mod logging;

/// btckit — typed RPC tooling for Bitcoin Core nodes.
#[derive(Parser)]
#[command(name = "btckit", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Node endpoint flags shared by every subcommand.
#[derive(Args)]
struct NodeArgs {
    /// Node RPC endpoint URL (default: the network's local port).
    #[arg(long, env = "BTCKIT_RPC_URL")]
    url: Option<String>,

    /// Network the node is expected to be on.
    #[arg(long, env = "BTCKIT_NETWORK", default_value = "regtest")]
    network: Network,

    /// RPC user name (or set BTCKIT_RPC_USER).
    #[arg(long, env = "BTCKIT_RPC_USER")]
    rpcuser: Option<String>,

    /// RPC password (or set BTCKIT_RPC_PASSWORD).
    #[arg(long, env = "BTCKIT_RPC_PASSWORD")]
    rpcpassword: Option<String>,
}

impl NodeArgs {
    fn to_config(&self) -> RpcConfig {
        let mut config = match &self.url {
            Some(url) => RpcConfig::new(url.clone(), self.network),
            None => RpcConfig::localhost(self.network),
        };
        if let Some(user) = &self.rpcuser {
            config = config.with_credentials(
                user.clone(),
                self.rpcpassword.clone().unwrap_or_default(),
            );
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the node's chain state.
    Status {
        #[command(flatten)]
        node: NodeArgs,
    },

    /// Block until the node answers RPC (absorbing startup errors).
    WaitReady {
        #[command(flatten)]
        node: NodeArgs,

        /// Give up after this many seconds.
        #[arg(long, default_value_t = 60)]
        timeout: u64,
    },

    /// Block until the chain reaches a height.
    WaitBlock {
        #[command(flatten)]
        node: NodeArgs,

        /// Height to wait for.
        #[arg(long)]
        height: u64,

        /// Give up after this many seconds.
        #[arg(long, default_value_t = 600)]
        timeout: u64,
    },

    /// Print the wallet balance.
    Balance {
        #[command(flatten)]
        node: NodeArgs,

        /// Wallet account to query.
        #[arg(long)]
        account: Option<String>,

        /// Only count outputs with at least this many confirmations.
        #[arg(long)]
        min_conf: Option<u32>,
    },

    /// Run the streaming status proxy in front of the node.
    Proxy {
        #[command(flatten)]
        node: NodeArgs,

        /// Address the proxy listens on.
        #[arg(long, default_value = btckit_proxy::server::DEFAULT_LISTEN_ADDR)]
        listen: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init("info")?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Status { node } => commands::status::run(&node.to_config()).await,
        Commands::WaitReady { node, timeout } => {
            commands::wait::run_ready(&node.to_config(), timeout).await
        }
        Commands::WaitBlock {
            node,
            height,
            timeout,
        } => commands::wait::run_block(&node.to_config(), height, timeout).await,
        Commands::Balance {
            node,
            account,
            min_conf,
        } => commands::balance::run(&node.to_config(), account.as_deref(), min_conf).await,
        Commands::Proxy { node, listen } => {
            commands::proxy::run(node.to_config(), listen).await
        }
    }
}
