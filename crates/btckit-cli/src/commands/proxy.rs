//! `btckit proxy` — run the streaming status proxy.

use std::net::SocketAddr;

use btckit_core::RpcConfig;
use btckit_proxy::ProxyConfig;

pub async fn run(node: RpcConfig, listen: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    println!("Relaying {} on http://{listen}/status", node.url);
    btckit_proxy::serve(ProxyConfig { listen, node }).await?;
    Ok(())
}
