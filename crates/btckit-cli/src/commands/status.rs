//! `btckit status` — print the node's chain state.

use btckit_core::RpcConfig;
use btckit_rpc::NodeClient;

pub async fn run(config: &RpcConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = NodeClient::new(config)?;
    let info = client.get_blockchain_info().await?;
    let network = client.get_network_info().await?;

    println!("Chain: {}", info.chain);
    println!("Blocks: {}", info.blocks);
    println!("Best block: {}", info.bestblockhash);
    println!("Difficulty: {}", info.difficulty);
    if let Some(progress) = info.verificationprogress {
        println!("Verification progress: {progress:.4}");
    }
    println!("Node version: {} ({})", network.version, network.subversion);
    if let Some(connections) = network.connections {
        println!("Connections: {connections}");
    }

    Ok(())
}
