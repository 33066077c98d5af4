//! `btckit balance` — print the wallet balance.

use btckit_core::RpcConfig;
use btckit_rpc::NodeClient;

pub async fn run(
    config: &RpcConfig,
    account: Option<&str>,
    min_conf: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = NodeClient::new(config)?;
    let balance = client.get_balance(account, min_conf).await?;
    let unconfirmed = client.get_unconfirmed_balance().await?;

    println!("Balance: {balance} BTC");
    if unconfirmed.to_sat() != 0 {
        println!("Unconfirmed: {unconfirmed} BTC");
    }

    Ok(())
}
