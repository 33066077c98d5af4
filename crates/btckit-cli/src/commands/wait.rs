//! `btckit wait-ready` and `btckit wait-block` — bounded waits on the node.
//!
//! Ctrl+C cancels the wait cooperatively; timeout and cancellation exit
//! with a nonzero code instead of an error trace.

use std::time::Duration;

use tokio::sync::watch;
use tracing::warn;

use btckit_core::RpcConfig;
use btckit_rpc::{HeightPoller, NodeClient, ReadinessPoller, WaitOutcome};

pub async fn run_ready(
    config: &RpcConfig,
    timeout_secs: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = NodeClient::new(config)?;
    let outcome = ReadinessPoller::new(&client, Duration::from_secs(timeout_secs))
        .with_cancel(ctrl_c_signal())
        .run()
        .await?;
    report(outcome, "Node is ready")
}

pub async fn run_block(
    config: &RpcConfig,
    height: u64,
    timeout_secs: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = NodeClient::new(config)?;
    let outcome = HeightPoller::new(&client, height, Duration::from_secs(timeout_secs))
        .with_cancel(ctrl_c_signal())
        .run()
        .await?;
    report(outcome, &format!("Node reached height {height}"))
}

/// A watch channel that flips to `true` on Ctrl+C.
fn ctrl_c_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(true);
        } else {
            warn!("could not listen for Ctrl+C");
        }
    });
    rx
}

fn report(outcome: WaitOutcome, success: &str) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        WaitOutcome::Ready => {
            println!("{success}");
            Ok(())
        }
        WaitOutcome::TimedOut => {
            println!("Timed out");
            std::process::exit(1);
        }
        WaitOutcome::Cancelled => {
            println!("Cancelled");
            std::process::exit(130);
        }
    }
}
