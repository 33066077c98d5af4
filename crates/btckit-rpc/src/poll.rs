//! Readiness and height polling.
//!
//! A node that is still loading and verifying its chain state can take
//! minutes to start answering RPC, and during that window it produces a
//! rotating set of benign connection failures. [`ReadinessPoller`] absorbs
//! exactly that known vocabulary — refused/reset connections, streams that
//! end early, and the explicit warm-up status — and nothing else, so real
//! configuration or protocol errors still surface immediately.
//! [`HeightPoller`] waits for a target chain height on a node that is
//! already live, where every failure is fatal.
//!
//! Sleeps go through `tokio::time`, so tests drive both pollers on paused
//! virtual time with no real delay.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::client::NodeClient;
use crate::error::{RpcError, RPC_IN_WARMUP};

/// Pause between poll attempts.
const RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Height progress is logged once per this many iterations.
const PROGRESS_LOG_EVERY: u64 = 10;

/// How a bounded wait ended, short of a fatal error.
///
/// Timeout and cancellation are expected terminal states of a wait, so they
/// are `Ok` values rather than errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The condition was met.
    Ready,
    /// The configured budget elapsed first.
    TimedOut,
    /// An external stop signal was honored.
    Cancelled,
}

impl WaitOutcome {
    /// Whether the wait succeeded.
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Waits until a node starts answering RPC.
pub struct ReadinessPoller<'a> {
    client: &'a NodeClient,
    timeout: Duration,
    interval: Duration,
    cancel: Option<watch::Receiver<bool>>,
}

impl<'a> ReadinessPoller<'a> {
    pub fn new(client: &'a NodeClient, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            interval: RETRY_INTERVAL,
            cancel: None,
        }
    }

    /// Override the pause between attempts.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Attach a cancellation signal, observed between attempts.
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Run until ready, fatal error, timeout or cancellation.
    pub async fn run(mut self) -> Result<WaitOutcome, RpcError> {
        debug!("waiting for node RPC to become ready");
        let deadline = Instant::now() + self.timeout;
        let mut last_status: Option<String> = None;

        loop {
            let status = match self.client.get_block_count().await {
                Ok(height) => {
                    debug!("node RPC ready at height {}", height);
                    return Ok(WaitOutcome::Ready);
                }
                Err(err) => match startup_status(&err) {
                    Some(status) => status,
                    None => return Err(err),
                },
            };

            // Long warm-ups repeat the same status for minutes; log only
            // when the text changes.
            if last_status.as_deref() != Some(status.as_str()) {
                info!("node status: {}", status);
                last_status = Some(status);
            }

            if Instant::now() >= deadline {
                warn!(
                    "node not ready after {:?}; last status: {:?}",
                    self.timeout, last_status
                );
                return Ok(WaitOutcome::TimedOut);
            }
            if sleep_or_cancel(self.interval, &mut self.cancel).await {
                info!("readiness wait cancelled");
                return Ok(WaitOutcome::Cancelled);
            }
        }
    }
}

/// Waits until the chain reaches a target height.
pub struct HeightPoller<'a> {
    client: &'a NodeClient,
    target: u64,
    timeout: Duration,
    interval: Duration,
    cancel: Option<watch::Receiver<bool>>,
}

impl<'a> HeightPoller<'a> {
    pub fn new(client: &'a NodeClient, target: u64, timeout: Duration) -> Self {
        Self {
            client,
            target,
            timeout,
            interval: RETRY_INTERVAL,
            cancel: None,
        }
    }

    /// Override the pause between attempts.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Attach a cancellation signal, observed between attempts.
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Run until the height is reached, any query fails, the budget
    /// elapses or the wait is cancelled.
    ///
    /// Unlike the readiness poller this absorbs no failures: by the time
    /// height-waiting is meaningful the node is live, so every error is
    /// someone else's bug and propagates immediately.
    pub async fn run(mut self) -> Result<WaitOutcome, RpcError> {
        info!("waiting for node to reach height {}", self.target);
        let deadline = Instant::now() + self.timeout;
        let mut iterations = 0u64;

        loop {
            let height = self.client.get_block_count().await?;
            if height >= self.target {
                info!("node is at height {}", height);
                return Ok(WaitOutcome::Ready);
            }
            if iterations % PROGRESS_LOG_EVERY == 0 {
                debug!("node at height {}, waiting for {}", height, self.target);
            }
            iterations += 1;

            if Instant::now() >= deadline {
                warn!("timed out waiting for height {}", self.target);
                return Ok(WaitOutcome::TimedOut);
            }
            if sleep_or_cancel(self.interval, &mut self.cancel).await {
                info!("height wait cancelled");
                return Ok(WaitOutcome::Cancelled);
            }
        }
    }
}

/// The status text to keep polling on, or `None` for a fatal error.
///
/// The transient vocabulary is exactly: transport failures whose semantic
/// kind a starting node produces, and the node's own warm-up status code.
fn startup_status(err: &RpcError) -> Option<String> {
    match err {
        RpcError::Transport(transport) if transport.is_startup_transient() => {
            Some(transport.to_string())
        }
        RpcError::Status { code, message } if *code == RPC_IN_WARMUP => Some(message.clone()),
        _ => None,
    }
}

/// Sleep one interval, returning `true` if cancellation fired first.
async fn sleep_or_cancel(
    interval: Duration,
    cancel: &mut Option<watch::Receiver<bool>>,
) -> bool {
    match cancel {
        None => {
            sleep(interval).await;
            false
        }
        Some(rx) => {
            if *rx.borrow() {
                return true;
            }
            tokio::select! {
                _ = sleep(interval) => false,
                changed = rx.changed() => changed.is_err() || *rx.borrow(),
            }
        }
    }
}
