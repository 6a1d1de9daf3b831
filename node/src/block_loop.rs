//! The standalone block loop and its graceful shutdown.

use std::time::Duration;

use tokio::signal;
use tokio::sync::broadcast;

use interstake_types::Timestamp;

use crate::standalone::StandaloneNode;
use crate::NodeError;

/// Broadcasts a single shutdown signal to every subscriber.
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }

    /// Wait for SIGINT (or SIGTERM on unix), then trigger shutdown.
    pub async fn wait_for_signal(&self) {
        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = signal::ctrl_c() => { tracing::info!("received SIGINT, shutting down"); }
            _ = terminate => { tracing::info!("received SIGTERM, shutting down"); }
        }

        self.shutdown();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Produce one block every `block_time` until shutdown. Each block runs
/// end-of-block processing at the current wall-clock second.
///
/// Returns the number of blocks processed. A failing block stops the loop.
pub async fn run_block_loop(
    node: &StandaloneNode,
    block_time: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<u64, NodeError> {
    let mut interval = tokio::time::interval(block_time);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut blocks = 0u64;

    loop {
        tokio::select! {
            biased;
            _ = shutdown.recv() => break,
            _ = interval.tick() => {
                let ctx = node.next_block(Timestamp::now())?;
                let report = node.finish_block(ctx)?;
                blocks += 1;
                if !report.is_empty() {
                    tracing::info!(
                        height = ctx.height,
                        settled = report.settled.len(),
                        failed = report.failed.len(),
                        "block processed"
                    );
                } else {
                    tracing::trace!(height = ctx.height, "block processed");
                }
            }
        }
    }

    tracing::info!(blocks, "block loop stopped");
    Ok(blocks)
}
