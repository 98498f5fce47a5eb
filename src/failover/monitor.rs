//! Periodic failure-window evaluation.
//!
//! # Responsibilities
//! - Wake on a fixed interval
//! - Prune the failure window and rotate the pool when it is non-empty
//! - Exit cleanly on shutdown

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::config::FailoverConfig;
use crate::failover::FailoverPool;
use crate::observability::metrics;

pub struct FailureMonitor {
    pool: Arc<FailoverPool>,
    config: FailoverConfig,
}

impl FailureMonitor {
    pub fn new(pool: Arc<FailoverPool>, config: FailoverConfig) -> Self {
        Self { pool, config }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.config.evaluate_interval_secs,
            lookback_secs = self.config.lookback_secs,
            "Failure monitor starting"
        );

        let lookback = Duration::from_secs(self.config.lookback_secs);
        let mut ticker = time::interval(Duration::from_secs(self.config.evaluate_interval_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.evaluate(lookback);
                }
                _ = shutdown.recv() => {
                    tracing::info!("Failure monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    fn evaluate(&self, lookback: Duration) {
        if let Some(rotation) = self.pool.rotate_if_failing(lookback) {
            let from = self.pool.backend(rotation.from).label();
            let to = self.pool.backend(rotation.to).label();
            tracing::warn!(
                recent_failures = rotation.recent_failures,
                from = %from,
                to = %to,
                "Recent upstream failures detected, rotating to the next backend"
            );
            metrics::record_rotation(&from, &to);
        }
    }
}
