//! Global token-bucket admission gate.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, Semaphore};
use tokio::time;

/// Cadence of the batched refill.
const REFILL_INTERVAL: Duration = Duration::from_secs(1);

/// The configured acquisition wait elapsed before a permit became free.
#[derive(Debug, Error)]
#[error("timed out waiting for an admission permit")]
pub struct AcquireTimeout;

/// A token bucket bounding global request throughput.
///
/// Permits live in a semaphore. Admitting a request consumes one permit
/// permanently; the refill task tops the semaphore back up to `capacity`
/// once per second. The semaphore never holds more than `capacity`
/// permits because only the refill task adds them.
pub struct TokenBucket {
    permits: Semaphore,
    capacity: usize,
    acquire_timeout: Duration,
}

impl TokenBucket {
    /// Create a bucket that starts full.
    pub fn new(capacity: usize, acquire_timeout: Duration) -> Self {
        Self {
            permits: Semaphore::new(capacity),
            capacity,
            acquire_timeout,
        }
    }

    /// Wait for a permit and consume it.
    ///
    /// Suspends the calling task until a permit is available or the
    /// acquisition timeout elapses.
    pub async fn acquire(&self) -> Result<(), AcquireTimeout> {
        match time::timeout(self.acquire_timeout, self.permits.acquire()).await {
            Ok(Ok(permit)) => {
                // Consumed for good; refill is the only producer.
                permit.forget();
                Ok(())
            }
            // The semaphore is never closed, but saturate rather than panic.
            Ok(Err(_)) => Err(AcquireTimeout),
            Err(_) => Err(AcquireTimeout),
        }
    }

    /// Top the bucket back up to capacity.
    pub fn refill(&self) {
        let missing = self.capacity.saturating_sub(self.permits.available_permits());
        if missing > 0 {
            self.permits.add_permits(missing);
        }
    }

    /// Permits currently available.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run the refill loop until shutdown is signalled.
    pub async fn run_refiller(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = time::interval(REFILL_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refill();
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Refill task received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(capacity: usize) -> TokenBucket {
        TokenBucket::new(capacity, Duration::from_millis(50))
    }

    #[tokio::test(start_paused = true)]
    async fn full_capacity_admits_without_blocking() {
        let bucket = bucket(3);
        for _ in 0..3 {
            bucket.acquire().await.unwrap();
        }
        assert_eq!(bucket.available(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn over_capacity_request_times_out_without_refill() {
        let bucket = bucket(2);
        bucket.acquire().await.unwrap();
        bucket.acquire().await.unwrap();

        bucket.acquire().await.unwrap_err();
    }

    #[tokio::test(start_paused = true)]
    async fn blocked_request_is_admitted_after_refill() {
        let bucket = Arc::new(bucket(1));
        bucket.acquire().await.unwrap();

        let waiter = {
            let bucket = bucket.clone();
            tokio::spawn(async move { bucket.acquire().await })
        };
        // Let the waiter park on the semaphore before refilling.
        tokio::task::yield_now().await;

        bucket.refill();
        waiter.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn refill_never_exceeds_capacity() {
        let bucket = bucket(5);
        bucket.refill();
        bucket.refill();
        assert_eq!(bucket.available(), 5);

        bucket.acquire().await.unwrap();
        bucket.refill();
        assert_eq!(bucket.available(), 5);
    }
}
