//! Backend pool with failure-driven rotation.
//!
//! # Responsibilities
//! - Hold the ordered, immutable backend list
//! - Track the mutable active index shared by all request tasks
//! - Record upstream failures into a sliding time window
//! - Rotate to the next backend when the window shows recent failures
//!
//! # Concurrency
//! The active index and the failure window live behind a single mutex.
//! `current()` and `record_failure()` are called from many concurrent
//! request tasks; `rotate_if_failing()` from the monitor task. Rotation
//! advances the index and clears the window under one lock acquisition,
//! so no reader can observe a rotated index with a stale window.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::failover::Backend;

/// Outcome of a rotation, for logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    pub from: usize,
    pub to: usize,
    /// Failures within the lookback that triggered this rotation.
    pub recent_failures: usize,
}

struct PoolState {
    active: usize,
    failures: Vec<Instant>,
}

/// Ordered backend pool with one active backend at a time.
pub struct FailoverPool {
    backends: Vec<Backend>,
    state: Mutex<PoolState>,
}

impl FailoverPool {
    /// Create a pool. The backend list must be non-empty; the loader
    /// guarantees this for lists read from disk.
    pub fn new(backends: Vec<Backend>) -> Self {
        assert!(!backends.is_empty(), "backend pool must not be empty");
        Self {
            backends,
            state: Mutex::new(PoolState {
                active: 0,
                failures: Vec::new(),
            }),
        }
    }

    /// The currently active backend. Never fails.
    pub fn current(&self) -> Backend {
        let state = self.state.lock().expect("pool mutex poisoned");
        self.backends[state.active].clone()
    }

    /// Index of the active backend.
    pub fn active_index(&self) -> usize {
        self.state.lock().expect("pool mutex poisoned").active
    }

    /// Number of backends in the pool.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// The backend at a given index (panics if out of range).
    pub fn backend(&self, index: usize) -> &Backend {
        &self.backends[index]
    }

    /// Record an upstream failure at the current time.
    pub fn record_failure(&self) {
        self.record_failure_at(Instant::now());
    }

    fn record_failure_at(&self, at: Instant) {
        let mut state = self.state.lock().expect("pool mutex poisoned");
        state.failures.push(at);
    }

    /// Advance the active index one step (wrapping) and clear the
    /// failure window.
    pub fn rotate(&self) -> Rotation {
        let mut state = self.state.lock().expect("pool mutex poisoned");
        let recent_failures = state.failures.len();
        Self::rotate_locked(&mut state, self.backends.len(), recent_failures)
    }

    /// Prune the failure window to the trailing `lookback`, then rotate
    /// iff any failures remain. Called by the periodic monitor.
    pub fn rotate_if_failing(&self, lookback: Duration) -> Option<Rotation> {
        self.rotate_if_failing_at(Instant::now(), lookback)
    }

    fn rotate_if_failing_at(&self, now: Instant, lookback: Duration) -> Option<Rotation> {
        let mut state = self.state.lock().expect("pool mutex poisoned");
        state
            .failures
            .retain(|recorded| now.duration_since(*recorded) <= lookback);

        let recent_failures = state.failures.len();
        if recent_failures == 0 {
            return None;
        }
        Some(Self::rotate_locked(
            &mut state,
            self.backends.len(),
            recent_failures,
        ))
    }

    fn rotate_locked(state: &mut PoolState, len: usize, recent_failures: usize) -> Rotation {
        let from = state.active;
        state.active = (state.active + 1) % len;
        state.failures.clear();
        Rotation {
            from,
            to: state.active,
            recent_failures,
        }
    }

    #[cfg(test)]
    fn failure_count(&self) -> usize {
        self.state.lock().unwrap().failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn pool(n: usize) -> FailoverPool {
        let backends = (0..n)
            .map(|i| {
                Backend::new(Url::parse(&format!("http://10.0.0.{}:26657", i + 1)).unwrap())
            })
            .collect();
        FailoverPool::new(backends)
    }

    #[test]
    fn rotate_wraps_modulo_pool_size() {
        let pool = pool(3);
        assert_eq!(pool.active_index(), 0);

        assert_eq!(pool.rotate().to, 1);
        assert_eq!(pool.rotate().to, 2);
        let wrapped = pool.rotate();
        assert_eq!(wrapped.from, 2);
        assert_eq!(wrapped.to, 0);
    }

    #[test]
    fn n_rotations_return_to_start() {
        let pool = pool(4);
        for _ in 0..4 {
            pool.rotate();
            assert!(pool.active_index() < pool.len());
        }
        assert_eq!(pool.active_index(), 0);
    }

    #[test]
    fn single_backend_pool_rotates_to_itself() {
        let pool = pool(1);
        let rotation = pool.rotate();
        assert_eq!(rotation.from, 0);
        assert_eq!(rotation.to, 0);
    }

    #[test]
    fn current_follows_the_active_index() {
        let pool = pool(2);
        assert_eq!(pool.current().label(), "10.0.0.1:26657");
        pool.rotate();
        assert_eq!(pool.current().label(), "10.0.0.2:26657");
    }

    #[test]
    fn empty_window_does_not_rotate() {
        let pool = pool(3);
        assert!(pool.rotate_if_failing(Duration::from_secs(20)).is_none());
        assert_eq!(pool.active_index(), 0);
    }

    #[test]
    fn recent_failure_rotates_once_and_clears_the_window() {
        let pool = pool(3);
        pool.record_failure();
        pool.record_failure();

        let rotation = pool
            .rotate_if_failing(Duration::from_secs(20))
            .expect("should rotate");
        assert_eq!(rotation.from, 0);
        assert_eq!(rotation.to, 1);
        assert_eq!(rotation.recent_failures, 2);
        assert_eq!(pool.failure_count(), 0);

        // Window was cleared, so the next evaluation is a no-op.
        assert!(pool.rotate_if_failing(Duration::from_secs(20)).is_none());
        assert_eq!(pool.active_index(), 1);
    }

    #[test]
    fn stale_failures_are_pruned_without_rotating() {
        let pool = pool(3);
        let now = Instant::now();
        let stale = now - Duration::from_secs(30);
        pool.record_failure_at(stale);

        assert!(pool
            .rotate_if_failing_at(now, Duration::from_secs(20))
            .is_none());
        assert_eq!(pool.failure_count(), 0);
        assert_eq!(pool.active_index(), 0);
    }

    #[test]
    fn mixed_window_counts_only_recent_failures() {
        let pool = pool(2);
        let now = Instant::now();
        pool.record_failure_at(now - Duration::from_secs(30));
        pool.record_failure_at(now - Duration::from_secs(5));

        let rotation = pool
            .rotate_if_failing_at(now, Duration::from_secs(20))
            .expect("should rotate");
        assert_eq!(rotation.recent_failures, 1);
    }
}
