//! Failover subsystem: backend pool, failure window, rotation.
//!
//! # Data Flow
//! ```text
//! Forwarding engine:
//!     request fails (transport error or bad status)
//!     → pool.rs record_failure() (append timestamp to the window)
//!
//! Failure monitor (monitor.rs, periodic):
//!     → pool.rs rotate_if_failing(lookback)
//!         prune window to the trailing lookback
//!         → any entries left? advance active index one step, clear window
//! ```
//!
//! # Design Decisions
//! - Rotation is decided only at the periodic tick, never on the failing
//!   request's own path: a single transient error must not flap the pool
//! - Index, window and rotation share one mutex so a rotation observes and
//!   clears exactly the failures that triggered it
//! - A request in flight may complete against a backend that was rotated
//!   away from moments earlier; requests starting after `rotate` returns
//!   observe the new index

pub mod backend;
pub mod monitor;
pub mod pool;

pub use backend::Backend;
pub use monitor::FailureMonitor;
pub use pool::FailoverPool;
