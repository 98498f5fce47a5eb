//! Admission control subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → token_bucket.rs acquire() (suspends until a permit is free,
//!       bounded by the configured acquisition timeout)
//!     → forwarding engine
//!
//! Refill task (every second):
//!     → top the bucket back up to capacity
//! ```
//!
//! # Design Decisions
//! - One global bucket, not per-client: the cap bounds total outbound load
//! - Batched refill once per tick, not a continuous leak
//! - A permit is consumed on admission and never returned; only the refill
//!   task creates permits

pub mod token_bucket;

pub use token_bucket::{AcquireTimeout, TokenBucket};
