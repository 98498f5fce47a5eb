//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! SIGINT/SIGTERM (signals.rs)
//!     → Shutdown::trigger (shutdown.rs)
//!     → broadcast to: axum server, bucket refiller, failure monitor
//!     → server drains, background loops exit, process ends cleanly
//! ```
//!
//! # Design Decisions
//! - Background timers are cancellable tasks, never free-running loops
//! - One broadcast channel; every long-running task holds a receiver

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
