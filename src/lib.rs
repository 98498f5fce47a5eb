//! Rate-limited reverse proxy with automatic backend failover.
//!
//! Fronts an ordered pool of upstream HTTP/JSON-RPC endpoints with a single
//! local address. Every request passes a global token-bucket admission gate
//! before being forwarded to the currently active backend; a background
//! evaluator watches a sliding window of recent upstream failures and
//! rotates the pool to the next backend when the active one has started
//! failing.

pub mod admission;
pub mod config;
pub mod failover;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
