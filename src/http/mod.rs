//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum catch-all route, middleware layers)
//!     → admission gate (token bucket)
//!     → forward.rs (build outbound request, execute, classify outcome)
//!     → response streamed back to the client
//! ```

pub mod forward;
pub mod request;
pub mod server;

pub use server::HttpServer;
