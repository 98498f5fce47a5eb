//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! CLI flags (--file, --port, --limit)
//!     → override the corresponding schema fields
//!
//! Optional TOML file (--config)
//!     → loader.rs (parse & deserialize)
//!     → ProxyConfig (immutable once startup completes)
//!
//! Backend URL file (--file)
//!     → loader.rs (one URL per line, blanks skipped)
//!     → Vec<Backend> (membership fixed for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - Every section has defaults so a bare `proxys --file urls` works
//! - CLI flags always win over TOML values
//! - Zero usable backend URLs is a fatal startup error

pub mod loader;
pub mod schema;

pub use loader::{load_config, read_backends, ConfigError};
pub use schema::{
    FailoverConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, RateLimitConfig,
    TimeoutConfig,
};
