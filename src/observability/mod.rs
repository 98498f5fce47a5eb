//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via `tracing`; level from the environment with a
//!   config fallback
//! - Metrics through the `metrics` facade with an optional Prometheus
//!   exporter; recording is cheap enough to sit on the request path

pub mod logging;
pub mod metrics;
