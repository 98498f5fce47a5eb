//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from a TOML file.
//! Every field has a default so partial configs (or none at all) work.

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, port).
    pub listener: ListenerConfig,

    /// Global admission-control settings.
    pub rate_limit: RateLimitConfig,

    /// Failure detection and backend rotation settings.
    pub failover: FailoverConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_address: String,

    /// Listening TCP port.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 26657,
        }
    }
}

impl ListenerConfig {
    /// Full socket address string for binding.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Admission-control configuration.
///
/// The bucket is topped back up to `requests_per_second` once per second;
/// a request that cannot obtain a permit within `acquire_timeout_ms` is
/// rejected with 429 instead of waiting forever.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum admitted requests per second (bucket capacity).
    pub requests_per_second: u32,

    /// How long a request may wait for a permit before being rejected.
    pub acquire_timeout_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            acquire_timeout_ms: 5000,
        }
    }
}

/// Failure detection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FailoverConfig {
    /// Seconds between evaluations of the failure window.
    pub evaluate_interval_secs: u64,

    /// Trailing window, in seconds, within which failures count towards
    /// a rotation decision.
    pub lookback_secs: u64,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            evaluate_interval_secs: 30,
            lookback_secs: 20,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream call deadline in seconds.
    pub upstream_secs: u64,

    /// Total inbound request timeout in seconds (admission wait included).
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            upstream_secs: 30,
            request_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.port, 26657);
        assert_eq!(config.rate_limit.requests_per_second, 10);
        assert_eq!(config.failover.evaluate_interval_secs, 30);
        assert_eq!(config.failover.lookback_secs, 20);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [failover]
            evaluate_interval_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.failover.evaluate_interval_secs, 5);
        assert_eq!(config.failover.lookback_secs, 20);
        assert_eq!(config.listener.port, 26657);
    }
}
