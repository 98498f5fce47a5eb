//! Backend abstraction.

use url::Url;

/// A single upstream backend.
///
/// Membership in the pool is fixed at startup; a backend carries no
/// mutable state of its own, only its base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    base_url: Url,
}

impl Backend {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Base URL requests to this backend are built from.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Short label for logs and metrics (host:port, no scheme or path).
    pub fn label(&self) -> String {
        match (self.base_url.host_str(), self.base_url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            _ => self.base_url.to_string(),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base_url)
    }
}
