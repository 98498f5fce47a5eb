//! Configuration and backend-list loading from disk.

use std::fs;
use std::path::Path;

use url::Url;

use crate::config::schema::ProxyConfig;
use crate::failover::Backend;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    /// The backend URL file yielded no usable URLs.
    NoBackends(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::NoBackends(path) => {
                write!(f, "No usable backend URLs found in {}", path)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ProxyConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
    Ok(config)
}

/// Read the newline-delimited backend URL file.
///
/// Blank lines and surrounding whitespace are ignored. Lines that do not
/// parse as URLs are skipped with a warning; an empty result is an error
/// because the pool must never be empty.
pub fn read_backends(path: &Path) -> Result<Vec<Backend>, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;

    let mut backends = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match Url::parse(line) {
            Ok(url) => backends.push(Backend::new(url)),
            Err(e) => {
                tracing::warn!(line = %line, error = %e, "Skipping invalid backend URL");
            }
        }
    }

    if backends.is_empty() {
        return Err(ConfigError::NoBackends(path.display().to_string()));
    }
    Ok(backends)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_urls_skipping_blanks_and_whitespace() {
        let file = write_temp("http://10.0.0.1:26657\n\n  http://10.0.0.2:26657  \n\n");
        let backends = read_backends(file.path()).unwrap();
        assert_eq!(backends.len(), 2);
        assert_eq!(backends[0].base_url().as_str(), "http://10.0.0.1:26657/");
    }

    #[test]
    fn skips_unparseable_lines() {
        let file = write_temp("not a url\nhttp://10.0.0.1:26657\n");
        let backends = read_backends(file.path()).unwrap();
        assert_eq!(backends.len(), 1);
    }

    #[test]
    fn blank_file_is_an_error() {
        let file = write_temp("\n   \n\n");
        let err = read_backends(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NoBackends(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_backends(Path::new("/nonexistent/urls")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn loads_toml_config() {
        let file = write_temp("[listener]\nport = 9000\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.port, 9000);
    }
}
