//! Runtime configuration for the field-collection core.
//!
//! Values come from (in order of precedence) explicit setters, environment
//! variables, an optional TOML file, and built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// How often the reconciler drains the queue while online
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;

/// Conservative fixed timeout for every server call; expiry is treated as
/// an ordinary delivery failure
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    server_url: String,
    api_token: Option<String>,
    db_path: PathBuf,
    collector_code: Option<String>,
    sync_interval: Duration,
    request_timeout: Duration,
}

/// Shape of the optional TOML configuration file.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    server_url: Option<String>,
    api_token: Option<String>,
    db_path: Option<PathBuf>,
    collector_code: Option<String>,
    sync_interval_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let server_url = std::env::var("COBRADOR_SERVER_URL")
            .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        let api_token = std::env::var("COBRADOR_API_TOKEN").ok();
        let db_path = std::env::var("COBRADOR_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_db_path());
        let collector_code = std::env::var("COBRADOR_COLLECTOR_CODE").ok();
        Self {
            server_url,
            api_token,
            db_path,
            collector_code,
            sync_interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Create a new configuration from environment variables and defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file, with environment variables
    /// still taking precedence over file values
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let file: ConfigFile =
            toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut config = Self::new();
        if std::env::var("COBRADOR_SERVER_URL").is_err() {
            if let Some(url) = file.server_url {
                config.server_url = url;
            }
        }
        if std::env::var("COBRADOR_API_TOKEN").is_err() {
            config.api_token = file.api_token.or(config.api_token);
        }
        if std::env::var("COBRADOR_DB_PATH").is_err() {
            if let Some(db_path) = file.db_path {
                config.db_path = db_path;
            }
        }
        if std::env::var("COBRADOR_COLLECTOR_CODE").is_err() {
            config.collector_code = file.collector_code.or(config.collector_code);
        }
        if let Some(secs) = file.sync_interval_secs {
            config.sync_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Platform-specific default path for the local database file
    fn default_db_path() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push("cobrador");
        path.push("local.db");
        path
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Set the server URL (used by tests and platform glue)
    pub fn set_server_url(&mut self, url: impl Into<String>) {
        self.server_url = url.into();
    }

    /// Get the API token
    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    /// Set the API token (login) or clear it (logout)
    pub fn set_api_token(&mut self, token: Option<String>) {
        self.api_token = token;
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn set_db_path(&mut self, path: impl Into<PathBuf>) {
        self.db_path = path.into();
    }

    /// Collector code assigned to this device's agent
    pub fn collector_code(&self) -> Option<&str> {
        self.collector_code.as_deref()
    }

    pub fn set_collector_code(&mut self, code: Option<String>) {
        self.collector_code = code;
    }

    pub fn sync_interval(&self) -> Duration {
        self.sync_interval
    }

    pub fn set_sync_interval(&mut self, interval: Duration) {
        self.sync_interval = interval;
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(String),
    #[error("invalid config file: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let mut config = Config::new();
        config.set_server_url("http://127.0.0.1:3000");
        assert_eq!(
            config.api_url("/api/payments"),
            "http://127.0.0.1:3000/api/payments"
        );
    }

    #[test]
    fn test_token_roundtrip() {
        let mut config = Config::new();
        config.set_api_token(Some("test_token".to_string()));
        assert_eq!(config.api_token(), Some("test_token"));
        config.set_api_token(None);
        assert!(config.api_token().is_none());
    }

    #[test]
    fn test_default_intervals() {
        let config = Config::new();
        assert_eq!(config.sync_interval(), Duration::from_secs(300));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cobrador.toml");
        std::fs::write(
            &path,
            r#"
server_url = "http://10.0.0.5:8080"
collector_code = "COB-07"
sync_interval_secs = 60
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.collector_code(), Some("COB-07"));
        assert_eq!(config.sync_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cobrador.toml");
        std::fs::write(&path, "server_url = [").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
