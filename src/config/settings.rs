//! Configuration settings for the ABS agent service.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub source: SourceConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let expanded = shellexpand::tilde(&path.as_ref().to_string_lossy()).into_owned();
        let content = std::fs::read_to_string(&expanded).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            PathBuf::from("abs-agent.toml"),
            PathBuf::from("config.toml"),
            dirs::config_dir()
                .map(|p| p.join("abs-agent/config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".abs-agent/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.is_file() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.source.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("source.base_url".to_string()).into());
        }

        if self.source.max_retries == 0 {
            return Err(ConfigError::Invalid("source.max_retries must be >= 1".to_string()).into());
        }

        if self.source.timeout_secs == 0 {
            return Err(ConfigError::Invalid("source.timeout_secs must be > 0".to_string()).into());
        }

        if self.server.host.trim().is_empty() {
            return Err(ConfigError::MissingField("server.host".to_string()).into());
        }

        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Allowed origins for CORS ("*" allows any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Statistics data source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of the ABS data API (dataflow ids are appended as `,<id>`)
    pub base_url: String,
    /// Per-attempt request timeout in seconds
    pub timeout_secs: u64,
    /// Total attempts per fetch, including the first
    pub max_retries: usize,
    /// Base delay for exponential backoff in milliseconds
    pub backoff_base_ms: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://data.api.abs.gov.au/rest/data/ABS".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            backoff_base_ms: 1000,
            user_agent: format!("abs-agent/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is not set
    pub level: String,
    /// Emit JSON-formatted log lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.source.max_retries, 3);
        assert_eq!(config.source.timeout_secs, 30);
        assert!(config.source.base_url.starts_with("https://data.api.abs.gov.au"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 9090

            [source]
            base_url = "http://localhost:1234/rest/data/ABS"
            max_retries = 5
            backoff_base_ms = 10

            [logging]
            json = true
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.source.max_retries, 5);
        assert_eq!(config.source.backoff_base_ms, 10);
        assert_eq!(config.source.timeout_secs, 30);
        assert!(config.logging.json);
    }

    #[test]
    fn test_validate_missing_base_url() {
        let toml = r#"
            [source]
            base_url = ""
        "#;

        assert!(Config::from_str(toml).is_err());
    }

    #[test]
    fn test_validate_zero_retries() {
        let toml = r#"
            [source]
            max_retries = 0
        "#;

        let err = Config::from_str(toml).unwrap_err();
        assert!(err.to_string().contains("max_retries"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 8123").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 8123);
    }

    #[test]
    fn test_from_missing_file() {
        let result = Config::from_file("/definitely/not/here/abs-agent.toml");
        assert!(result.is_err());
    }
}
