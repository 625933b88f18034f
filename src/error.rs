//! Error types for the ABS agent service.

use thiserror::Error;

/// Main error type for agent operations.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Data source error: {0}")]
    Source(#[from] SourceError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Errors raised while talking to an external statistics source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request timeout after {0} attempts")]
    Timeout(usize),

    #[error("Rate limited after {0} attempts")]
    RateLimited(usize),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Agent registry errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Agent {0} not found in registry")]
    NotFound(String),

    #[error("Agent {0} is already registered")]
    Duplicate(String),

    #[error("Failed to create agent {name}: {reason}")]
    Instantiation { name: String, reason: String },
}

/// Result type alias for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;
