//! Error types for the DDNS synchronizer
//!
//! Only configuration errors are fatal for a run. Every other variant is
//! raised by a single network operation and is turned into a logged skip by
//! the engine.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS synchronizer
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed configuration (bad record, bad value)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configuration file does not exist
    #[error("No config file at {}. Place config.yaml in the current working directory or set DDNS_CONFIG.", .0.display())]
    ConfigNotFound(PathBuf),

    /// Connection, timeout or HTTP status failures
    #[error("Network error: {0}")]
    Network(String),

    /// A response could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// The nameserver could not be reached or answered with a failure
    #[error("Resolver error: {0}")]
    Resolver(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Local I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization errors (config file)
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a resolver error
    pub fn resolver(msg: impl Into<String>) -> Self {
        Self::Resolver(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error must abort the whole run
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::ConfigNotFound(_) | Self::Yaml(_))
    }
}
