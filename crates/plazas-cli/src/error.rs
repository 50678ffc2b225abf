//! Error types for the plazas CLI
//!
//! Messages are user-facing and say what to do next.

use plazas_core::PlazasError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Comprehensive error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Errors raised by the core library keep their own message
    #[error(transparent)]
    Core(#[from] PlazasError),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check plazas.toml, your .env file or the PLAZAS_* environment variables.")]
    Config(String),

    /// TOML parsing failed
    #[error("Failed to parse configuration file: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}. Check the file syntax.")]
    JsonParse(#[from] serde_json::Error),

    /// A flag value could not be used
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Background task panicked or was cancelled
    #[error("Task failed: {0}")]
    Task(String),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<tokio::task::JoinError> for CliError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}
