//! CLI error types and conversions

use crate::config::ConfigError;
use crate::error::CloudSaveError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Service call failed
    #[error("cloud save error: {0}")]
    Service(#[from] CloudSaveError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Local file error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be rendered
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
