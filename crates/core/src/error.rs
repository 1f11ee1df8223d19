//! Error types for MEmu Kit
//!
//! Errors raised while loading, saving or validating configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Cannot determine configuration directory")]
    NoConfigDir,

    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Io(e) => format!("File operation failed: {}", e),
            CoreError::TomlParse(e) => format!("Configuration file is malformed: {}", e),
            CoreError::NoConfigDir => "No configuration directory is available on this system".to_string(),
            CoreError::NotFound(path) => format!("Configuration file not found at {}", path.display()),
            _ => self.to_string(),
        }
    }
}
