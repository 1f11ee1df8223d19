//! Binding Configuration
//!
//! Settings for talking to memuc:
//! - executable path override
//! - failure marker substrings
//! - log level

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use tracing::{info, debug};

use crate::error::{CoreError, Result};

/// Substrings memuc prints when a command fails despite a zero exit code
pub const DEFAULT_FAILURE_MARKERS: &[&str] = &["FAILED", "ERROR"];

/// Main binding configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MemucConfig {
    /// Configuration version for migrations
    pub version: u32,
    /// Explicit path to memuc.exe; auto-detected when unset
    pub memuc_path: Option<PathBuf>,
    /// Output substrings treated as failure even when memuc exits with 0
    pub failure_markers: Vec<String>,
    /// Default tracing filter directive
    pub log_level: String,
}

impl Default for MemucConfig {
    fn default() -> Self {
        Self {
            version: 1,
            memuc_path: None,
            failure_markers: DEFAULT_FAILURE_MARKERS.iter().map(|m| m.to_string()).collect(),
            log_level: "info".to_string(),
        }
    }
}

impl MemucConfig {
    /// Config with an explicit executable path and default markers
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            memuc_path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Add an extra failure marker
    pub fn add_failure_marker(&mut self, marker: impl Into<String>) {
        let marker = marker.into();
        if !self.failure_markers.contains(&marker) {
            self.failure_markers.push(marker);
        }
    }

    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "memukit", "MEmu Kit")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the configuration file path
    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Reject settings memuc calls cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.failure_markers.iter().any(|m| m.is_empty()) {
            return Err(CoreError::Config(
                "failure_markers must not contain empty entries".into(),
            ));
        }
        if let Some(ref path) = self.memuc_path {
            if path.as_os_str().is_empty() {
                return Err(CoreError::Config("memuc_path must not be empty".into()));
            }
        }
        Ok(())
    }

    /// Load configuration from the default location, creating it if missing
    pub async fn load() -> Result<Self> {
        let config_file = Self::config_file().ok_or(CoreError::NoConfigDir)?;

        if config_file.exists() {
            Self::load_from(&config_file).await
        } else {
            info!("Config file not found, using defaults");
            let config = MemucConfig::default();
            config.save_to(&config_file).await?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit file
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::NotFound(path.to_path_buf()));
        }

        debug!("Loading config from {:?}", path);
        let contents = tokio::fs::read_to_string(path).await?;
        let config: MemucConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub async fn save(&self) -> Result<()> {
        let config_file = Self::config_file().ok_or(CoreError::NoConfigDir)?;
        self.save_to(&config_file).await
    }

    /// Save configuration to an explicit file
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = toml::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }
}
