//! Configuration management for geodash.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default` so a missing file (or a
//! partial one) still yields a runnable server.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for geodash.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the raster and CSV come from
    pub sources: SourcesConfig,

    /// Raster cache and preview settings
    pub raster: RasterConfig,

    /// CSV dataset settings
    pub dataset: DatasetConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Chat model settings
    pub llm: LlmConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.geodash.geodash/config.toml
    /// - Linux: ~/.config/geodash/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\geodash\config\config.toml
    ///
    /// Falls back to ~/.geodash/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "geodash", "geodash")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".geodash").join("config.toml")
            })
    }

    /// Resolve a source location, expanding a leading `~` for local paths.
    pub fn resolve_location(location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            location.to_string()
        } else {
            shellexpand::tilde(location.trim_start_matches("file://")).into_owned()
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
