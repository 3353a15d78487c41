//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.raster_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "sources.raster_url must not be empty".into(),
            ));
        }
        if self.sources.csv_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "sources.csv_url must not be empty".into(),
            ));
        }
        if self.raster.target_max_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "raster.target_max_dimension must be > 0".into(),
            ));
        }
        if self.raster.startup_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "raster.startup_timeout_secs must be > 0".into(),
            ));
        }
        if self.raster.lazy_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "raster.lazy_timeout_secs must be > 0".into(),
            ));
        }
        if self.raster.placeholder_size == 0 {
            return Err(ConfigError::ValidationError(
                "raster.placeholder_size must be > 0".into(),
            ));
        }
        if self.dataset.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "dataset.timeout_secs must be > 0".into(),
            ));
        }
        if self.dataset.value_column.is_empty() {
            return Err(ConfigError::ValidationError(
                "dataset.value_column must not be empty".into(),
            ));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "llm.timeout_secs must be > 0".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}
