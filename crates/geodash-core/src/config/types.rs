//! Sub-configuration structs with defaults matching the deployed dashboard.

use serde::{Deserialize, Serialize};

/// Remote data locations.
///
/// Either value may be an `http(s)://` URL, a `file://` URL, or a plain path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Raster (GeoTIFF or any decodable image) location
    pub raster_url: String,

    /// CSV dataset location
    pub csv_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            raster_url: "https://s3.iiasa.ac.at/accelerator-prod/demo/Demo/sample.tif".to_string(),
            csv_url: "https://s3.iiasa.ac.at/accelerator-prod/demo/Demo/sample.csv".to_string(),
        }
    }
}

/// Raster cache and preview settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Longest edge the decimated view is reduced towards
    pub target_max_dimension: u32,

    /// Timeout for the best-effort fetch at startup
    pub startup_timeout_secs: u64,

    /// Timeout for the on-demand fetch after a cache miss
    pub lazy_timeout_secs: u64,

    /// Edge length of the solid red fallback preview
    pub placeholder_size: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            target_max_dimension: 1000,
            startup_timeout_secs: 120,
            lazy_timeout_secs: 60,
            placeholder_size: 100,
        }
    }
}

/// Tabular dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Fetch timeout in seconds
    pub timeout_secs: u64,

    /// Column coerced to a number; rows where it is not numeric are dropped
    pub value_column: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            value_column: "value".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// OpenAI-compatible chat completion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat completions endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Extra attempts for rate limits, 5xx, and timeouts
    pub retry_attempts: u32,

    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            timeout_secs: 60,
            retry_attempts: 2,
            retry_delay_ms: 1000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
