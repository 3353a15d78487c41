//! Error types for the geodash backend.
//!
//! Errors are organized by stage so fallbacks at the service boundary can log
//! a precise reason (which URL failed, which decode step broke) before
//! substituting a placeholder or marker.

use thiserror::Error;

/// Top-level error type for geodash operations.
#[derive(Error, Debug)]
pub enum GeodashError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Raster pipeline errors
    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),

    /// Tabular dataset errors
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Language-model errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failure to retrieve remote (or local) source bytes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The server answered with a non-2xx status
    #[error("GET {location} returned HTTP {status}")]
    Status { location: String, status: u16 },

    /// The request did not complete within its timeout
    #[error("GET {location} timed out after {timeout_secs}s")]
    Timeout { location: String, timeout_secs: u64 },

    /// Connection, DNS, TLS, or body-read failure
    #[error("Fetching {location} failed: {message}")]
    Transport { location: String, message: String },
}

/// Malformed or unsupported encoded image bytes.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Container format could not be recognised from the bytes
    #[error("Cannot detect image format")]
    UnknownFormat,

    /// The container was recognised but decoding failed
    #[error("Failed to decode {format} image: {message}")]
    Malformed { format: String, message: String },

    /// Decoded pixels use a layout this pipeline does not handle
    #[error("Unsupported pixel layout: {0}")]
    UnsupportedLayout(String),
}

/// Unexpected shape or content while normalizing, encoding, or reducing.
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Sample buffer does not match the declared dimensions
    #[error("Sample buffer of {len} values does not fit a {width}x{height} grid")]
    Shape { width: u32, height: u32, len: usize },

    /// Every sample was NaN or infinite
    #[error("Raster contains no finite samples")]
    NoFiniteSamples,

    /// PNG encoding failed
    #[error("Failed to encode preview: {0}")]
    Encode(String),
}

/// Any failure inside the raster fetch → decode → reduce → encode pipeline.
#[derive(Error, Debug)]
pub enum RasterError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Compute(#[from] ComputeError),

    /// The blocking worker running the pipeline panicked or was cancelled
    #[error("Raster worker failed: {0}")]
    Worker(String),
}

/// Failures loading the tabular dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// CSV could not be parsed
    #[error("Failed to parse CSV: {0}")]
    Parse(#[from] csv::Error),

    /// The required numeric column is absent from the header row
    #[error("CSV has no '{0}' column")]
    MissingColumn(String),
}

/// Language-model call failures.
#[derive(Error, Debug)]
pub enum LlmError {
    /// HTTP-level or response-shape failure
    #[error("{message}")]
    Request {
        message: String,
        status_code: Option<u16>,
    },

    /// API key is not configured or its env var is unset
    #[error("API key not set. Set {0} env var.")]
    MissingApiKey(String),

    /// The call exceeded its timeout
    #[error("LLM call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Convenience type alias for geodash results.
pub type Result<T> = std::result::Result<T, GeodashError>;

/// Convenience type alias for raster pipeline results.
pub type RasterResult<T> = std::result::Result<T, RasterError>;
