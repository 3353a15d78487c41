//! Raster caching and downsampling pipeline.
//!
//! - **store**: process-wide cache of the encoded raster bytes
//! - **decode**: bytes to a `(height, width, bands)` sample grid
//! - **decimate**: point sampling down to a target longest edge
//! - **normalize**: NaN-safe stretch to 8-bit
//! - **preview**: grayscale PNG encoding and the fallback placeholder
//! - **stats**: min/max/mean over the decimated grid
//! - **service**: wires the stages together behind never-failing entry points

pub mod decimate;
pub mod decode;
pub mod normalize;
pub mod preview;
pub mod service;
pub mod stats;
pub mod store;

// Re-exports for convenient access
pub use decimate::{decimate, decimation_factor};
pub use decode::{decode, DecodedImage};
pub use normalize::{normalize, NormalizedImage};
pub use preview::PreviewEncoder;
pub use service::{render_preview, RasterService};
pub use stats::{StatsOutcome, StatsRecord};
pub use store::RasterStore;
