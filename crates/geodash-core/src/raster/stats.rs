//! Summary statistics over the decimated raster.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use super::decode::DecodedImage;
use crate::error::ComputeError;

/// Min/max/mean of the reduced view plus its size.
///
/// Computed on the decimated grid, not the full-resolution source, so values
/// are approximate for large rasters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// `"{width}x{height}"` of the grid the stats were taken over
    pub approx_resolution: String,
}

/// What the stats endpoint and the chat context receive.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsOutcome {
    Ready(StatsRecord),
    /// The store is empty; no fetch was attempted
    NotLoaded,
    /// Bytes were cached but could not be decoded or reduced
    Unavailable,
}

impl StatsOutcome {
    pub const NOT_LOADED: &'static str = "Raster not loaded.";
    pub const UNAVAILABLE: &'static str = "Raster stats unavailable.";
}

impl fmt::Display for StatsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(r) => write!(
                f,
                "min: {}, max: {}, mean: {}, approx_resolution: {}",
                r.min, r.max, r.mean, r.approx_resolution
            ),
            Self::NotLoaded => f.write_str(Self::NOT_LOADED),
            Self::Unavailable => f.write_str(Self::UNAVAILABLE),
        }
    }
}

/// The record as a JSON object, or the fallback marker as a JSON string.
impl Serialize for StatsOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ready(record) => record.serialize(serializer),
            Self::NotLoaded => serializer.serialize_str(Self::NOT_LOADED),
            Self::Unavailable => serializer.serialize_str(Self::UNAVAILABLE),
        }
    }
}

/// Reduce every band of `image`, skipping NaN and infinite samples.
pub fn compute(image: &DecodedImage) -> Result<StatsRecord, ComputeError> {
    let mut count = 0usize;
    let mut sum = 0.0f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for &v in image.samples.iter().filter(|v| v.is_finite()) {
        let v = v as f64;
        count += 1;
        sum += v;
        min = min.min(v);
        max = max.max(v);
    }

    if count == 0 {
        return Err(ComputeError::NoFiniteSamples);
    }

    Ok(StatsRecord {
        min,
        max,
        mean: sum / count as f64,
        approx_resolution: format!("{}x{}", image.width(), image.height()),
    })
}
