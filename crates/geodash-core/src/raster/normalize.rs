//! Linear stretch of arbitrary sample values onto 0..=255.

use ndarray::Array3;

use super::decode::DecodedImage;

/// 8-bit raster, same `(height, width, bands)` layout as [`DecodedImage`].
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub samples: Array3<u8>,
}

impl NormalizedImage {
    pub fn width(&self) -> u32 {
        self.samples.dim().1 as u32
    }

    pub fn height(&self) -> u32 {
        self.samples.dim().0 as u32
    }

    pub fn bands(&self) -> usize {
        self.samples.dim().2
    }
}

/// Stretch `image` so its minimum maps to 0 and its maximum to 255.
///
/// NaN and infinite samples are zeroed before the range is taken. One range is
/// shared by every band. A flat raster (min == max) comes out all zeros.
pub fn normalize(image: DecodedImage) -> NormalizedImage {
    let mut samples = image.samples;
    samples.mapv_inplace(|v| if v.is_finite() { v } else { 0.0 });

    let (min, max) = samples.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    });

    if samples.is_empty() || max == min {
        return NormalizedImage {
            samples: Array3::zeros(samples.dim()),
        };
    }

    let (min, range) = (min as f64, (max as f64) - (min as f64));
    let samples = samples.mapv(|v| {
        let scaled = ((v as f64 - min) * 255.0 / range).round();
        scaled.clamp(0.0, 255.0) as u8
    });
    NormalizedImage { samples }
}
