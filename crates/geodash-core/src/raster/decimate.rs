//! Point decimation: keep every Nth row and column, no averaging.

use ndarray::s;

use super::decode::DecodedImage;

/// Integer reduction factor for a `width` x `height` raster.
///
/// Floor division, so the reduced longest edge stays at or above `target`
/// (and below `2 * target`) whenever reduction happens at all.
pub fn decimation_factor(width: u32, height: u32, target: u32) -> u32 {
    if target == 0 {
        return 1;
    }
    (width.max(height) / target).max(1)
}

/// Reduce `image` so its longest edge is close to `target`.
///
/// Samples rows and columns `0, f, 2f, …`, giving `ceil(width / f)` by
/// `ceil(height / f)`. Returns the input untouched when the factor is 1.
pub fn decimate(image: DecodedImage, target: u32) -> DecodedImage {
    let factor = decimation_factor(image.width(), image.height(), target);
    if factor <= 1 {
        return image;
    }

    tracing::debug!(
        factor,
        width = image.width(),
        height = image.height(),
        "Decimating raster"
    );
    let step = factor as isize;
    let samples = image.samples.slice(s![..;step, ..;step, ..]).to_owned();
    DecodedImage {
        samples,
        format: image.format,
    }
}
