//! PNG preview encoding with a fixed fallback image.

use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, LumaA, Rgb, RgbImage, Rgba};
use ndarray::Axis;
use std::io::Cursor;

use super::normalize::NormalizedImage;
use crate::error::ComputeError;

/// Encodes normalized rasters as single-band PNGs.
pub struct PreviewEncoder;

impl PreviewEncoder {
    /// Collapse to grayscale and encode as PNG.
    ///
    /// 2, 3, and 4 bands are read as gray+alpha, RGB, and RGBA and converted
    /// with the `image` crate's luma weights. Wider multiband rasters render
    /// their first band.
    pub fn encode(image: NormalizedImage) -> Result<Vec<u8>, ComputeError> {
        let (width, height, bands) = (image.width(), image.height(), image.bands());
        let shape_err = || ComputeError::Shape {
            width,
            height,
            len: width as usize * height as usize * bands,
        };

        let gray: GrayImage = match bands {
            1 => GrayImage::from_raw(width, height, raw(&image)).ok_or_else(shape_err)?,
            2 => ImageBuffer::<LumaA<u8>, _>::from_raw(width, height, raw(&image))
                .map(DynamicImage::ImageLumaA8)
                .ok_or_else(shape_err)?
                .into_luma8(),
            3 => RgbImage::from_raw(width, height, raw(&image))
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(shape_err)?
                .into_luma8(),
            4 => ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, raw(&image))
                .map(DynamicImage::ImageRgba8)
                .ok_or_else(shape_err)?
                .into_luma8(),
            _ => {
                let first: Vec<u8> = image
                    .samples
                    .index_axis(Axis(2), 0)
                    .iter()
                    .copied()
                    .collect();
                GrayImage::from_raw(width, height, first).ok_or_else(shape_err)?
            }
        };

        write_png(DynamicImage::ImageLuma8(gray))
    }

    /// Solid red square returned whenever the real preview cannot be built.
    pub fn placeholder(size: u32) -> Result<Vec<u8>, ComputeError> {
        let img = RgbImage::from_pixel(size, size, Rgb([255, 0, 0]));
        write_png(DynamicImage::ImageRgb8(img))
    }
}

/// Samples in row-major, band-interleaved order.
fn raw(image: &NormalizedImage) -> Vec<u8> {
    image.samples.iter().copied().collect()
}

fn write_png(image: DynamicImage) -> Result<Vec<u8>, ComputeError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| ComputeError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

    fn normalized(
        h: usize,
        w: usize,
        bands: usize,
        f: impl Fn(usize, usize, usize) -> u8,
    ) -> NormalizedImage {
        NormalizedImage {
            samples: Array3::from_shape_fn((h, w, bands), |(y, x, b)| f(y, x, b)),
        }
    }

    fn decode_png(bytes: &[u8]) -> DynamicImage {
        image::load_from_memory_with_format(bytes, ImageFormat::Png).unwrap()
    }

    #[test]
    fn test_single_band_round_trips_values() {
        let image = normalized(2, 3, 1, |y, x, _| (y * 3 + x) as u8 * 40);
        let bytes = PreviewEncoder::encode(image).unwrap();
        assert_eq!(&bytes[..4], PNG_MAGIC);

        let decoded = decode_png(&bytes);
        assert!(matches!(decoded, DynamicImage::ImageLuma8(_)));
        let gray = decoded.into_luma8();
        assert_eq!(gray.dimensions(), (3, 2));
        assert_eq!(gray.get_pixel(2, 1).0[0], 200);
    }

    #[test]
    fn test_rgb_collapses_to_gray() {
        let bytes = PreviewEncoder::encode(normalized(4, 4, 3, |_, _, _| 255)).unwrap();
        let decoded = decode_png(&bytes);
        assert!(matches!(decoded, DynamicImage::ImageLuma8(_)));
        assert_eq!(decoded.into_luma8().get_pixel(0, 0).0[0], 255);
    }

    #[test]
    fn test_wide_multiband_renders_first_band() {
        let image = normalized(2, 2, 6, |_, _, b| b as u8 * 10 + 7);
        let bytes = PreviewEncoder::encode(image).unwrap();
        let gray = decode_png(&bytes).into_luma8();
        assert!(gray.pixels().all(|p| p.0[0] == 7));
    }

    #[test]
    fn test_placeholder_is_red_square() {
        let bytes = PreviewEncoder::placeholder(100).unwrap();
        let rgb = decode_png(&bytes).into_rgb8();
        assert_eq!(rgb.dimensions(), (100, 100));
        assert!(rgb.pixels().all(|p| p.0 == [255, 0, 0]));
    }
}
