//! Decoding encoded raster bytes into a numeric sample grid.
//!
//! TIFF and BigTIFF (including floating-point and signed GeoTIFF bands) go
//! through the `tiff` crate so sample values keep their physical units.
//! Everything else
//! the `image` crate can detect (PNG, JPEG, WebP) is decoded there.

use image::{DynamicImage, ImageFormat};
use ndarray::Array3;
use std::io::Cursor;
use tiff::decoder::{Decoder, DecodingResult, Limits};

use crate::error::{ComputeError, DecodeError, RasterError};

/// An in-memory raster: samples laid out as `(height, width, bands)`.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Sample values; NaN marks nodata
    pub samples: Array3<f32>,
    /// Detected container format
    pub format: ImageFormat,
}

impl DecodedImage {
    /// Wrap pixel-interleaved samples (band fastest, then column, then row).
    ///
    /// The band count is inferred from the buffer length.
    pub fn from_interleaved(
        width: u32,
        height: u32,
        samples: Vec<f32>,
        format: ImageFormat,
    ) -> Result<Self, ComputeError> {
        let shape_err = |len| ComputeError::Shape { width, height, len };
        let pixels = width as usize * height as usize;
        if pixels == 0 || samples.is_empty() || samples.len() % pixels != 0 {
            return Err(shape_err(samples.len()));
        }
        let bands = samples.len() / pixels;
        let len = samples.len();
        let samples = Array3::from_shape_vec((height as usize, width as usize, bands), samples)
            .map_err(|_| shape_err(len))?;
        Ok(Self { samples, format })
    }

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

/// Decode raster bytes, detecting the container from its magic bytes.
///
/// Pixel-count limits are lifted: source rasters are routinely far larger
/// than typical photos.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, RasterError> {
    // `image` format sniffing knows classic TIFF only, not BigTIFF.
    if is_tiff(bytes) {
        return decode_tiff(bytes);
    }

    let mut reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|_| DecodeError::UnknownFormat)?;
    let format = reader.format().ok_or(DecodeError::UnknownFormat)?;

    reader.no_limits();
    let image = reader.decode().map_err(|e| DecodeError::Malformed {
        format: format_to_string(format),
        message: e.to_string(),
    })?;
    decode_dynamic(image, format)
}

/// Byte-order mark plus version: 42 for classic TIFF, 43 for BigTIFF.
const TIFF_MAGICS: [&[u8; 4]; 4] = [b"II*\0", b"MM\0*", b"II+\0", b"MM\0+"];

fn is_tiff(bytes: &[u8]) -> bool {
    TIFF_MAGICS.iter().any(|magic| bytes.starts_with(*magic))
}

macro_rules! widen {
    ($samples:expr) => {
        $samples.into_iter().map(|s| s as f32).collect::<Vec<f32>>()
    };
}

fn decode_tiff(bytes: &[u8]) -> Result<DecodedImage, RasterError> {
    let malformed = |e: tiff::TiffError| DecodeError::Malformed {
        format: "tiff".to_string(),
        message: e.to_string(),
    };

    let mut decoder = Decoder::new(Cursor::new(bytes))
        .map_err(malformed)?
        .with_limits(Limits::unlimited());
    let (width, height) = decoder.dimensions().map_err(malformed)?;

    let samples = match decoder.read_image().map_err(malformed)? {
        DecodingResult::U8(v) => widen!(v),
        DecodingResult::U16(v) => widen!(v),
        DecodingResult::U32(v) => widen!(v),
        DecodingResult::U64(v) => widen!(v),
        DecodingResult::I8(v) => widen!(v),
        DecodingResult::I16(v) => widen!(v),
        DecodingResult::I32(v) => widen!(v),
        DecodingResult::I64(v) => widen!(v),
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => widen!(v),
    };

    Ok(DecodedImage::from_interleaved(
        width,
        height,
        samples,
        ImageFormat::Tiff,
    )?)
}

fn decode_dynamic(image: DynamicImage, format: ImageFormat) -> Result<DecodedImage, RasterError> {
    let (width, height) = (image.width(), image.height());
    let samples = match image {
        DynamicImage::ImageLuma8(buf) => widen!(buf.into_raw()),
        DynamicImage::ImageLumaA8(buf) => widen!(buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => widen!(buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => widen!(buf.into_raw()),
        DynamicImage::ImageLuma16(buf) => widen!(buf.into_raw()),
        DynamicImage::ImageLumaA16(buf) => widen!(buf.into_raw()),
        DynamicImage::ImageRgb16(buf) => widen!(buf.into_raw()),
        DynamicImage::ImageRgba16(buf) => widen!(buf.into_raw()),
        DynamicImage::ImageRgb32F(buf) => buf.into_raw(),
        DynamicImage::ImageRgba32F(buf) => buf.into_raw(),
        other => {
            return Err(DecodeError::UnsupportedLayout(format!("{:?}", other.color())).into())
        }
    };
    Ok(DecodedImage::from_interleaved(
        width, height, samples, format,
    )?)
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Encoders for building test rasters in memory.

    use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
    use std::io::Cursor;

    pub fn png_gray(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> Vec<u8> {
        let img = GrayImage::from_fn(width, height, |x, y| Luma([f(x, y)]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    pub fn png_rgb(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb(rgb));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    pub fn tiff_gray16(width: u32, height: u32, f: impl Fn(u32, u32) -> u16) -> Vec<u8> {
        let img: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_fn(width, height, |x, y| Luma([f(x, y)]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Tiff).unwrap();
        buf.into_inner()
    }

    /// Single-band 32-bit float TIFF, the usual GeoTIFF elevation layout.
    pub fn tiff_f32(width: u32, height: u32, data: &[f32]) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        let mut encoder = tiff::encoder::TiffEncoder::new(&mut buf).unwrap();
        encoder
            .write_image::<tiff::encoder::colortype::Gray32Float>(width, height, data)
            .unwrap();
        buf.into_inner()
    }

    /// Same layout as [`tiff_f32`] in a BigTIFF container.
    pub fn bigtiff_f32(width: u32, height: u32, data: &[f32]) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        let mut encoder = tiff::encoder::TiffEncoder::new_big(&mut buf).unwrap();
        encoder
            .write_image::<tiff::encoder::colortype::Gray32Float>(width, height, data)
            .unwrap();
        buf.into_inner()
    }
}
