//! Benchmarks for the raster preview pipeline.
//!
//! Run with: cargo bench -p geodash-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geodash_core::raster::{self, DecodedImage, PreviewEncoder};
use image::ImageFormat;
use std::io::Cursor;

const WIDTH: u32 = 4000;
const HEIGHT: u32 = 2000;

fn ramp(width: u32, height: u32) -> Vec<f32> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (x + y) as f32 * 0.5))
        .collect()
}

fn ramp_image() -> DecodedImage {
    DecodedImage::from_interleaved(WIDTH, HEIGHT, ramp(WIDTH, HEIGHT), ImageFormat::Tiff).unwrap()
}

fn ramp_tiff() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    tiff::encoder::TiffEncoder::new(&mut buf)
        .unwrap()
        .write_image::<tiff::encoder::colortype::Gray32Float>(WIDTH, HEIGHT, &ramp(WIDTH, HEIGHT))
        .unwrap();
    buf.into_inner()
}

fn benchmark_decimate(c: &mut Criterion) {
    let image = ramp_image();

    c.bench_function("decimate_4000x2000", |b| {
        b.iter(|| raster::decimate(black_box(image.clone()), 1000))
    });
}

fn benchmark_normalize(c: &mut Criterion) {
    let image = raster::decimate(ramp_image(), 1000);

    c.bench_function("normalize_1000x500", |b| {
        b.iter(|| raster::normalize(black_box(image.clone())))
    });
}

fn benchmark_encode(c: &mut Criterion) {
    let image = raster::normalize(raster::decimate(ramp_image(), 1000));

    c.bench_function("encode_png_1000x500", |b| {
        b.iter(|| PreviewEncoder::encode(black_box(image.clone())))
    });
}

fn benchmark_render_preview(c: &mut Criterion) {
    let raw = ramp_tiff();

    c.bench_function("render_preview_tiff_f32", |b| {
        b.iter(|| raster::render_preview(black_box(&raw), 1000))
    });
}

criterion_group!(
    benches,
    benchmark_decimate,
    benchmark_normalize,
    benchmark_encode,
    benchmark_render_preview
);
criterion_main!(benches);
