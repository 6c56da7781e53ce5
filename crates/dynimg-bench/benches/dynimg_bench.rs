//! Benchmarks for dynimg operations.
//!
//! Run with: `cargo bench`

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use dynimg::{ColorModel, DynamicImage, EncodeOptions, FilterKind, ImageFormat, Limits, PixelBuffer};

/// Deterministic RGBA8 test image.
fn test_image(width: u32, height: u32) -> DynamicImage {
    let data = (0..width * height * 4).map(|i| (i.wrapping_mul(31) % 251) as u8).collect();
    match PixelBuffer::from_raw_u8(width, height, ColorModel::Rgba8, data).and_then(DynamicImage::from_buffer) {
        Ok(img) => img,
        Err(e) => panic!("bad bench image: {e}"),
    }
}

/// Benchmark resampling per filter.
fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize");
    let img = test_image(512, 512);
    group.throughput(Throughput::Elements(256 * 256));

    for filter in FilterKind::ALL {
        group.bench_with_input(BenchmarkId::new("512_to_256", format!("{filter:?}")), &filter, |b, &f| {
            b.iter(|| img.resize_exact(black_box(256), black_box(256), f))
        });
    }

    group.bench_function("thumbnail_64", |b| b.iter(|| img.thumbnail(black_box(64), black_box(64))));

    group.finish();
}

/// Benchmark separable blur at several radii.
fn bench_blur(c: &mut Criterion) {
    let mut group = c.benchmark_group("blur");
    let img = test_image(256, 256);
    group.throughput(Throughput::Elements(256 * 256));

    for sigma in [0.5f32, 2.0, 8.0] {
        group.bench_with_input(BenchmarkId::new("rgba8", sigma), &sigma, |b, &s| {
            b.iter(|| img.blur(black_box(s)))
        });
    }

    let float = img.to_rgba32f();
    group.bench_function("rgba32f_2.0", |b| b.iter(|| float.blur(black_box(2.0))));

    group.finish();
}

/// Benchmark layout conversion and point ops.
fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("color");
    let img = test_image(512, 512);
    group.throughput(Throughput::Elements(512 * 512));

    for model in [ColorModel::L8, ColorModel::Rgb16, ColorModel::Rgba32F] {
        group.bench_with_input(BenchmarkId::new("convert", model), &model, |b, &m| {
            b.iter(|| dynimg_ops::convert::convert(img.buffer(), black_box(m)))
        });
    }

    group.bench_function("brighten", |b| b.iter(|| img.brighten(black_box(20))));
    group.bench_function("huerotate", |b| b.iter(|| img.huerotate(black_box(90))));
    group.bench_function("grayscale", |b| b.iter(|| img.grayscale()));

    group.finish();
}

/// Benchmark pixel iteration through the type-erased iterator.
fn bench_pixels(c: &mut Criterion) {
    let mut group = c.benchmark_group("pixels");

    for size in [64u32, 256, 1024] {
        let img = test_image(size, size);
        group.throughput(Throughput::Elements(u64::from(size) * u64::from(size)));

        group.bench_with_input(BenchmarkId::new("sum_red", size), &img, |b, img| {
            b.iter(|| img.pixels().fold(0u64, |acc, (_, _, px)| acc + u64::from(px.r())))
        });

        group.bench_with_input(BenchmarkId::new("step_by_7", size), &img, |b, img| {
            b.iter(|| img.pixels().step_by(black_box(7)).count())
        });
    }

    group.finish();
}

/// Benchmark PNG encode and decode.
fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let img = test_image(256, 256);
    let opts = EncodeOptions::default();
    let png = match img.encode(ImageFormat::Png, &opts) {
        Ok(bytes) => bytes,
        Err(e) => panic!("png encode failed: {e}"),
    };
    group.throughput(Throughput::Bytes(png.len() as u64));

    group.bench_function("png_encode", |b| b.iter(|| img.encode(ImageFormat::Png, black_box(&opts))));
    group.bench_function("png_decode", |b| {
        b.iter(|| dynimg::load(black_box(&png), &Limits::default()))
    });

    group.finish();
}

criterion_group!(benches, bench_resize, bench_blur, bench_color, bench_pixels, bench_codec);
criterion_main!(benches);
