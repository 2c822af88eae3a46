//! Benchmarks for retouch operations.
//!
//! Run with: `cargo bench`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use retouch_bench::{sample_photo, SIZES};
use retouch_ops::filter::{self, Kernel};
use retouch_ops::resize::ResizeFilter;
use retouch_ops::{transform, AdjustmentParams, AdjustmentPipeline, FilterCatalog};
use retouch_session::{EditSession, TransformOp};

/// Full adjustment pipeline, color-only and with every spatial stage.
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let pipeline = AdjustmentPipeline::new();

    let color_only = AdjustmentParams {
        brightness: 110.0,
        contrast: 120.0,
        saturation: 80.0,
        hue: 15.0,
        temperature: 20.0,
        ..Default::default()
    };
    let everything = AdjustmentParams {
        blur: 3.0,
        sharpen: 40.0,
        vignette: 30.0,
        noise: 10.0,
        ..color_only
    };

    for size in SIZES {
        let img = sample_photo(size, size).unwrap();
        group.throughput(Throughput::Elements(img.pixel_count() as u64));

        group.bench_with_input(BenchmarkId::new("color", size), &img, |b, img| {
            b.iter(|| pipeline.apply(black_box(img), &color_only))
        });

        group.bench_with_input(BenchmarkId::new("all_stages", size), &img, |b, img| {
            b.iter(|| pipeline.apply(black_box(img), &everything))
        });
    }

    group.finish();
}

/// Blurs and kernel convolution.
fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolution");
    let sharpen = Kernel::sharpen();
    let gauss5 = Kernel::gaussian(2, 1.0);

    for size in SIZES {
        let img = sample_photo(size, size).unwrap();
        group.throughput(Throughput::Elements(img.pixel_count() as u64));

        for radius in [1usize, 5, 20] {
            group.bench_with_input(
                BenchmarkId::new(format!("box_blur_r{}", radius), size),
                &img,
                |b, img| b.iter(|| filter::box_blur(black_box(img), radius)),
            );
        }

        group.bench_with_input(BenchmarkId::new("gaussian_s2", size), &img, |b, img| {
            b.iter(|| filter::gaussian_blur(black_box(img), 2.0))
        });

        group.bench_with_input(BenchmarkId::new("sharpen_3x3", size), &img, |b, img| {
            b.iter(|| filter::convolve(black_box(img), &sharpen, 1.0, 0.0))
        });

        group.bench_with_input(BenchmarkId::new("normalized_5x5", size), &img, |b, img| {
            b.iter(|| filter::convolve_normalized(black_box(img), &gauss5))
        });
    }

    group.finish();
}

/// Every built-in filter at one size.
fn bench_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog");
    let catalog = FilterCatalog::with_builtins();
    let img = sample_photo(512, 512).unwrap();
    group.throughput(Throughput::Elements(img.pixel_count() as u64));

    for def in catalog.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(def.name()), &img, |b, img| {
            b.iter(|| def.apply(black_box(img)).unwrap())
        });
    }

    group.finish();
}

/// Geometry: lossless turns, free rotation, resampling.
fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    let img = sample_photo(1024, 768).unwrap();
    group.throughput(Throughput::Elements(img.pixel_count() as u64));

    group.bench_function("rotate_90_cw", |b| {
        b.iter(|| transform::rotate_90_cw(black_box(&img)))
    });

    group.bench_function("rotate_30", |b| {
        b.iter(|| transform::rotate(black_box(&img), 30.0, [0, 0, 0, 0]).unwrap())
    });

    group.bench_function("flip_horizontal", |b| {
        b.iter(|| transform::flip_horizontal(black_box(&img)))
    });

    for filter in [ResizeFilter::Nearest, ResizeFilter::Bilinear] {
        group.bench_with_input(
            BenchmarkId::new("half_size", format!("{:?}", filter)),
            &filter,
            |b, &f| b.iter(|| retouch_ops::resize::scale(black_box(&img), 0.5, f).unwrap()),
        );
    }

    group.finish();
}

/// Commit and undo cost with snapshot history.
fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    let img = sample_photo(512, 512).unwrap();

    group.bench_function("filter_commit_undo", |b| {
        let mut session = EditSession::new(img.clone());
        b.iter(|| {
            session.apply_filter("invert").unwrap();
            session.undo().unwrap();
        })
    });

    group.bench_function("transform_commit", |b| {
        let mut session = EditSession::new(img.clone());
        b.iter(|| session.apply_transform(TransformOp::FlipVertical).unwrap())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_pipeline,
    bench_convolution,
    bench_catalog,
    bench_transform,
    bench_session,
);

criterion_main!(benches);
