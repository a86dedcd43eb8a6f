use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{GrayImage, Luma, Rgb, RgbImage};
use match_colors::{Classify, ColorMatcher, ColorNameTable, MatcherConfig, MaskRefiner};

fn benchmark_classify(c: &mut Criterion) {
    let table = Arc::new(ColorNameTable::from_prototypes());
    let matcher = ColorMatcher::with_table(MatcherConfig::default(), Arc::clone(&table));

    let train_image = RgbImage::from_pixel(128, 128, Rgb([250, 5, 5]));
    let train_mask = GrayImage::from_pixel(128, 128, Luma([255]));
    matcher
        .train("red_ball", &train_image, &train_mask)
        .expect("training scene is non-empty");

    let image = RgbImage::from_pixel(128, 128, Rgb([245, 12, 12]));
    let mask = GrayImage::from_pixel(128, 128, Luma([255]));

    c.bench_function("classify_128x128", |b| {
        b.iter(|| matcher.classify(black_box(&image), black_box(&mask)))
    });
}

fn benchmark_mask_refine(c: &mut Criterion) {
    let refiner = MaskRefiner::new();
    let mask = GrayImage::from_pixel(128, 128, Luma([255]));

    c.bench_function("refine_mask_128x128", |b| {
        b.iter(|| refiner.refine(black_box(&mask)))
    });
}

fn benchmark_table_construction(c: &mut Criterion) {
    c.bench_function("table_from_prototypes", |b| {
        b.iter(ColorNameTable::from_prototypes)
    });
}

criterion_group!(
    benches,
    benchmark_classify,
    benchmark_mask_refine,
    benchmark_table_construction
);
criterion_main!(benches);
