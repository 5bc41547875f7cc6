use criterion::*;
use slic_superpixels::arrays::{Array2D, LabImage};
use slic_superpixels::assign::{assign, assign_exhaustive};
use slic_superpixels::boundary::draw_boundaries;
use slic_superpixels::common::Config;
use slic_superpixels::connectivity::enforce_connectivity;
use slic_superpixels::slic::{iterate, search_region, segment, spatial_coef, update, Clusters};
use std::time::Duration;

/// Deterministic RGBA noise frame; benchmarks must not depend on files.
fn noise_frame(width: usize, height: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E3779B97F4A7C15).wrapping_add(1);
    (0..width * height * 4)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as u8
        })
        .collect()
}

const FHD: (usize, usize) = (1920, 1080);

fn bench_lab_image_from_rgba(c: &mut Criterion) {
    let (width, height) = FHD;
    let frame = noise_frame(width, height, 1);
    c.bench_function("rgba_to_lab", |b| {
        b.iter(|| {
            let _ = black_box(LabImage::from_rgba(&frame, width, height));
        });
    });
}

fn bench_assign(c: &mut Criterion) {
    let (width, height) = FHD;
    let frame = noise_frame(width, height, 2);
    let image = LabImage::from_rgba(&frame, width, height);
    let config = Config::default();
    let s = search_region(width, height, config.num_of_superpixels);
    let coef = spatial_coef(&config, s);
    let mut clusters = Clusters::initialize_clusters(&image, &config);
    let mut min_distances = Array2D::from_fill(f32::INFINITY, width, height);
    c.bench_function("assign", |b| {
        b.iter(|| {
            black_box(assign(&image, &mut clusters, &mut min_distances, s, coef));
        });
    });
}

fn bench_assign_exhaustive(c: &mut Criterion) {
    // Quadratic in region count; a smaller frame keeps this bench usable.
    let (width, height) = (480, 270);
    let frame = noise_frame(width, height, 3);
    let image = LabImage::from_rgba(&frame, width, height);
    let config = Config::default();
    let s = search_region(width, height, config.num_of_superpixels);
    let coef = spatial_coef(&config, s);
    let mut clusters = Clusters::initialize_clusters(&image, &config);
    let mut min_distances = Array2D::from_fill(f32::INFINITY, width, height);
    c.bench_function("assign_exhaustive", |b| {
        b.iter(|| {
            black_box(assign_exhaustive(
                &image,
                &mut clusters,
                &mut min_distances,
                coef,
            ));
        });
    });
}

fn bench_update(c: &mut Criterion) {
    let (width, height) = FHD;
    let frame = noise_frame(width, height, 4);
    let image = LabImage::from_rgba(&frame, width, height);
    let config = Config::default();
    let s = search_region(width, height, config.num_of_superpixels);
    let coef = spatial_coef(&config, s);
    let mut clusters = Clusters::initialize_clusters(&image, &config);
    let mut min_distances = Array2D::from_fill(f32::INFINITY, width, height);
    assign(&image, &mut clusters, &mut min_distances, s, coef);
    c.bench_function("update", |b| {
        b.iter(|| {
            let _ = black_box(update(&mut clusters, &image));
        });
    });
}

fn bench_connectivity(c: &mut Criterion) {
    let (width, height) = FHD;
    let frame = noise_frame(width, height, 5);
    let image = LabImage::from_rgba(&frame, width, height);
    let config = Config::default();
    let s = search_region(width, height, config.num_of_superpixels);
    let mut clusters = Clusters::initialize_clusters(&image, &config);
    iterate(&image, &config, &mut clusters);
    c.bench_function("enforce_connectivity", |b| {
        b.iter_batched(
            || Array2D::from_slice(&clusters.labels.data, width, height).unwrap(),
            |mut labels| {
                let _ = black_box(enforce_connectivity(&mut labels, &config, s));
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_draw_boundaries(c: &mut Criterion) {
    let (width, height) = FHD;
    let frame = noise_frame(width, height, 6);
    let image = LabImage::from_rgba(&frame, width, height);
    let config = Config::default();
    let s = search_region(width, height, config.num_of_superpixels);
    let mut clusters = Clusters::initialize_clusters(&image, &config);
    iterate(&image, &config, &mut clusters);
    enforce_connectivity(&mut clusters.labels, &config, s).unwrap();
    c.bench_function("draw_boundaries", |b| {
        b.iter(|| {
            let _ = black_box(draw_boundaries(
                &clusters.labels,
                &frame,
                config.boundary_color,
            ));
        });
    });
}

fn bench_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment");
    for (name, (width, height)) in [("SD", (960, 540)), ("HD", (1280, 720)), ("FHD", FHD)] {
        let frame = noise_frame(width, height, 7);
        let config = Config::default();
        group.bench_function(BenchmarkId::new("noise", name), |b| {
            b.iter(|| {
                let _ = black_box(segment(&frame, width, height, &config).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(name = benches;
config = Criterion::default().measurement_time(Duration::from_secs(20)).warm_up_time(Duration::from_secs(5));
targets = bench_lab_image_from_rgba, bench_assign, bench_assign_exhaustive, bench_update, bench_connectivity, bench_draw_boundaries, bench_segment);
criterion_main!(benches);
