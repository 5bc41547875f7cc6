use crate::arrays::{Array2D, LabImage};
use crate::assign::assign;
use crate::boundary::draw_boundaries;
use crate::cluster::{Cluster, ClusterAccumulator};
use crate::common::{split_length_to_ranges, Config, SegmentationError};
use crate::connectivity::enforce_connectivity;
use rayon::current_num_threads;
use rayon::prelude::*;

/// Grid step / search window half-width _S_ in whole pixels, at least 1.
pub fn search_region(width: usize, height: usize, num_of_superpixels: u32) -> usize {
    let s = ((width * height) as f32 / num_of_superpixels as f32).sqrt();
    s.max(1.0).round() as usize
}

/// Weight of the squared spatial term: `(m / S)^2`.
pub fn spatial_coef(config: &Config, search_region_size: usize) -> f32 {
    let m = config.compactness / search_region_size as f32;
    m * m
}

/// Convenient struct for passing values around.
pub struct Clusters {
    /// For every pixel, the cluster it currently belongs to
    /// (see `Cluster::number`); `u32::MAX` until the first assignment.
    pub labels: Array2D<u32>,
    pub clusters: Vec<Cluster>,
}

impl Clusters {
    /// Default cluster initializer: seeds on a grid stepped close to _S_
    /// per axis, offset half a cell so seeds sit inside cells, each seed
    /// sampling its pixel's Lab value. The grid rounds to whole cells, so
    /// the seed count tracks but does not always equal the request.
    ///
    /// With `Config::perturb_seeds` every seed then slides to the lowest
    /// color-gradient position of its 3x3 neighborhood, which keeps seeds
    /// off strong edges. Seeds on the image border skip the slide.
    pub fn initialize_clusters(image: &LabImage, config: &Config) -> Clusters {
        assert!(config.num_of_superpixels >= 1);
        let s = ((image.width * image.height) as f32 / config.num_of_superpixels as f32)
            .sqrt()
            .max(1.0);
        let n_x = (image.width as f32 / s).round().max(1.0) as usize;
        let n_y = (image.height as f32 / s).round().max(1.0) as usize;
        let step_x = image.width as f32 / n_x as f32;
        let step_y = image.height as f32 / n_y as f32;
        let mut clusters = Clusters {
            labels: Array2D::from_fill(u32::MAX, image.width, image.height),
            clusters: Vec::with_capacity(n_x * n_y),
        };
        for grid_y in 0..n_y {
            for grid_x in 0..n_x {
                let mut x =
                    (((grid_x as f32 + 0.5) * step_x) as usize).min(image.width - 1);
                let mut y =
                    (((grid_y as f32 + 0.5) * step_y) as usize).min(image.height - 1);
                if config.perturb_seeds {
                    (x, y) = lowest_gradient_neighbor(image, x, y);
                }
                let p = image.get_pixel(x, y);
                clusters.clusters.push(Cluster {
                    x: x as f32,
                    y: y as f32,
                    l: p[0],
                    a: p[1],
                    b: p[2],
                    number: clusters.clusters.len() as u32,
                    num_members: 0,
                });
            }
        }
        debug_assert!(!clusters.clusters.is_empty());
        clusters
    }
}

/// Squared Lab gradient magnitude at an interior pixel: color difference
/// of the horizontal neighbors plus that of the vertical neighbors.
fn gradient(image: &LabImage, x: usize, y: usize) -> f32 {
    let left = image.get_pixel(x - 1, y);
    let right = image.get_pixel(x + 1, y);
    let up = image.get_pixel(x, y - 1);
    let down = image.get_pixel(x, y + 1);
    let mut g = 0f32;
    for c in 0..3 {
        let dh = right[c] - left[c];
        let dv = down[c] - up[c];
        g += dh * dh + dv * dv;
    }
    g
}

/// Position with the smallest gradient in the 3x3 neighborhood of
/// (x, y); candidates whose own gradient stencil would leave the image
/// are skipped. Ties keep the earliest candidate in scan order, and the
/// scan starts at the seed itself so a flat neighborhood is a no-op.
fn lowest_gradient_neighbor(image: &LabImage, x: usize, y: usize) -> (usize, usize) {
    let interior = |px: usize, py: usize| {
        px >= 1 && px + 1 < image.width && py >= 1 && py + 1 < image.height
    };
    if !interior(x, y) {
        return (x, y);
    }
    let mut best = (x, y);
    let mut best_gradient = gradient(image, x, y);
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            let px = (x as i64 + dx) as usize;
            let py = (y as i64 + dy) as usize;
            if (px, py) == (x, y) || !interior(px, py) {
                continue;
            }
            let g = gradient(image, px, py);
            if g < best_gradient {
                best_gradient = g;
                best = (px, py);
            }
        }
    }
    best
}

/// Update step: every cluster center moves to the arithmetic mean of its
/// member pixels in (L, a, b, x, y).
///
/// Accumulation runs over horizontal bands on the rayon pool, each band
/// filling its own accumulator vector; the partial vectors merge at the
/// join point (sum and count are associative, so the reduction order
/// cannot change the result). Returns the summed center movement, the
/// residual driving the early-stop check.
pub fn update(clusters: &mut Clusters, image: &LabImage) -> f32 {
    let num_clusters = clusters.clusters.len();
    let labels = &clusters.labels;
    let bands = split_length_to_ranges(image.height, current_num_threads());
    let partials: Vec<Vec<ClusterAccumulator>> = bands
        .into_par_iter()
        .map(|rows| {
            let mut local = vec![ClusterAccumulator::default(); num_clusters];
            for row in rows {
                let image_row = image.get_row(row);
                let labels_row = labels.get_row(row);
                for (column, (pixel, &label)) in
                    image_row.chunks_exact(4).zip(labels_row).enumerate()
                {
                    if label == u32::MAX {
                        continue;
                    }
                    local[label as usize].add_pixel(pixel, column, row);
                }
            }
            local
        })
        .collect();
    // Merge in band order. Float sums are only associative up to rounding,
    // so a scheduling-dependent reduction tree would cost the determinism
    // guarantee.
    let mut accumulators = vec![ClusterAccumulator::default(); num_clusters];
    for local in &partials {
        for (acc, part) in accumulators.iter_mut().zip(local) {
            acc.merge(part);
        }
    }

    let mut residual = 0f32;
    for (cluster, accumulator) in clusters.clusters.iter_mut().zip(&accumulators) {
        let previous = cluster.clone();
        accumulator.apply(cluster);
        residual += cluster.movement(&previous);
    }
    residual
}

/// The main loop: alternating assignment and update rounds.
///
/// Runs up to `Config::max_iterations` rounds. Once at least
/// `Config::min_iterations` rounds have finished, a round whose summed
/// center movement drops below `Config::convergence_threshold` ends the
/// loop early; a zero threshold disables the early exit.
pub fn iterate(image: &LabImage, config: &Config, clusters: &mut Clusters) {
    let search_region_size = search_region(image.width, image.height, config.num_of_superpixels);
    let coef = spatial_coef(config, search_region_size);
    let mut min_distances = Array2D::from_fill(f32::INFINITY, image.width, image.height);
    for iteration in 0..config.max_iterations {
        assign(
            image,
            clusters,
            &mut min_distances,
            search_region_size,
            coef,
        );
        let residual = update(clusters, image);
        if config.convergence_threshold > 0.0
            && iteration + 1 >= config.min_iterations
            && residual < config.convergence_threshold
        {
            break;
        }
    }
}

/// Result of one segmentation call.
#[derive(Debug)]
pub struct Segmentation {
    /// RGBA buffer of the input's dimensions with region boundaries drawn
    /// in `Config::boundary_color`; alpha bytes are copied through.
    pub buffer: Vec<u8>,
    /// Final label per pixel: dense indices in `0..num_labels`, every
    /// label one 4-connected region.
    pub labels: Array2D<u32>,
    /// Number of distinct labels in `labels`.
    pub num_labels: u32,
}

/// Segment a packed 8-bit RGBA image into superpixels and draw the region
/// boundaries onto a copy of it.
///
/// This is the single entry point the embedding layer calls. Inputs are
/// validated here regardless of what the caller promises: zero dimensions,
/// a buffer whose length disagrees with them, and a region count outside
/// `[1, pixel_count]` all fail without a partial result. The call is
/// synchronous, holds no global state, and is deterministic for fixed
/// inputs and config.
pub fn segment(
    rgba: &[u8],
    width: usize,
    height: usize,
    config: &Config,
) -> Result<Segmentation, SegmentationError> {
    if width == 0 || height == 0 {
        return Err(SegmentationError::InvalidDimensions { width, height });
    }
    let expected = width * height * 4;
    if rgba.len() != expected {
        return Err(SegmentationError::BufferSize {
            expected,
            actual: rgba.len(),
        });
    }
    let pixels = width * height;
    if config.num_of_superpixels < 1 || config.num_of_superpixels as usize > pixels {
        return Err(SegmentationError::InvalidRegionCount {
            requested: config.num_of_superpixels,
            pixels,
        });
    }
    assert!(config.compactness > 0.0);

    let image = LabImage::from_rgba(rgba, width, height);
    let mut clusters = Clusters::initialize_clusters(&image, config);
    iterate(&image, config, &mut clusters);
    let search_region_size = search_region(width, height, config.num_of_superpixels);
    let num_labels = enforce_connectivity(&mut clusters.labels, config, search_region_size)?;
    let buffer = draw_boundaries(&clusters.labels, rgba, config.boundary_color);
    Ok(Segmentation {
        buffer,
        labels: clusters.labels,
        num_labels,
    })
}
