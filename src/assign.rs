use crate::arrays::{Array2D, LabImage};
use crate::cluster::Cluster;
use crate::common::split_length_to_ranges;
use crate::slic::Clusters;
use assume::assume;
use multiversion::multiversion;
use rayon::current_num_threads;
use std::ops::Range;

/// Pixel-rectangle a cluster can claim in one assignment round: rows
/// `top..bottom`, columns `left..=right`, clamped to the image.
struct ClusterWindow {
    top: usize,
    bottom: usize,
    left: usize,
    right: usize,
}

impl ClusterWindow {
    fn new(cluster: &Cluster, image: &LabImage, search_region_size: usize) -> Self {
        Self {
            top: cluster.top(search_region_size),
            bottom: cluster.bottom(image, search_region_size),
            left: cluster.left(search_region_size),
            right: cluster.right(image, search_region_size),
        }
    }
}

/// Assignment step: every pixel is claimed by the nearest center among
/// those whose `2S x 2S` search window covers it.
///
/// The combined distance is compared in squared form,
/// `d_color^2 + (d_space^2) * (m/S)^2`, which has the same argmin as the
/// rooted metric. Clusters sweep in index order and claim on a strictly
/// smaller distance, so ties deterministically go to the lowest index.
///
/// The image is cut into horizontal bands, one rayon task per band. Each
/// band exclusively owns its label and distance rows, so no synchronization
/// is needed; a pixel sees the same candidate clusters in the same order no
/// matter how the bands are cut.
///
/// A pixel covered by no window this round keeps its previous label; the
/// seed grid guarantees full coverage of the first round.
pub fn assign(
    image: &LabImage,
    clusters: &mut Clusters,
    min_distances: &mut Array2D<f32>,
    search_region_size: usize,
    spatial_coef: f32,
) {
    min_distances.fill(f32::INFINITY);
    let windows: Vec<ClusterWindow> = clusters
        .clusters
        .iter()
        .map(|c| ClusterWindow::new(c, image, search_region_size))
        .collect();
    let bands = split_length_to_ranges(image.height, current_num_threads());
    let label_bands = clusters.labels.split_row_bands_mut(&bands);
    let dist_bands = min_distances.split_row_bands_mut(&bands);
    let centers: &[Cluster] = &clusters.clusters;
    let windows_ref: &[ClusterWindow] = &windows;
    rayon::scope(|s| {
        for ((band, labels_band), dists_band) in
            bands.iter().zip(label_bands).zip(dist_bands)
        {
            let rows = band.clone();
            s.spawn(move |_| {
                assign_band(
                    image,
                    centers,
                    windows_ref,
                    rows,
                    labels_band,
                    dists_band,
                    spatial_coef,
                );
            });
        }
    });
}

fn assign_band(
    image: &LabImage,
    centers: &[Cluster],
    windows: &[ClusterWindow],
    rows: Range<usize>,
    labels: &mut [u32],
    dists: &mut [f32],
    spatial_coef: f32,
) {
    let width = image.width;
    debug_assert_eq!(labels.len(), rows.len() * width);
    debug_assert_eq!(dists.len(), rows.len() * width);
    // Ascending index order is what makes the tie-break policy hold.
    let relevant: Vec<usize> = (0..centers.len())
        .filter(|&i| windows[i].bottom > rows.start && windows[i].top < rows.end)
        .collect();
    for row in rows.clone() {
        let local = row - rows.start;
        let labels_row = &mut labels[local * width..(local + 1) * width];
        let dists_row = &mut dists[local * width..(local + 1) * width];
        for &ci in &relevant {
            let window = &windows[ci];
            if row < window.top || row >= window.bottom {
                continue;
            }
            let cluster = &centers[ci];
            let image_row = image.get_row_part(row, window.left, window.right);
            let dy = row as f32 - cluster.y;
            assign_row(
                image_row,
                cluster,
                window.left,
                dy * dy,
                spatial_coef,
                &mut dists_row[window.left..=window.right],
                &mut labels_row[window.left..=window.right],
            );
        }
    }
}

#[multiversion(targets = "simd")]
fn assign_row(
    image_row: &[f32],
    cluster: &Cluster,
    left: usize,
    dy2: f32,
    spatial_coef: f32,
    dists_row: &mut [f32],
    labels_row: &mut [u32],
) {
    assume!(unsafe: image_row.len() == dists_row.len() * 4);
    assume!(unsafe: labels_row.len() == dists_row.len());
    let (cl, ca, cb) = (cluster.l, cluster.a, cluster.b);
    let number = cluster.number;
    for (column, (pixel, (min_dist, label))) in image_row
        .chunks_exact(4)
        .zip(dists_row.iter_mut().zip(labels_row.iter_mut()))
        .enumerate()
    {
        let dl = pixel[0] - cl;
        let da = pixel[1] - ca;
        let db = pixel[2] - cb;
        let dx = (left + column) as f32 - cluster.x;
        let distance = dl * dl + da * da + db * db + (dx * dx + dy2) * spatial_coef;
        if distance < *min_dist {
            *min_dist = distance;
            *label = number;
        }
    }
}

/// Full-scan assignment: every pixel against every center, no search
/// window. Quadratic in region count; kept as an independent correctness
/// oracle for [`assign`] and for experiments where the window bound is
/// unwanted.
pub fn assign_exhaustive(
    image: &LabImage,
    clusters: &mut Clusters,
    min_distances: &mut Array2D<f32>,
    spatial_coef: f32,
) {
    min_distances.fill(f32::INFINITY);
    let centers: &[Cluster] = &clusters.clusters;
    for row in 0..image.height {
        let labels_row = clusters.labels.get_row_mut(row);
        let dists_row =
            &mut min_distances.data[row * image.width..(row + 1) * image.width];
        for cluster in centers {
            let image_row = image.get_row_part(row, 0, image.width - 1);
            let dy = row as f32 - cluster.y;
            assign_row(
                image_row,
                cluster,
                0,
                dy * dy,
                spatial_coef,
                dists_row,
                labels_row,
            );
        }
    }
}
