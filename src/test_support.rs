//! Synthetic image fixtures and label-map checks shared by the unit tests.
//! Everything here is deterministic so test failures reproduce exactly.

use crate::arrays::Array2D;

/// Deterministic pseudo-random RGBA noise from a 64-bit LCG.
pub fn noise_rgba(width: usize, height: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E3779B97F4A7C15).wrapping_add(1);
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as u8
    };
    (0..width * height * 4).map(|_| next()).collect()
}

pub fn solid_rgba(width: usize, height: usize, color: [u8; 4]) -> Vec<u8> {
    color.repeat(width * height)
}

/// Two flat colors split at `split_x`: columns `0..split_x` take `left`,
/// the rest take `right`.
pub fn vertical_edge_rgba(
    width: usize,
    height: usize,
    left: [u8; 4],
    right: [u8; 4],
    split_x: usize,
) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(width * height * 4);
    for _ in 0..height {
        for x in 0..width {
            rgba.extend_from_slice(if x < split_x { &left } else { &right });
        }
    }
    rgba
}

/// Size of the 4-connected same-label component containing `start`,
/// independent of the crate's own connectivity code.
fn component_size(labels: &Array2D<u32>, start: usize) -> usize {
    let (width, height) = (labels.width, labels.height);
    let target = labels.data[start];
    let mut seen = vec![false; width * height];
    let mut stack = vec![start];
    seen[start] = true;
    let mut size = 0;
    while let Some(i) = stack.pop() {
        size += 1;
        let (x, y) = (i % width, i / width);
        let mut visit = |j: usize, seen: &mut Vec<bool>, stack: &mut Vec<usize>| {
            if !seen[j] && labels.data[j] == target {
                seen[j] = true;
                stack.push(j);
            }
        };
        if x > 0 {
            visit(i - 1, &mut seen, &mut stack);
        }
        if x + 1 < width {
            visit(i + 1, &mut seen, &mut stack);
        }
        if y > 0 {
            visit(i - width, &mut seen, &mut stack);
        }
        if y + 1 < height {
            visit(i + width, &mut seen, &mut stack);
        }
    }
    size
}

/// Asserts that every label's pixel set forms a single 4-connected
/// region: the flood fill from a label's first pixel must reach all of
/// its pixels.
pub fn assert_labels_connected(labels: &Array2D<u32>) {
    use std::collections::HashMap;
    let mut counts: HashMap<u32, usize> = HashMap::new();
    let mut first_index: HashMap<u32, usize> = HashMap::new();
    for (i, &label) in labels.data.iter().enumerate() {
        *counts.entry(label).or_insert(0) += 1;
        first_index.entry(label).or_insert(i);
    }
    for (label, &start) in &first_index {
        assert_eq!(
            component_size(labels, start),
            counts[label],
            "label {label} is disconnected"
        );
    }
}

/// Number of pixels having at least one 4-connected neighbor with a
/// different label; the total boundary perimeter of the map.
pub fn boundary_pixel_count(labels: &Array2D<u32>) -> usize {
    let (width, height) = (labels.width, labels.height);
    let mut count = 0;
    for y in 0..height {
        for x in 0..width {
            let label = labels[(x, y)];
            let boundary = (x > 0 && labels[(x - 1, y)] != label)
                || (x + 1 < width && labels[(x + 1, y)] != label)
                || (y > 0 && labels[(x, y - 1)] != label)
                || (y + 1 < height && labels[(x, y + 1)] != label);
            if boundary {
                count += 1;
            }
        }
    }
    count
}
