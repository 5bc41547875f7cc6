use crate::arrays::Array2D;
use crate::common::{Config, SegmentationError};

/// Components are never kept below this many pixels, whatever the size
/// factor works out to. Keeps pathologically small images from ending up
/// as a scatter of single-digit fragments.
const MIN_COMPONENT_PIXELS: u32 = 8;

/// Connected-component relabeling pass.
///
/// Scans the label map in raster order and flood-fills every 4-connected
/// component of identical label exactly once. Components smaller than the
/// minimum size are absorbed into the most common neighboring component
/// that was already processed (ties toward the lowest label); surviving
/// components get fresh labels numbered densely from zero. The first
/// component has no processed neighbor and is always kept.
///
/// On success every final label is one 4-connected region with at least
/// one pixel. Returns [`SegmentationError::DegenerateConnectivity`] if the
/// pass would leave no regions at all.
pub fn enforce_connectivity(
    labels: &mut Array2D<u32>,
    config: &Config,
    search_region_size: usize,
) -> Result<u32, SegmentationError> {
    let width = labels.width;
    let height = labels.height;
    let num_pixels = width * height;
    let min_size = ((search_region_size * search_region_size) as f32 * config.min_size_factor)
        .round()
        .max(MIN_COMPONENT_PIXELS as f32) as u32;

    let mut relabeled: Vec<u32> = vec![u32::MAX; num_pixels];
    // Reused across components; worst case one component spans the image.
    let mut stack: Vec<usize> = Vec::new();
    let mut component: Vec<usize> = Vec::new();
    let mut next_label: u32 = 0;

    for start in 0..num_pixels {
        if relabeled[start] != u32::MAX {
            continue;
        }
        let old_label = labels.data[start];
        component.clear();
        stack.push(start);
        // Claim pixels as they enter the stack so none is pushed twice.
        relabeled[start] = u32::MAX - 1;
        while let Some(index) = stack.pop() {
            component.push(index);
            let x = index % width;
            let y = index / width;
            if x > 0 {
                flood_candidate(index - 1, old_label, labels, &mut relabeled, &mut stack);
            }
            if x + 1 < width {
                flood_candidate(index + 1, old_label, labels, &mut relabeled, &mut stack);
            }
            if y > 0 {
                flood_candidate(index - width, old_label, labels, &mut relabeled, &mut stack);
            }
            if y + 1 < height {
                flood_candidate(index + width, old_label, labels, &mut relabeled, &mut stack);
            }
        }

        let final_label = if (component.len() as u32) < min_size {
            match dominant_processed_neighbor(&component, width, height, &relabeled) {
                Some(neighbor_label) => neighbor_label,
                // Only the raster-first component can lack a processed
                // neighbor; it is kept whatever its size.
                None => {
                    let label = next_label;
                    next_label += 1;
                    label
                }
            }
        } else {
            let label = next_label;
            next_label += 1;
            label
        };
        for &index in &component {
            relabeled[index] = final_label;
        }
    }

    if next_label == 0 {
        return Err(SegmentationError::DegenerateConnectivity);
    }
    for (label, new) in labels.data.iter_mut().zip(relabeled) {
        debug_assert!(new < next_label);
        *label = new;
    }
    Ok(next_label)
}

#[inline(always)]
fn flood_candidate(
    index: usize,
    old_label: u32,
    labels: &Array2D<u32>,
    relabeled: &mut [u32],
    stack: &mut Vec<usize>,
) {
    if relabeled[index] == u32::MAX && labels.data[index] == old_label {
        relabeled[index] = u32::MAX - 1;
        stack.push(index);
    }
}

/// Most common final label among the component's 4-connected neighbors
/// that already carry one. Ties go to the lowest label so the merge is
/// independent of neighbor iteration order.
fn dominant_processed_neighbor(
    component: &[usize],
    width: usize,
    height: usize,
    relabeled: &[u32],
) -> Option<u32> {
    let mut counts: Vec<(u32, u32)> = Vec::new();
    let mut bump = |label: u32| {
        if label >= u32::MAX - 1 {
            return;
        }
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label, 1)),
        }
    };
    for &index in component {
        let x = index % width;
        let y = index / width;
        if x > 0 {
            bump(relabeled[index - 1]);
        }
        if x + 1 < width {
            bump(relabeled[index + 1]);
        }
        if y > 0 {
            bump(relabeled[index - width]);
        }
        if y + 1 < height {
            bump(relabeled[index + width]);
        }
    }
    counts
        .into_iter()
        .min_by(|(la, na), (lb, nb)| nb.cmp(na).then(la.cmp(lb)))
        .map(|(label, _)| label)
}
