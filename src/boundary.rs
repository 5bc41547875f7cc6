use crate::arrays::Array2D;
use rayon::prelude::*;

/// Overlay region boundaries onto a copy of the caller's RGBA buffer.
///
/// A pixel is a boundary pixel when any of its 4-connected neighbors
/// carries a different label. Boundary pixels get their RGB channels
/// replaced by `color` with the alpha byte kept; every other pixel passes
/// through untouched. The pass only reads the label map and the input
/// buffer, so rows render in parallel with no ordering effects.
pub fn draw_boundaries(labels: &Array2D<u32>, rgba: &[u8], color: [u8; 3]) -> Vec<u8> {
    let width = labels.width;
    let height = labels.height;
    debug_assert_eq!(rgba.len(), width * height * 4);
    let mut output = rgba.to_vec();
    output
        .par_chunks_exact_mut(width * 4)
        .enumerate()
        .for_each(|(y, out_row)| {
            let row = labels.get_row(y);
            let row_above = (y > 0).then(|| labels.get_row(y - 1));
            let row_below = (y + 1 < height).then(|| labels.get_row(y + 1));
            for (x, pixel) in out_row.chunks_exact_mut(4).enumerate() {
                let label = row[x];
                let boundary = (x > 0 && row[x - 1] != label)
                    || (x + 1 < width && row[x + 1] != label)
                    || row_above.is_some_and(|r| r[x] != label)
                    || row_below.is_some_and(|r| r[x] != label);
                if boundary {
                    pixel[0..3].copy_from_slice(&color);
                }
            }
        });
    output
}
