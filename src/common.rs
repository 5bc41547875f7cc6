use std::ops::Range;

/// Main config for one segmentation call.
///
/// The two parameters a caller normally touches are `num_of_superpixels`
/// and `compactness`; the remaining fields are tuning constants with
/// defaults that match the reference behavior.
#[derive(Clone, Debug)]
pub struct Config {
    /// Target number of superpixels. This directly influences the grid
    /// step and search region size (_S_):
    ///
    /// _S = sqrt((image width * height) / num_of_superpixels)_
    ///
    /// The seed grid rounds to whole cells, so the actual region count can
    /// differ slightly from the request. Practical range is roughly 8-2048.
    pub num_of_superpixels: u32,
    /// Compactness weight _m_. Low values favor color fidelity and
    /// irregular boundaries; high values favor spatially regular, nearly
    /// square regions. Must be positive.
    pub compactness: f32,
    /// Upper bound on assignment/update rounds.
    pub max_iterations: u16,
    /// Rounds that always run before the early-stop check applies.
    /// Spatial compactness needs a few iterations to stabilize.
    pub min_iterations: u16,
    /// Early-stop threshold on the summed center movement in joint
    /// (L, a, b, x, y) space per iteration. Zero disables early stopping
    /// and all `max_iterations` rounds run.
    pub convergence_threshold: f32,
    /// Relocate each seed to the lowest-gradient pixel of its 3x3
    /// neighborhood so seeds avoid sitting on strong edges.
    pub perturb_seeds: bool,
    /// Connected components smaller than `S * S * min_size_factor` pixels
    /// are merged into a neighboring region.
    pub min_size_factor: f32,
    /// RGB color written over boundary pixels; alpha is never touched.
    pub boundary_color: [u8; 3],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_of_superpixels: 256,
            compactness: 10f32,
            max_iterations: 10,
            min_iterations: 4,
            convergence_threshold: 1f32,
            perturb_seeds: true,
            min_size_factor: 0.25,
            boundary_color: [255, 0, 0],
        }
    }
}

/// Errors surfaced by [`crate::slic::segment`].
///
/// Everything else (seeds landing on image edges, clusters with zero
/// members mid-run, distance ties) is resolved internally by deterministic
/// policies and never reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SegmentationError {
    /// Width or height is zero. No partial result is produced.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// The RGBA buffer length does not match `width * height * 4`.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    /// Requested region count outside `[1, pixel_count]`.
    #[error("region count {requested} outside [1, {pixels}]")]
    InvalidRegionCount { requested: u32, pixels: usize },

    /// Connectivity enforcement would have removed every region.
    #[error("connectivity enforcement left no regions")]
    DegenerateConnectivity,
}

pub(crate) fn split_length_to_ranges(length: usize, splits: usize) -> Vec<Range<usize>> {
    let chunk_size = length / splits;
    let rem = length % splits;
    (0..splits)
        .scan((rem, 0usize), |(r, acc), _split| {
            let mut size = chunk_size;
            if *r > 0 {
                *r -= 1;
                size += 1;
            }
            let out = (*acc, *acc + size);
            *acc += size;
            Some(out.0..out.1)
        })
        .filter(|r| !r.is_empty())
        .collect()
}
