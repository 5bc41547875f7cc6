//! SLIC superpixel segmentation in Rust.
//!
//! This crate partitions an 8-bit RGBA image into spatially compact,
//! perceptually coherent regions (superpixels) with the iterative
//! clustering scheme of SLIC, then draws the region boundaries onto a copy
//! of the input buffer. It is the computational core behind an interactive
//! viewer; everything around it (decoding, canvas plumbing, sliders
//! mapping to the two parameters) lives with the caller.
//!
//! The pipeline per call: convert the buffer to CIE Lab, seed cluster
//! centers on a grid, alternate windowed nearest-center assignment with
//! centroid updates for a bounded number of rounds, merge undersized
//! disconnected fragments, and overlay the boundaries:
//!
//! ```rust
//! use slic_superpixels::{segment, Config};
//!
//! let (width, height) = (64, 48);
//! let rgba = vec![127u8; width * height * 4];
//! let config = Config {
//!     num_of_superpixels: 32,
//!     compactness: 10.0,
//!     ..Config::default()
//! };
//! let result = segment(&rgba, width, height, &config).unwrap();
//! assert_eq!(result.buffer.len(), rgba.len());
//! assert!(result.num_labels >= 1);
//! ```
//!
//! The heavy phases (color conversion, assignment, centroid reduction,
//! boundary rendering) run on the rayon pool over disjoint horizontal
//! bands, so there are no locks and no atomics in the hot paths. Results
//! are deterministic for fixed inputs and configuration; distance ties go
//! to the lowest cluster index by construction.
//!
//! Lower-level pieces (`assign`, `slic::update`,
//! `connectivity::enforce_connectivity`) are public so callers can build a
//! custom loop, e.g. to reuse the label map without rendering boundaries
//! or to swap in the exhaustive-scan assignment for validation.

pub mod arrays;
pub mod assign;
pub mod boundary;
pub mod cielab;
pub mod cluster;
pub mod common;
pub mod connectivity;
pub mod slic;

pub use common::{Config, SegmentationError};
pub use slic::{segment, Segmentation};

#[cfg(test)]
pub(crate) mod test_support;
