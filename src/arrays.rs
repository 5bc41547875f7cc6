use crate::cielab::srgb_to_cielab_pixel;
use aligned_vec::{AVec, ConstAlign};
use rayon::current_num_threads;
use std::ops::{Index, IndexMut, Range};

const ALIGN: usize = 64;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("data length does not match width * height")]
    DimensionMismatch,
}

/// Dense row-major 2D array over a 64-byte aligned backing vector.
#[derive(Debug)]
pub struct Array2D<T> {
    pub data: AVec<T, ConstAlign<ALIGN>>,
    pub width: usize,
    pub height: usize,
}

impl<T> Array2D<T> {
    pub fn from_slice(data: &[T], width: usize, height: usize) -> Result<Self, Error>
    where
        T: Clone,
    {
        if data.len() != width * height {
            return Err(Error::DimensionMismatch);
        }
        Ok(Self {
            width,
            height,
            data: AVec::from_slice(ALIGN, data),
        })
    }

    pub fn from_fill(value: T, width: usize, height: usize) -> Self
    where
        T: Clone + Copy,
    {
        let data: AVec<T, ConstAlign<ALIGN>> =
            AVec::from_iter(ALIGN, (0..width * height).map(|_| value));
        Self {
            width,
            height,
            data,
        }
    }

    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.data.fill(value)
    }

    #[inline(always)]
    pub fn get_row(&self, row: usize) -> &[T] {
        debug_assert!(row < self.height);
        &self.data[(self.width * row)..(self.width * row + self.width)]
    }

    pub fn get_row_mut(&mut self, row: usize) -> &mut [T] {
        debug_assert!(row < self.height);
        &mut self.data[(self.width * row)..(self.width * row + self.width)]
    }

    #[inline(always)]
    pub fn get_index(&self, x: usize, y: usize) -> usize {
        debug_assert!(self.width > x);
        debug_assert!(self.height > y);
        self.width * y + x
    }

    pub fn get_x_y_index(&self, ind: usize) -> (usize, usize) {
        debug_assert!(ind < self.data.len());
        (ind % self.width, ind / self.width)
    }

    /// Split the array into disjoint mutable slices of whole rows, one per
    /// range. Ranges must be non-overlapping, ascending and cover rows only
    /// once; each returned slice is the contiguous block of its rows.
    pub fn split_row_bands_mut(&mut self, bands: &[Range<usize>]) -> Vec<&mut [T]> {
        debug_assert!(bands.iter().all(|r| r.end <= self.height));
        let width = self.width;
        let mut rest = self.data.as_mut_slice();
        let mut taken = 0usize;
        let mut out = Vec::with_capacity(bands.len());
        for band in bands {
            debug_assert!(band.start >= taken);
            let skip = (band.start - taken) * width;
            let (_, after_skip) = rest.split_at_mut(skip);
            let (chunk, after) = after_skip.split_at_mut(band.len() * width);
            out.push(chunk);
            rest = after;
            taken = band.end;
        }
        out
    }
}

impl<T> Index<(usize, usize)> for Array2D<T> {
    type Output = T;
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.data[self.get_index(x, y)]
    }
}
impl<T> IndexMut<(usize, usize)> for Array2D<T> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        let idx = self.get_index(x, y);
        &mut self.data[idx]
    }
}

/// Image converted to CIE Lab, stored as interleaved `[l, a, b, pad]` f32
/// quadruples. The padding float keeps pixels 16-byte wide so rows stay
/// nicely aligned for vectorized loops.
pub struct LabImage {
    pub lab_data: AVec<f32, ConstAlign<ALIGN>>,
    pub width: usize,
    pub height: usize,
}

impl LabImage {
    /// Convert a packed 8-bit RGBA buffer. Conversion is split across the
    /// rayon pool in contiguous pixel chunks.
    pub fn from_rgba(rgba_image: &[u8], width: usize, height: usize) -> Self {
        assert!(width > 0);
        assert!(height > 0);
        assert_eq!(rgba_image.len(), width * height * 4);
        let num_pixels = width * height;
        let chunk_pixels = num_pixels.div_ceil(current_num_threads());
        let mut lab_output: AVec<f32, ConstAlign<ALIGN>> =
            AVec::from_iter(ALIGN, (0..num_pixels * 4).map(|_| 0f32));
        rayon::scope(|s| {
            let mut rgba_input: &[u8] = rgba_image;
            let mut data_output: &mut [f32] = &mut lab_output;
            while !rgba_input.is_empty() {
                let take = chunk_pixels.min(rgba_input.len() / 4);
                let (chunk_in, rest_in) = rgba_input.split_at(take * 4);
                rgba_input = rest_in;
                let (chunk_out, rest_out) = data_output.split_at_mut(take * 4);
                data_output = rest_out;
                s.spawn(move |_| {
                    for (pixel_in, pixel_out) in
                        chunk_in.chunks_exact(4).zip(chunk_out.chunks_exact_mut(4))
                    {
                        pixel_out[0..3].copy_from_slice(&srgb_to_cielab_pixel(pixel_in));
                    }
                });
            }
        });
        Self {
            width,
            height,
            lab_data: lab_output,
        }
    }

    #[inline(always)]
    pub fn get_row(&self, row: usize) -> &[f32] {
        debug_assert!(row < self.height);
        &self.lab_data[(self.width * 4 * row)..(self.width * 4 * row + self.width * 4)]
    }

    #[inline(always)]
    pub fn get_index(&self, x: usize, y: usize) -> usize {
        debug_assert!(self.width > x);
        debug_assert!(self.height > y);
        self.width * y * 4 + x * 4
    }

    #[inline(always)]
    pub fn get_pixel(&self, x: usize, y: usize) -> &[f32] {
        let idx = self.get_index(x, y);
        &self.lab_data[idx..idx + 3]
    }

    /// Row slice covering columns `left..=right`, 4 floats per pixel.
    #[inline(always)]
    pub fn get_row_part(&self, row: usize, left: usize, right: usize) -> &[f32] {
        debug_assert!(row < self.height);
        debug_assert!(left < self.width);
        debug_assert!(right < self.width);
        &self.lab_data[(4 * self.width * row + 4 * left)..(4 * self.width * row + 4 * right) + 4]
    }
}

impl Index<(usize, usize)> for LabImage {
    type Output = [f32];
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        let idx = self.get_index(x, y);
        &self.lab_data[idx..idx + 3]
    }
}
