//! Error diffusion dithering.

use crate::{NearestColor, Palette};
use palette::{cast::AsArrays, Srgb};
use std::array;

/// The number of padding pixels on each side of a row of the error buffer.
///
/// This must be at least the largest horizontal offset of any kernel.
const PAD: usize = 2;

/// A weighted set of offsets describing where the quantization error of a pixel is diffused to.
///
/// Each tap is a `(dx, dy, weight)` tuple relative to the current pixel,
/// with `dx` positive to the right and `dy` positive downwards.
/// Taps only ever point to pixels that have not been visited yet in a left to right,
/// top to bottom scan. The weight of each tap is its integer weight divided by the kernel's divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorKernel {
    /// The `(dx, dy, weight)` taps.
    taps: &'static [(i8, u8, u8)],
    /// The value each integer weight is divided by.
    divisor: u8,
}

impl ErrorKernel {
    /// The Floyd–Steinberg kernel.
    pub const FLOYD_STEINBERG: Self = Self {
        taps: &[(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)],
        divisor: 16,
    };

    /// The Atkinson kernel.
    ///
    /// Only three quarters of the error are diffused, the remainder is discarded.
    pub const ATKINSON: Self = Self {
        taps: &[(1, 0, 1), (2, 0, 1), (-1, 1, 1), (0, 1, 1), (1, 1, 1), (0, 2, 1)],
        divisor: 8,
    };

    /// The Jarvis–Judice–Ninke kernel.
    pub const JARVIS_JUDICE_NINKE: Self = Self {
        taps: &[
            (1, 0, 7),
            (2, 0, 5),
            (-2, 1, 3),
            (-1, 1, 5),
            (0, 1, 7),
            (1, 1, 5),
            (2, 1, 3),
            (-2, 2, 1),
            (-1, 2, 3),
            (0, 2, 5),
            (1, 2, 3),
            (2, 2, 1),
        ],
        divisor: 48,
    };

    /// The Stucki kernel.
    pub const STUCKI: Self = Self {
        taps: &[
            (1, 0, 8),
            (2, 0, 4),
            (-2, 1, 2),
            (-1, 1, 4),
            (0, 1, 8),
            (1, 1, 4),
            (2, 1, 2),
            (-2, 2, 1),
            (-1, 2, 2),
            (0, 2, 4),
            (1, 2, 2),
            (2, 2, 1),
        ],
        divisor: 42,
    };

    /// Returns the taps with their integer weights.
    ///
    /// Each weight still needs to be divided by [`ErrorKernel::divisor`].
    #[must_use]
    pub fn taps(&self) -> Vec<(isize, usize, f64)> {
        self.taps
            .iter()
            .map(|&(dx, dy, w)| (isize::from(dx), usize::from(dy), f64::from(w)))
            .collect()
    }

    /// The value each integer weight is divided by.
    #[must_use]
    pub fn divisor(&self) -> f64 {
        f64::from(self.divisor)
    }

    /// The total fraction of the error that gets diffused.
    #[must_use]
    pub fn weight_sum(&self) -> f64 {
        let total = self.taps.iter().map(|&(_, _, w)| u16::from(w)).sum::<u16>();
        f64::from(total) / self.divisor()
    }

    /// The number of rows below the current row that the error reaches.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.taps
            .iter()
            .map(|&(_, dy, _)| usize::from(dy))
            .max()
            .unwrap_or(0)
    }
}

/// Adds `other * weight / divisor` to `arr`.
#[inline]
fn arr_weighted_add_assign<const N: usize>(
    arr: &mut [f64; N],
    other: [f64; N],
    weight: f64,
    divisor: f64,
) {
    for i in 0..N {
        arr[i] += other[i] * weight / divisor;
    }
}

/// Holds the current and upcoming rows of pixels with the error diffused onto them so far.
///
/// This is a ring buffer of `depth + 1` padded rows. Error is added directly onto the pixel
/// values in scan order. Error landing left or right of the image is written to the padding
/// and never read back, so out of bounds taps are skipped.
/// Error for rows past the bottom of the image is likewise never read.
struct ErrorRows {
    /// The length of a padded row.
    stride: usize,
    /// The number of rows in the ring.
    rows: usize,
    /// The ring index of the current row.
    current: usize,
    /// The pixel data.
    buf: Vec<[f64; 3]>,
}

impl ErrorRows {
    /// Creates a new, zeroed [`ErrorRows`] for rows of `width` pixels and a kernel of the given depth.
    fn new(width: usize, depth: usize) -> Self {
        let stride = width + 2 * PAD;
        let rows = depth + 1;
        Self {
            stride,
            rows,
            current: 0,
            buf: vec![[0.0; 3]; stride * rows],
        }
    }

    /// The start of the row `dy` rows below the current one.
    #[inline]
    fn row_start(&self, dy: usize) -> usize {
        ((self.current + dy) % self.rows) * self.stride
    }

    /// Adds the pixels of `row` onto the row `dy` rows below the current one.
    fn load(&mut self, dy: usize, row: &[[u8; 3]]) {
        let start = self.row_start(dy) + PAD;
        for (value, color) in self.buf[start..].iter_mut().zip(row) {
            for c in 0..3 {
                value[c] += f64::from(color[c]);
            }
        }
    }

    /// The pixel at column `x` of the current row, with its accumulated error.
    #[inline]
    fn get(&self, x: usize) -> [f64; 3] {
        self.buf[self.row_start(0) + x + PAD]
    }

    /// Distribute `err` from the pixel at column `x` of the current row according to `taps`.
    #[inline]
    fn spread(&mut self, x: usize, err: [f64; 3], taps: &[(isize, usize, f64)], divisor: f64) {
        for &(dx, dy, weight) in taps {
            let i = self.row_start(dy) + (x + PAD).wrapping_add_signed(dx);
            arr_weighted_add_assign(&mut self.buf[i], err, weight, divisor);
        }
    }

    /// Clear the current row and advance to the next one.
    #[inline]
    fn next_row(&mut self) {
        let start = self.row_start(0);
        self.buf[start..(start + self.stride)].fill([0.0; 3]);
        self.current = (self.current + 1) % self.rows;
    }
}

/// Dithers the given image using error diffusion with the given kernel.
///
/// Pixels are visited strictly in row-major order, left to right and top to bottom.
/// Each pixel, with the error accumulated on it so far, is mapped to its nearest palette color.
/// The difference is then diffused onto the unvisited neighbors given by `kernel`.
/// All arithmetic is done in `f64`.
///
/// If the length of `colors` is not a multiple of `width`,
/// the remaining pixels are treated as a shorter last row.
/// The returned pixels are all palette colors, one for each input pixel.
///
/// # Panics
/// Panics if `width` is zero while `colors` is not empty.
#[must_use]
pub fn diffuse(
    colors: &[Srgb<u8>],
    width: usize,
    palette: &Palette,
    kernel: &ErrorKernel,
) -> Vec<Srgb<u8>> {
    if colors.is_empty() {
        return Vec::new();
    }

    let table = NearestColor::new(palette);
    let taps = kernel.taps();
    let divisor = kernel.divisor();
    let depth = kernel.depth();
    let rows = colors.as_arrays().chunks(width).collect::<Vec<_>>();

    let mut error = ErrorRows::new(width, depth);
    for (dy, row) in rows.iter().take(depth + 1).enumerate() {
        error.load(dy, row);
    }

    let mut output = Vec::with_capacity(colors.len());
    for (y, row) in rows.iter().enumerate() {
        for x in 0..row.len() {
            let point = error.get(x);
            let index = table.nearest(point);
            let nearest = table.color(index);
            output.push(palette[usize::from(index)]);

            let err = array::from_fn(|c| point[c] - nearest[c]);
            error.spread(x, err, &taps, divisor);
        }

        error.next_row();
        if let Some(row) = rows.get(y + depth + 1) {
            error.load(depth, row);
        }
    }

    output
}
