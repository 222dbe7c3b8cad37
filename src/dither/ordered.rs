//! Ordered dithering with tiled threshold matrices.

use crate::{NearestColor, Palette, Strength};
use palette::{cast::AsArrays, Srgb};
#[cfg(feature = "threads")]
use rayon::prelude::*;

/// A square matrix of thresholds that is tiled across the image.
///
/// The thresholds of an `n`×`n` matrix are a permutation of `0..n²`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdMatrix {
    /// The side length of the matrix.
    size: usize,
    /// The thresholds in row-major order.
    values: &'static [u8],
}

impl ThresholdMatrix {
    /// The 8×8 Bayer matrix.
    pub const BAYER_8X8: Self = Self {
        size: 8,
        values: &[
            0, 32, 8, 40, 2, 34, 10, 42, //
            48, 16, 56, 24, 50, 18, 58, 26, //
            12, 44, 4, 36, 14, 46, 6, 38, //
            60, 28, 52, 20, 62, 30, 54, 22, //
            3, 35, 11, 43, 1, 33, 9, 41, //
            51, 19, 59, 27, 49, 17, 57, 25, //
            15, 47, 7, 39, 13, 45, 5, 37, //
            63, 31, 55, 23, 61, 29, 53, 21, //
        ],
    };

    /// A 4×4 clustered-dot halftone matrix.
    pub const CLUSTERED_DOT_4X4: Self = Self {
        size: 4,
        values: &[
            12, 5, 6, 13, //
            4, 0, 1, 7, //
            8, 2, 3, 9, //
            15, 11, 10, 14, //
        ],
    };

    /// The side length of the matrix.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the offsets added to the pixels under each matrix cell for the given strength.
    ///
    /// A threshold `t` of an `n`×`n` matrix becomes `(t / n² - 0.5) * strength * n² / 2`,
    /// so the offsets are centered around zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn offsets(&self, strength: Strength) -> Vec<f64> {
        let cells = (self.size * self.size) as f64;
        let factor = strength.fraction() * (cells / 2.0);
        self.values
            .iter()
            .map(|&t| (f64::from(t) / cells - 0.5) * factor)
            .collect()
    }
}

/// Dithers a single row of pixels.
fn ordered_row(
    output: &mut [Srgb<u8>],
    row: &[[u8; 3]],
    y: usize,
    size: usize,
    offsets: &[f64],
    table: &NearestColor,
    palette: &Palette,
) {
    let offsets = &offsets[(y % size * size)..][..size];
    for (x, (out, color)) in output.iter_mut().zip(row).enumerate() {
        let offset = offsets[x % size];
        let point = color.map(|c| f64::from(c) + offset);
        *out = palette[usize::from(table.nearest(point))];
    }
}

/// Dithers the given image by adding the tiled threshold `matrix`,
/// scaled by `strength`, to each pixel before mapping it to its nearest palette color.
///
/// Each pixel is independent of all others.
/// If the length of `colors` is not a multiple of `width`,
/// the remaining pixels are treated as a shorter last row.
///
/// # Panics
/// Panics if `width` is zero while `colors` is not empty.
#[must_use]
pub fn ordered(
    colors: &[Srgb<u8>],
    width: usize,
    palette: &Palette,
    matrix: &ThresholdMatrix,
    strength: Strength,
) -> Vec<Srgb<u8>> {
    if colors.is_empty() {
        return Vec::new();
    }

    let table = NearestColor::new(palette);
    let offsets = matrix.offsets(strength);
    let mut output = vec![Srgb::new(0, 0, 0); colors.len()];

    for (y, (out, row)) in output
        .chunks_mut(width)
        .zip(colors.as_arrays().chunks(width))
        .enumerate()
    {
        ordered_row(out, row, y, matrix.size, &offsets, &table, palette);
    }

    output
}

/// Dithers the given image in parallel by adding the tiled threshold `matrix`,
/// scaled by `strength`, to each pixel before mapping it to its nearest palette color.
///
/// The result is identical to [`ordered`].
///
/// # Panics
/// Panics if `width` is zero while `colors` is not empty.
#[cfg(feature = "threads")]
#[must_use]
pub fn ordered_par(
    colors: &[Srgb<u8>],
    width: usize,
    palette: &Palette,
    matrix: &ThresholdMatrix,
    strength: Strength,
) -> Vec<Srgb<u8>> {
    if colors.is_empty() {
        return Vec::new();
    }

    let table = NearestColor::new(palette);
    let offsets = matrix.offsets(strength);
    let mut output = vec![Srgb::new(0, 0, 0); colors.len()];

    output
        .par_chunks_mut(width)
        .zip(colors.as_arrays().par_chunks(width))
        .enumerate()
        .for_each(|(y, (out, row))| {
            ordered_row(out, row, y, matrix.size, &offsets, &table, palette);
        });

    output
}
