//! Random (noise) dithering.

use crate::{NearestColor, Palette, Strength};
use palette::{cast::AsArrays, Srgb};
use rand::{prelude::Distribution, RngCore, SeedableRng};
use rand_distr::Uniform;
use rand_xoshiro::{SplitMix64, Xoroshiro128PlusPlus};
#[cfg(feature = "threads")]
use rayon::prelude::*;

/// The noise amplitude at full strength.
pub const NOISE_AMPLITUDE: f64 = 25.0;

/// Returns the noise generator for row `y`.
///
/// The seed and the row each fill one half of the generator state after being mixed,
/// so every `(seed, y)` pair gets its own generator.
fn row_rng(seed: u64, y: usize) -> Xoroshiro128PlusPlus {
    let mix = |x: u64| SplitMix64::seed_from_u64(x).next_u64().to_le_bytes();
    let mut state = [0; 16];
    state[..8].copy_from_slice(&mix(seed));
    state[8..].copy_from_slice(&mix(y as u64));
    Xoroshiro128PlusPlus::from_seed(state)
}

/// Dithers a single row of pixels with noise from a generator seeded for that row.
fn random_row(
    output: &mut [Srgb<u8>],
    row: &[[u8; 3]],
    y: usize,
    seed: u64,
    amplitude: f64,
    table: &NearestColor,
    palette: &Palette,
) {
    let mut rng = row_rng(seed, y);
    let noise = Uniform::new(-1.0f64, 1.0);
    for (out, color) in output.iter_mut().zip(row) {
        let point = color.map(|c| f64::from(c) + noise.sample(&mut rng) * amplitude);
        *out = palette[usize::from(table.nearest(point))];
    }
}

/// Dithers the given image by adding uniform noise in `-25.0..25.0`, scaled by `strength`,
/// to each channel of each pixel before mapping it to its nearest palette color.
///
/// The noise for each row comes from its own generator seeded from `seed` and the row index,
/// so the output is fully determined by the inputs and `seed`.
/// If the length of `colors` is not a multiple of `width`,
/// the remaining pixels are treated as a shorter last row.
///
/// # Panics
/// Panics if `width` is zero while `colors` is not empty.
#[must_use]
pub fn random(
    colors: &[Srgb<u8>],
    width: usize,
    palette: &Palette,
    strength: Strength,
    seed: u64,
) -> Vec<Srgb<u8>> {
    if colors.is_empty() {
        return Vec::new();
    }

    let table = NearestColor::new(palette);
    let amplitude = strength.fraction() * NOISE_AMPLITUDE;
    let mut output = vec![Srgb::new(0, 0, 0); colors.len()];

    for (y, (out, row)) in output
        .chunks_mut(width)
        .zip(colors.as_arrays().chunks(width))
        .enumerate()
    {
        random_row(out, row, y, seed, amplitude, &table, palette);
    }

    output
}

/// Dithers the given image in parallel by adding uniform noise in `-25.0..25.0`,
/// scaled by `strength`, to each channel of each pixel before mapping it to its nearest palette color.
///
/// The result is identical to [`random`] for the same `seed`.
///
/// # Panics
/// Panics if `width` is zero while `colors` is not empty.
#[cfg(feature = "threads")]
#[must_use]
pub fn random_par(
    colors: &[Srgb<u8>],
    width: usize,
    palette: &Palette,
    strength: Strength,
    seed: u64,
) -> Vec<Srgb<u8>> {
    if colors.is_empty() {
        return Vec::new();
    }

    let table = NearestColor::new(palette);
    let amplitude = strength.fraction() * NOISE_AMPLITUDE;
    let mut output = vec![Srgb::new(0, 0, 0); colors.len()];

    output
        .par_chunks_mut(width)
        .zip(colors.as_arrays().par_chunks(width))
        .enumerate()
        .for_each(|(y, (out, row))| {
            random_row(out, row, y, seed, amplitude, &table, palette);
        });

    output
}
