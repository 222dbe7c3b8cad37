//! Contains the strength blender.

use crate::{dither::quantize, Palette, Strength};
use palette::{cast::AsArrays, Srgb};
#[cfg(feature = "threads")]
use {crate::dither::quantize_par, rayon::prelude::*};

/// Linearly interpolates from `quantized` to `dithered` by `t`, truncating to 8 bits.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp(dithered: [u8; 3], quantized: [u8; 3], t: f64) -> Srgb<u8> {
    let [r, g, b] = std::array::from_fn(|c| {
        let q = f64::from(quantized[c]);
        let d = f64::from(dithered[c]);
        (q + (d - q) * t).clamp(0.0, 255.0) as u8
    });
    Srgb::new(r, g, b)
}

/// Blends a dithered image with the plain quantization of its `source` image.
///
/// Each channel becomes `dithered * strength + quantized * (1 - strength)`,
/// clamped to `0..=255` and truncated to an integer.
/// At full strength, `dithered` is returned as is and `source` is never quantized.
///
/// `dithered` and `source` must have the same length.
///
/// # Examples
/// ```
/// # use dithertone::{blend, dither::quantize, Palette, Strength, DitherError};
/// # use palette::Srgb;
/// # fn main() -> Result<(), DitherError> {
/// let palette = Palette::try_from(vec![Srgb::new(0, 0, 0), Srgb::new(200, 200, 200)])?;
/// let source = vec![Srgb::new(40, 40, 40)];
/// let dithered = vec![Srgb::new(200, 200, 200)];
///
/// let blended = blend(&dithered, &source, &palette, Strength::from_percent(50)?);
/// assert_eq!(blended, vec![Srgb::new(100, 100, 100)]);
///
/// let full = blend(&dithered, &source, &palette, Strength::FULL);
/// assert_eq!(full, dithered);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn blend(
    dithered: &[Srgb<u8>],
    source: &[Srgb<u8>],
    palette: &Palette,
    strength: Strength,
) -> Vec<Srgb<u8>> {
    debug_assert_eq!(dithered.len(), source.len());

    if strength.is_full() {
        return dithered.to_vec();
    }

    let quantized = quantize(source, palette);
    let t = strength.fraction();
    dithered
        .as_arrays()
        .iter()
        .zip(quantized.as_slice().as_arrays())
        .map(|(&d, &q)| lerp(d, q, t))
        .collect()
}

/// Blends a dithered image with the plain quantization of its `source` image in parallel.
///
/// The result is identical to [`blend`].
#[cfg(feature = "threads")]
#[must_use]
pub fn blend_par(
    dithered: &[Srgb<u8>],
    source: &[Srgb<u8>],
    palette: &Palette,
    strength: Strength,
) -> Vec<Srgb<u8>> {
    debug_assert_eq!(dithered.len(), source.len());

    if strength.is_full() {
        return dithered.to_vec();
    }

    let quantized = quantize_par(source, palette);
    let t = strength.fraction();
    dithered
        .as_arrays()
        .par_iter()
        .zip(quantized.as_slice().as_arrays())
        .map(|(&d, &q)| lerp(d, q, t))
        .collect()
}
