//! Contains the dithering algorithms.
//!
//! There are three families of algorithms:
//! - error diffusion ([`diffuse`]) with one of several [`ErrorKernel`]s,
//!   which is inherently sequential
//! - ordered dithering ([`ordered`]) with a tiled [`ThresholdMatrix`]
//! - random dithering ([`random`]) with seeded uniform noise
//!
//! All of them map each pixel to its nearest palette color after perturbing it,
//! and [`quantize`] is the unperturbed baseline.
//! The ordered and random families, as well as [`quantize`],
//! have parallel versions when the `threads` feature is enabled.

mod diffusion;
mod ordered;
mod random;

pub use diffusion::*;
pub use ordered::*;
pub use random::*;

use crate::{blend, palettes::normalize_name, DitherError, NearestColor, Palette, Strength};
use palette::{cast::AsArrays, Srgb};
use std::{fmt::Display, str::FromStr};
use tracing::trace;
#[cfg(feature = "threads")]
use {crate::blend_par, rayon::prelude::*};

/// The supported dithering algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DitherAlgorithm {
    /// Floyd–Steinberg error diffusion.
    #[default]
    FloydSteinberg,
    /// Atkinson error diffusion, which diffuses only three quarters of the error.
    Atkinson,
    /// Jarvis, Judice, and Ninke error diffusion.
    JarvisJudiceNinke,
    /// Stucki error diffusion.
    Stucki,
    /// Ordered dithering with an 8×8 Bayer matrix.
    Bayer,
    /// Ordered dithering with a 4×4 clustered-dot halftone matrix.
    ClusteredDot,
    /// Uniform noise dithering.
    Random,
}

impl DitherAlgorithm {
    /// All dithering algorithms, in presentation order.
    pub const ALL: [Self; 7] = [
        Self::FloydSteinberg,
        Self::Atkinson,
        Self::JarvisJudiceNinke,
        Self::Stucki,
        Self::Bayer,
        Self::ClusteredDot,
        Self::Random,
    ];

    /// The human readable name of the algorithm.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FloydSteinberg => "Floyd-Steinberg",
            Self::Atkinson => "Atkinson",
            Self::JarvisJudiceNinke => "Jarvis, Judice, Ninke",
            Self::Stucki => "Stucki",
            Self::Bayer => "Bayer (Ordered)",
            Self::ClusteredDot => "Clustered Dot Halftone",
            Self::Random => "Random",
        }
    }

    /// The error diffusion kernel of the algorithm, if it is an error diffusion algorithm.
    #[must_use]
    pub const fn kernel(self) -> Option<ErrorKernel> {
        match self {
            Self::FloydSteinberg => Some(ErrorKernel::FLOYD_STEINBERG),
            Self::Atkinson => Some(ErrorKernel::ATKINSON),
            Self::JarvisJudiceNinke => Some(ErrorKernel::JARVIS_JUDICE_NINKE),
            Self::Stucki => Some(ErrorKernel::STUCKI),
            Self::Bayer | Self::ClusteredDot | Self::Random => None,
        }
    }

    /// The threshold matrix of the algorithm, if it is an ordered dithering algorithm.
    #[must_use]
    pub const fn matrix(self) -> Option<ThresholdMatrix> {
        match self {
            Self::Bayer => Some(ThresholdMatrix::BAYER_8X8),
            Self::ClusteredDot => Some(ThresholdMatrix::CLUSTERED_DOT_4X4),
            _ => None,
        }
    }

    /// Whether or not this is an error diffusion algorithm.
    ///
    /// Only error diffusion output is blended with a plain quantization according to the [`Strength`].
    #[must_use]
    pub const fn is_error_diffusion(self) -> bool {
        self.kernel().is_some()
    }
}

impl Display for DitherAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DitherAlgorithm {
    type Err = DitherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "floydsteinberg" | "fs" => Ok(Self::FloydSteinberg),
            "atkinson" => Ok(Self::Atkinson),
            "jarvisjudiceninke" | "jjn" | "jarvis" => Ok(Self::JarvisJudiceNinke),
            "stucki" => Ok(Self::Stucki),
            "bayerordered" | "bayer" | "ordered" => Ok(Self::Bayer),
            "clustereddothalftone" | "clustereddot" | "halftone" => Ok(Self::ClusteredDot),
            "random" | "noise" => Ok(Self::Random),
            _ => Err(DitherError::UnknownAlgorithm(s.to_owned())),
        }
    }
}

/// Maps each pixel to its nearest palette color without any dithering.
#[must_use]
pub fn quantize(colors: &[Srgb<u8>], palette: &Palette) -> Vec<Srgb<u8>> {
    let table = NearestColor::new(palette);
    colors
        .as_arrays()
        .iter()
        .map(|color| palette[usize::from(table.nearest(color.map(f64::from)))])
        .collect()
}

/// Maps each pixel to its nearest palette color in parallel without any dithering.
#[cfg(feature = "threads")]
#[must_use]
pub fn quantize_par(colors: &[Srgb<u8>], palette: &Palette) -> Vec<Srgb<u8>> {
    let table = NearestColor::new(palette);
    colors
        .as_arrays()
        .par_iter()
        .map(|color| palette[usize::from(table.nearest(color.map(f64::from)))])
        .collect()
}

/// Dithers the given image of the given `width` onto `palette` using `algorithm`.
///
/// For error diffusion, the result is blended with a plain quantization according to `strength`.
/// For the ordered and random algorithms, `strength` scales the threshold or noise instead.
/// `seed` is only used by [`DitherAlgorithm::Random`].
///
/// If the length of `colors` is not a multiple of `width`,
/// the remaining pixels are treated as a shorter last row.
///
/// # Panics
/// Panics if `width` is zero while `colors` is not empty.
#[must_use]
pub fn dither(
    colors: &[Srgb<u8>],
    width: usize,
    palette: &Palette,
    algorithm: DitherAlgorithm,
    strength: Strength,
    seed: u64,
) -> Vec<Srgb<u8>> {
    trace!(%algorithm, %strength, pixels = colors.len(), "dithering pixels");
    if let Some(kernel) = algorithm.kernel() {
        let dithered = diffuse(colors, width, palette, &kernel);
        blend(&dithered, colors, palette, strength)
    } else if let Some(matrix) = algorithm.matrix() {
        ordered(colors, width, palette, &matrix, strength)
    } else {
        random(colors, width, palette, strength, seed)
    }
}

/// Dithers the given image of the given `width` onto `palette` using `algorithm`,
/// running the pixel independent passes in parallel.
///
/// Error diffusion itself always runs sequentially.
/// The result is identical to [`dither`].
///
/// # Panics
/// Panics if `width` is zero while `colors` is not empty.
#[cfg(feature = "threads")]
#[must_use]
pub fn dither_par(
    colors: &[Srgb<u8>],
    width: usize,
    palette: &Palette,
    algorithm: DitherAlgorithm,
    strength: Strength,
    seed: u64,
) -> Vec<Srgb<u8>> {
    trace!(%algorithm, %strength, pixels = colors.len(), "dithering pixels");
    if let Some(kernel) = algorithm.kernel() {
        let dithered = diffuse(colors, width, palette, &kernel);
        blend_par(&dithered, colors, palette, strength)
    } else if let Some(matrix) = algorithm.matrix() {
        ordered_par(colors, width, palette, &matrix, strength)
    } else {
        random_par(colors, width, palette, strength, seed)
    }
}
