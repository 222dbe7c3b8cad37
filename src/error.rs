//! Contains the error type returned across the public API.

use thiserror::Error;

/// The error type for invalid dithering configurations and inputs.
///
/// All validation happens before any pixel is processed,
/// so an error never comes with a partially dithered image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DitherError {
    /// The given name does not match any [`DitherAlgorithm`](crate::DitherAlgorithm).
    #[error("unknown dither algorithm `{0}`")]
    UnknownAlgorithm(String),
    /// The given name does not match any palette source or [`NamedPalette`](crate::NamedPalette).
    #[error("unknown palette `{0}`")]
    UnknownPalette(String),
    /// The given name does not match any [`Lut`](crate::lut::Lut).
    #[error("unknown color grading lut `{0}`")]
    UnknownLut(String),
    /// The requested number of palette colors is `0` or above [`MAX_COLORS`](crate::MAX_COLORS).
    #[error("palette size {0} is outside the supported range 1..={max}", max = crate::MAX_COLORS)]
    InvalidPaletteSize(u16),
    /// The dither strength percent is above `100`.
    #[error("dither strength {0}% is above 100%")]
    InvalidStrength(u16),
    /// The image has no pixels.
    #[error("image has zero area ({width}x{height})")]
    EmptyImage {
        /// The width of the image.
        width: u32,
        /// The height of the image.
        height: u32,
    },
    /// The number of pixels does not match the image dimensions.
    #[error("{len} pixels do not fill a {width}x{height} image")]
    DimensionMismatch {
        /// The width of the image.
        width: u32,
        /// The height of the image.
        height: u32,
        /// The number of pixels provided.
        len: usize,
    },
    /// The image has more than [`MAX_PIXELS`](crate::MAX_PIXELS) pixels.
    #[error("image is above the maximum of {max} pixels", max = crate::MAX_PIXELS)]
    TooManyPixels,
    /// A palette must contain at least one color.
    #[error("palette cannot be empty")]
    EmptyPalette,
    /// A palette contains more than [`MAX_COLORS`](crate::MAX_COLORS) colors.
    #[error("palette has {0} colors but at most {max} are supported", max = crate::MAX_COLORS)]
    TooManyColors(usize),
}
