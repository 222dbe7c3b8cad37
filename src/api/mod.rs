//! Contains the types and functions for the high level pipeline builder API.

mod dither_pipeline;
mod output;

pub use dither_pipeline::DitherPipeline;
pub use output::DitherOutput;

use crate::{DitherAlgorithm, DitherError, PaletteSize, PaletteSource, Strength};
use palette::Srgb;
#[cfg(feature = "image")]
use image::RgbImage;

/// A builder struct to specify the parameters for a dithering run.
///
/// # Examples
/// ```
/// # use dithertone::{DitherAlgorithm, DitherParams, NamedPalette, Strength};
/// let params = DitherParams::new()
///     .algorithm(DitherAlgorithm::Stucki)
///     .palette_source(NamedPalette::Pico8)
///     .strength(Strength::from_fraction(0.75).unwrap())
///     .seed(42);
/// ```
///
/// Or from the names of the options:
/// ```
/// # use dithertone::{DitherParams, DitherError};
/// # fn main() -> Result<(), DitherError> {
/// let params = DitherParams::from_names("Bayer (Ordered)", "Grayscale", 4, 80)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DitherParams {
    /// The dithering algorithm.
    pub(crate) algorithm: DitherAlgorithm,
    /// Where the palette colors come from.
    pub(crate) palette_source: PaletteSource,
    /// The number of colors for generated palettes.
    pub(crate) palette_size: PaletteSize,
    /// The dithering strength.
    pub(crate) strength: Strength,
    /// The seed for the random ditherer.
    pub(crate) seed: u64,
}

impl Default for DitherParams {
    fn default() -> Self {
        Self::new()
    }
}

impl DitherParams {
    /// Creates a new [`DitherParams`] with default values.
    ///
    /// These are Floyd–Steinberg dithering onto an automatic palette of 8 colors at full strength.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            algorithm: DitherAlgorithm::FloydSteinberg,
            palette_source: PaletteSource::Auto,
            palette_size: PaletteSize::from_clamped(8),
            strength: Strength::FULL,
            seed: 0,
        }
    }

    /// Creates a new [`DitherParams`] from the names of the algorithm and palette source,
    /// the number of palette colors, and the strength as a percent.
    ///
    /// Names are matched ignoring case, spaces, and punctuation.
    ///
    /// # Errors
    /// Returns an error if either name is unknown,
    /// `palette_size` is outside of `1..=256`, or `strength_percent` is above `100`.
    pub fn from_names(
        algorithm: &str,
        palette_source: &str,
        palette_size: u16,
        strength_percent: u16,
    ) -> Result<Self, DitherError> {
        Ok(Self::new()
            .algorithm(algorithm.parse()?)
            .palette_source(palette_source.parse::<PaletteSource>()?)
            .palette_size(palette_size.try_into()?)
            .strength(Strength::from_percent(strength_percent)?))
    }

    /// Sets the dithering algorithm.
    ///
    /// The default algorithm is [`DitherAlgorithm::FloydSteinberg`].
    #[must_use]
    pub fn algorithm(mut self, algorithm: DitherAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets where the palette colors come from.
    ///
    /// The default is [`PaletteSource::Auto`].
    #[must_use]
    pub fn palette_source(mut self, source: impl Into<PaletteSource>) -> Self {
        self.palette_source = source.into();
        self
    }

    /// Sets the number of colors for the [`PaletteSource::Auto`] and [`PaletteSource::Grayscale`]
    /// palettes. It is ignored by the fixed palettes.
    ///
    /// The default palette size is `8`.
    #[must_use]
    pub fn palette_size(mut self, size: PaletteSize) -> Self {
        self.palette_size = size;
        self
    }

    /// Sets the dithering strength.
    ///
    /// The default strength is [`Strength::FULL`].
    #[must_use]
    pub fn strength(mut self, strength: Strength) -> Self {
        self.strength = strength;
        self
    }

    /// Sets the seed value for the random ditherer.
    ///
    /// The default seed is `0`.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Dithers an image given as a flat, row-major slice of pixels.
///
/// This validates the inputs, builds the palette, and dithers the image in one call.
/// It returns the dithered image together with the palette that was used.
///
/// # Errors
/// Returns an error if the image is empty, `colors` does not have `width * height` pixels,
/// or the image has more than [`MAX_PIXELS`](crate::MAX_PIXELS) pixels.
///
/// # Examples
/// ```
/// # use dithertone::{process, DitherParams, NamedPalette, DitherError};
/// # use palette::Srgb;
/// # fn main() -> Result<(), DitherError> {
/// let colors = vec![Srgb::new(200, 180, 20); 16];
/// let params = DitherParams::new().palette_source(NamedPalette::GameBoy);
/// let output = process(&colors, 4, 4, &params)?;
/// assert_eq!(output.palette().len(), 4);
/// assert_eq!(output.pixels().len(), 16);
/// # Ok(())
/// # }
/// ```
pub fn process(
    colors: &[Srgb<u8>],
    width: u32,
    height: u32,
    params: &DitherParams,
) -> Result<DitherOutput, DitherError> {
    DitherPipeline::new(colors.try_into()?, width, height)?
        .params(params.clone())
        .run()
}

/// Dithers an [`RgbImage`].
///
/// See [`process`] for more details.
///
/// # Errors
/// Returns an error if the image is empty or has more than [`MAX_PIXELS`](crate::MAX_PIXELS) pixels.
#[cfg(feature = "image")]
pub fn process_rgbimage(
    image: &RgbImage,
    params: &DitherParams,
) -> Result<DitherOutput, DitherError> {
    DitherPipeline::try_from(image)?
        .params(params.clone())
        .run()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{tests::*, NamedPalette};

    #[test]
    fn default_params() {
        let params = DitherParams::default();
        assert_eq!(params.algorithm, DitherAlgorithm::FloydSteinberg);
        assert_eq!(params.palette_source, PaletteSource::Auto);
        assert_eq!(params.palette_size.into_inner(), 8);
        assert_eq!(params.strength, Strength::FULL);
        assert_eq!(params.seed, 0);
    }

    #[test]
    fn params_from_names() {
        let params = DitherParams::from_names("Jarvis, Judice, Ninke", "Game Boy", 16, 40).unwrap();
        assert_eq!(params.algorithm, DitherAlgorithm::JarvisJudiceNinke);
        assert_eq!(params.palette_source, PaletteSource::Named(NamedPalette::GameBoy));
        assert_eq!(params.palette_size.into_inner(), 16);
        assert_eq!(params.strength.percent(), 40);

        assert_eq!(
            DitherParams::from_names("Sierra", "Auto", 8, 100),
            Err(DitherError::UnknownAlgorithm("Sierra".into()))
        );
        assert_eq!(
            DitherParams::from_names("Random", "Amiga", 8, 100),
            Err(DitherError::UnknownPalette("Amiga".into()))
        );
        assert_eq!(
            DitherParams::from_names("Random", "Auto", 0, 100),
            Err(DitherError::InvalidPaletteSize(0))
        );
        assert_eq!(
            DitherParams::from_names("Random", "Auto", 8, 150),
            Err(DitherError::InvalidStrength(150))
        );
    }

    #[test]
    fn process_validates_input() {
        let params = DitherParams::new();
        assert_eq!(
            process(&[], 0, 5, &params),
            Err(DitherError::EmptyImage { width: 0, height: 5 })
        );
        let colors = test_data_256();
        assert_eq!(
            process(&colors, 10, 10, &params),
            Err(DitherError::DimensionMismatch { width: 10, height: 10, len: 256 })
        );
    }

    #[test]
    fn process_game_boy() {
        let colors = gradient(16, 16);
        let params = DitherParams::new()
            .algorithm(DitherAlgorithm::Atkinson)
            .palette_source(NamedPalette::GameBoy)
            .palette_size(PaletteSize::MAX);

        let output = process(&colors, 16, 16, &params).unwrap();
        assert_eq!(output.palette().as_slice(), NamedPalette::GameBoy.colors());
        assert_eq!(output.dimensions(), (16, 16));
        assert!(output.pixels().iter().all(|c| output.palette().contains(c)));
    }

    #[test]
    fn process_grayscale_two_by_two() {
        let colors = [
            Srgb::new(255, 0, 0),
            Srgb::new(0, 255, 0),
            Srgb::new(0, 0, 255),
            Srgb::new(255, 255, 255),
        ];
        let params = DitherParams::new()
            .palette_source(PaletteSource::Grayscale)
            .palette_size(PaletteSize::try_from(2u16).unwrap())
            .strength(Strength::NONE);

        let output = process(&colors, 2, 2, &params).unwrap();
        let black = Srgb::new(0, 0, 0);
        let white = Srgb::new(255, 255, 255);
        assert_eq!(output.palette().as_slice(), [black, white]);
        assert_eq!(output.pixels(), [black, black, white, white]);
    }

    #[test]
    #[cfg(feature = "image")]
    fn process_image() {
        let image = RgbImage::from_fn(12, 7, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            let v = (x * 20 + y * 5) as u8;
            image::Rgb([v, 255 - v, v / 2])
        });
        let params = DitherParams::new().algorithm(DitherAlgorithm::ClusteredDot);
        let output = process_rgbimage(&image, &params).unwrap();
        assert_eq!(output.palette().len(), 8);

        let dithered = output.into_rgbimage();
        assert_eq!(dithered.dimensions(), (12, 7));
    }
}
