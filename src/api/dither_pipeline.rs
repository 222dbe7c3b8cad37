//! Contains the [`DitherPipeline`] builder struct for the high level API.

#[cfg(feature = "threads")]
use crate::build_palette_par;
use crate::{
    build_palette, dither, ColorSlice, DitherAlgorithm, DitherError, DitherOutput, DitherParams,
    PaletteSize, PaletteSource, Strength,
};
#[cfg(feature = "image")]
use image::RgbImage;
use palette::Srgb;
use tracing::debug;

/// A builder struct to dither an image onto a palette.
///
/// # Examples
/// To start, create a [`DitherPipeline`] from a [`RgbImage`] (note that the `image` feature is needed):
/// ```no_run
/// # use dithertone::DitherPipeline;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = image::open("some image")?.into_rgb8();
/// let mut pipeline = DitherPipeline::try_from(&img)?;
/// # Ok(())
/// # }
/// ```
///
/// Then, you can change different options like the algorithm or the palette:
/// ```
/// # use dithertone::{DitherAlgorithm, DitherPipeline, DitherError, PaletteSize, PaletteSource};
/// # use palette::Srgb;
/// # fn main() -> Result<(), DitherError> {
/// # let srgb = vec![Srgb::new(0, 0, 0)];
/// # let mut pipeline = DitherPipeline::new(srgb.as_slice().try_into()?, 1, 1)?;
/// let pipeline = pipeline
///     .algorithm(DitherAlgorithm::Bayer)
///     .palette_source(PaletteSource::Grayscale)
///     .palette_size(PaletteSize::try_from(4u16)?);
/// # Ok(())
/// # }
/// ```
///
/// Finally, run the pipeline:
/// ```
/// # use dithertone::{DitherPipeline, DitherError};
/// # use palette::Srgb;
/// # fn main() -> Result<(), DitherError> {
/// # let srgb = vec![Srgb::new(0, 0, 0)];
/// # let pipeline = DitherPipeline::new(srgb.as_slice().try_into()?, 1, 1)?;
/// let output = pipeline.run()?;
/// # Ok(())
/// # }
/// ```
///
/// Or, with the pixel independent passes running in parallel (needs the `threads` feature):
/// ```
/// # use dithertone::{DitherPipeline, DitherError};
/// # use palette::Srgb;
/// # fn main() -> Result<(), DitherError> {
/// # let srgb = vec![Srgb::new(0, 0, 0)];
/// # let pipeline = DitherPipeline::new(srgb.as_slice().try_into()?, 1, 1)?;
/// let output = pipeline.run_par()?;
/// # Ok(())
/// # }
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct DitherPipeline<'a> {
    /// The input image as a flat slice of pixels.
    pub(crate) colors: ColorSlice<'a, Srgb<u8>>,
    /// The dimensions of the image.
    pub(crate) dimensions: (u32, u32),
    /// The dithering options.
    pub(crate) params: DitherParams,
}

impl<'a> DitherPipeline<'a> {
    /// Creates a new [`DitherPipeline`] with default options.
    ///
    /// # Errors
    /// Returns an error if `width` or `height` is zero,
    /// or if the length of `colors` is not equal to `width * height`.
    pub fn new(
        colors: ColorSlice<'a, Srgb<u8>>,
        width: u32,
        height: u32,
    ) -> Result<Self, DitherError> {
        if width == 0 || height == 0 {
            Err(DitherError::EmptyImage { width, height })
        } else if colors.len() != width as usize * height as usize {
            Err(DitherError::DimensionMismatch { width, height, len: colors.len() })
        } else {
            Ok(Self {
                colors,
                dimensions: (width, height),
                params: DitherParams::new(),
            })
        }
    }

    /// Sets the dithering algorithm.
    ///
    /// The default algorithm is [`DitherAlgorithm::FloydSteinberg`].
    pub fn algorithm(&mut self, algorithm: DitherAlgorithm) -> &mut Self {
        self.params.algorithm = algorithm;
        self
    }

    /// Sets where the palette colors come from.
    ///
    /// The default is [`PaletteSource::Auto`].
    pub fn palette_source(&mut self, source: impl Into<PaletteSource>) -> &mut Self {
        self.params.palette_source = source.into();
        self
    }

    /// Sets the number of colors for generated palettes.
    ///
    /// The default palette size is `8`.
    pub fn palette_size(&mut self, size: PaletteSize) -> &mut Self {
        self.params.palette_size = size;
        self
    }

    /// Sets the dithering strength.
    ///
    /// The default strength is [`Strength::FULL`].
    pub fn strength(&mut self, strength: Strength) -> &mut Self {
        self.params.strength = strength;
        self
    }

    /// Sets the seed value for the random ditherer.
    ///
    /// The default seed is `0`.
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.params.seed = seed;
        self
    }

    /// Replaces all options at once.
    pub fn params(&mut self, params: DitherParams) -> &mut Self {
        self.params = params;
        self
    }

    /// Returns the width and height of the input image.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }
}

#[cfg(feature = "image")]
impl<'a> TryFrom<&'a RgbImage> for DitherPipeline<'a> {
    type Error = DitherError;

    fn try_from(image: &'a RgbImage) -> Result<Self, Self::Error> {
        Self::new(image.try_into()?, image.width(), image.height())
    }
}

impl<'a> DitherPipeline<'a> {
    /// Logs the start of a run.
    fn log_start(&self) {
        let (width, height) = self.dimensions;
        let params = &self.params;
        debug!(
            width,
            height,
            algorithm = %params.algorithm,
            palette = %params.palette_source,
            palette_size = %params.palette_size,
            strength = %params.strength,
            seed = params.seed,
            "dithering image"
        );
    }

    /// Runs the pipeline and returns the dithered image along with its palette.
    ///
    /// # Errors
    /// Returns an error if the palette could not be built.
    pub fn run(&self) -> Result<DitherOutput, DitherError> {
        self.log_start();
        let (width, height) = self.dimensions;
        let DitherParams {
            algorithm,
            ref palette_source,
            palette_size,
            strength,
            seed,
        } = self.params;

        let palette = build_palette(self.colors, palette_source, palette_size)?;
        let pixels = dither::dither(&self.colors, width as usize, &palette, algorithm, strength, seed);

        debug!(pixels = pixels.len(), "dithering done");
        Ok(DitherOutput::new(palette, pixels, width, height))
    }

    /// Runs the pipeline in parallel and returns the dithered image along with its palette.
    ///
    /// The result is identical to [`DitherPipeline::run`].
    ///
    /// # Errors
    /// Returns an error if the palette could not be built.
    #[cfg(feature = "threads")]
    pub fn run_par(&self) -> Result<DitherOutput, DitherError> {
        self.log_start();
        let (width, height) = self.dimensions;
        let DitherParams {
            algorithm,
            ref palette_source,
            palette_size,
            strength,
            seed,
        } = self.params;

        let palette = build_palette_par(self.colors, palette_source, palette_size)?;
        let pixels =
            dither::dither_par(&self.colors, width as usize, &palette, algorithm, strength, seed);

        debug!(pixels = pixels.len(), "dithering done");
        Ok(DitherOutput::new(palette, pixels, width, height))
    }
}
