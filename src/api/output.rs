//! Contains the [`DitherOutput`] returned by a dithering run.

use crate::{
    adjust::{adjust_palette, recolor, HsvShift},
    lut::{apply_lut, Lut},
    Palette,
};
use palette::Srgb;
#[cfg(feature = "image")]
use {image::RgbImage, palette::cast::IntoComponents};

/// A dithered image together with the palette it was dithered onto.
///
/// The palette is kept so that the image can later be recolored with [`DitherOutput::adjusted`]
/// without dithering it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DitherOutput {
    /// The palette the image was dithered onto.
    palette: Palette,
    /// The dithered pixels in row-major order.
    pixels: Vec<Srgb<u8>>,
    /// The width of the image.
    width: u32,
    /// The height of the image.
    height: u32,
}

impl DitherOutput {
    /// Creates a new [`DitherOutput`].
    pub(crate) fn new(palette: Palette, pixels: Vec<Srgb<u8>>, width: u32, height: u32) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self { palette, pixels, width, height }
    }

    /// Returns the palette the image was dithered onto.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Returns the dithered pixels in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[Srgb<u8>] {
        &self.pixels
    }

    /// Returns the width and height of the image.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the palette and the pixels.
    #[must_use]
    pub fn into_parts(self) -> (Palette, Vec<Srgb<u8>>) {
        (self.palette, self.pixels)
    }

    /// Converts the output into an [`RgbImage`].
    #[cfg(feature = "image")]
    #[must_use]
    pub fn into_rgbimage(self) -> RgbImage {
        let Self { pixels, width, height, .. } = self;
        let buf: Vec<u8> = pixels.into_components();

        #[allow(clippy::expect_used)]
        {
            // pixels.len() is always width * height
            RgbImage::from_vec(width, height, buf).expect("large enough buffer")
        }
    }

    /// Returns a copy of the output with `shift` applied to the palette,
    /// and every pixel swapped for its adjusted palette color.
    ///
    /// Pixels that are not palette colors (from blending at partial strength) are kept as is.
    #[must_use]
    pub fn adjusted(&self, shift: HsvShift) -> Self {
        if shift.is_identity() {
            return self.clone();
        }

        let palette = adjust_palette(&self.palette, shift);
        let pixels = recolor(&self.pixels, &self.palette, &palette);
        Self::new(palette, pixels, self.width, self.height)
    }

    /// Returns a copy of the output with the color grade `lut` applied to the palette and all pixels.
    #[must_use]
    pub fn graded(&self, lut: Lut) -> Self {
        let palette = Palette::new_unchecked(apply_lut(&self.palette, lut));
        let pixels = apply_lut(&self.pixels, lut);
        Self::new(palette, pixels, self.width, self.height)
    }
}
