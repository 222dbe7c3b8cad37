//! Contains various types needed across the crate.

use crate::{DitherError, MAX_COLORS, MAX_PIXELS};
use std::{fmt::Display, ops::Deref};
#[cfg(feature = "image")]
use {
    image::RgbImage,
    palette::{cast::ComponentsAs, Srgb},
};

/// A simple new type wrapper around `&'a [Color]` with the invariant that the length of the
/// inner slice must not be greater than [`MAX_PIXELS`].
///
/// # Examples
/// Use `try_into` to create [`ColorSlice`]s.
///
/// From a raw color slice:
/// ```
/// # use dithertone::{ColorSlice, DitherError};
/// # use palette::Srgb;
/// # fn main() -> Result<(), DitherError> {
/// let srgb = vec![Srgb::new(0, 0, 0)];
/// let colors: ColorSlice<_> = srgb.as_slice().try_into()?;
/// # Ok(())
/// # }
/// ```
///
/// From an image (needs the `image` feature to be enabled):
/// ```no_run
/// # use dithertone::ColorSlice;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = image::open("some image")?.into_rgb8();
/// let colors = ColorSlice::try_from(&img)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorSlice<'a, Color>(&'a [Color]);

impl<'a, Color> Clone for ColorSlice<'a, Color> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, Color> Copy for ColorSlice<'a, Color> {}

impl<'a, Color> ColorSlice<'a, Color> {
    /// Creates a [`ColorSlice`] without ensuring that its length
    /// is less than or equal to [`MAX_PIXELS`].
    #[allow(unused)]
    pub(crate) const fn new_unchecked(colors: &'a [Color]) -> Self {
        Self(colors)
    }

    /// Returns the length of the slice as a `u32`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn num_colors(&self) -> u32 {
        self.0.len() as u32
    }

    /// Returns the inner slice with the lifetime of the original data.
    #[must_use]
    pub const fn as_slice(&self) -> &'a [Color] {
        self.0
    }
}

impl<'a, Color> AsRef<[Color]> for ColorSlice<'a, Color> {
    fn as_ref(&self) -> &[Color] {
        self
    }
}

impl<'a, Color> Deref for ColorSlice<'a, Color> {
    type Target = [Color];

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl<'a, Color> From<ColorSlice<'a, Color>> for &'a [Color] {
    fn from(val: ColorSlice<'a, Color>) -> Self {
        val.0
    }
}

impl<'a, Color> TryFrom<&'a [Color]> for ColorSlice<'a, Color> {
    type Error = DitherError;

    fn try_from(slice: &'a [Color]) -> Result<Self, Self::Error> {
        if slice.len() <= MAX_PIXELS as usize {
            Ok(Self(slice))
        } else {
            Err(DitherError::TooManyPixels)
        }
    }
}

#[cfg(feature = "image")]
impl<'a> TryFrom<&'a RgbImage> for ColorSlice<'a, Srgb<u8>> {
    type Error = DitherError;

    fn try_from(image: &'a RgbImage) -> Result<Self, Self::Error> {
        let pixels = image.pixels().len();
        if pixels <= MAX_PIXELS as usize {
            let buf = &image.as_raw()[..(pixels * 3)];
            Ok(Self(buf.components_as()))
        } else {
            Err(DitherError::TooManyPixels)
        }
    }
}

/// This type is used to specify the number of colors to generate for a palette.
///
/// This is a simple new type wrapper around `u16` with the invariant that it must be
/// in the range `1..=`[`MAX_COLORS`].
/// It is only consulted by the palette sources that generate colors
/// ([`PaletteSource::Auto`](crate::PaletteSource::Auto) and
/// [`PaletteSource::Grayscale`](crate::PaletteSource::Grayscale)).
///
/// # Examples
/// ```
/// # use dithertone::{PaletteSize, DitherError};
/// # fn main() -> Result<(), DitherError> {
/// let size = PaletteSize::try_from(16u16)?;
/// let size: PaletteSize = 128u16.try_into()?;
/// let size = PaletteSize::from_clamped(1024);
/// assert_eq!(size, PaletteSize::MAX);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PaletteSize(u16);

impl PaletteSize {
    /// The smallest palette size, a single color.
    pub const MIN: Self = Self(1);

    /// The maximum supported palette size (given by [`MAX_COLORS`]).
    pub const MAX: Self = Self(MAX_COLORS);

    /// Gets the inner `u16` value.
    #[must_use]
    pub const fn into_inner(self) -> u16 {
        self.0
    }

    /// Creates a [`PaletteSize`] by clamping the given `u16` to the range `1..=`[`MAX_COLORS`].
    #[must_use]
    pub const fn from_clamped(value: u16) -> Self {
        if value == 0 {
            Self::MIN
        } else if value <= MAX_COLORS {
            Self(value)
        } else {
            Self::MAX
        }
    }
}

impl Default for PaletteSize {
    fn default() -> Self {
        Self(8)
    }
}

impl From<PaletteSize> for u16 {
    fn from(val: PaletteSize) -> Self {
        val.into_inner()
    }
}

impl From<PaletteSize> for usize {
    fn from(val: PaletteSize) -> Self {
        val.into_inner().into()
    }
}

impl TryFrom<u16> for PaletteSize {
    type Error = DitherError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if (1..=MAX_COLORS).contains(&value) {
            Ok(PaletteSize(value))
        } else {
            Err(DitherError::InvalidPaletteSize(value))
        }
    }
}

impl Display for PaletteSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_inner())
    }
}

/// The dithering strength, a blend fraction in the range `0.0..=1.0`.
///
/// For the error diffusion algorithms, the strength linearly interpolates between a plain
/// nearest color quantization (`0.0`) and the fully dithered image (`1.0`).
/// For the ordered and random algorithms, the strength scales the threshold or noise
/// added to each pixel before it is matched against the palette.
///
/// # Examples
/// ```
/// # use dithertone::{Strength, DitherError};
/// # fn main() -> Result<(), DitherError> {
/// let strength = Strength::from_percent(75)?;
/// assert_eq!(strength.percent(), 75);
/// assert!(Strength::FULL.is_full());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Strength(f64);

impl Strength {
    /// No dithering, only plain quantization.
    pub const NONE: Self = Self(0.0);

    /// Full dithering.
    pub const FULL: Self = Self(1.0);

    /// Creates a [`Strength`] from an integer percent in the range `0..=100`.
    ///
    /// # Errors
    /// Returns [`DitherError::InvalidStrength`] if `percent` is above `100`.
    pub fn from_percent(percent: u16) -> Result<Self, DitherError> {
        if percent <= 100 {
            Ok(Self(f64::from(percent) / 100.0))
        } else {
            Err(DitherError::InvalidStrength(percent))
        }
    }

    /// Creates a [`Strength`] from a fraction.
    ///
    /// This will return `None` if `fraction` is not in the range `0.0..=1.0`.
    #[must_use]
    pub fn from_fraction(fraction: f64) -> Option<Self> {
        if (0.0..=1.0).contains(&fraction) {
            Some(Self(fraction))
        } else {
            None
        }
    }

    /// Gets the strength as a fraction in the range `0.0..=1.0`.
    #[must_use]
    pub const fn fraction(self) -> f64 {
        self.0
    }

    /// Gets the strength as a (rounded) integer percent.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round() as u8
    }

    /// Whether or not this strength applies the dither without any blending.
    #[must_use]
    pub fn is_full(self) -> bool {
        self.0 >= 1.0
    }
}

impl Default for Strength {
    fn default() -> Self {
        Self::FULL
    }
}

impl Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_size_range() {
        assert_eq!(
            PaletteSize::try_from(0u16),
            Err(DitherError::InvalidPaletteSize(0))
        );
        assert_eq!(
            PaletteSize::try_from(257u16),
            Err(DitherError::InvalidPaletteSize(257))
        );
        assert_eq!(PaletteSize::try_from(256u16), Ok(PaletteSize::MAX));
        assert_eq!(PaletteSize::from_clamped(0), PaletteSize::MIN);
        assert_eq!(PaletteSize::from_clamped(1000), PaletteSize::MAX);
        assert_eq!(PaletteSize::from_clamped(42).into_inner(), 42);
    }

    #[test]
    fn full_strength_boundary() {
        #[allow(clippy::unwrap_used)]
        let hundred = Strength::from_percent(100).unwrap();
        assert!(hundred.is_full());
        assert_eq!(hundred, Strength::FULL);

        #[allow(clippy::unwrap_used)]
        let ninety_nine = Strength::from_percent(99).unwrap();
        assert!(!ninety_nine.is_full());

        assert_eq!(
            Strength::from_percent(101),
            Err(DitherError::InvalidStrength(101))
        );
    }

    #[test]
    fn fraction_range() {
        assert_eq!(Strength::from_fraction(-0.1), None);
        assert_eq!(Strength::from_fraction(1.5), None);
        assert_eq!(Strength::from_fraction(f64::NAN), None);
        assert_eq!(Strength::from_fraction(0.0), Some(Strength::NONE));
    }

    #[test]
    fn empty_slice_is_valid() {
        let colors: &[u8] = &[];
        #[allow(clippy::unwrap_used)]
        let slice = ColorSlice::try_from(colors).unwrap();
        assert_eq!(slice.num_colors(), 0);
    }
}
