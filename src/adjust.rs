//! Hue, saturation, and value adjustment of a dithered image's palette.
//!
//! A dithered image only contains palette colors,
//! so it can be recolored by adjusting the palette and then swapping each old palette color
//! for its adjusted counterpart with [`recolor`].

use crate::Palette;
use palette::{FromColor, Hsv, Srgb};
use std::collections::HashMap;

/// A shift in hue, saturation, and value.
///
/// The hue shift is in degrees in the range `-180.0..=180.0` and wraps around the color wheel.
/// The saturation and value shifts are fractions in the range `-1.0..=1.0`
/// and the shifted values are clamped to `0.0..=1.0`.
///
/// # Examples
/// ```
/// # use dithertone::adjust::HsvShift;
/// let shift = HsvShift::new(90.0, -0.25, 0.1).unwrap();
/// assert!(HsvShift::new(200.0, 0.0, 0.0).is_none());
/// assert!(HsvShift::default().is_identity());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HsvShift {
    /// The hue shift in degrees.
    hue: f32,
    /// The saturation shift.
    saturation: f32,
    /// The value shift.
    value: f32,
}

impl HsvShift {
    /// Creates a new [`HsvShift`].
    ///
    /// This will return `None` if `hue` is not in the range `-180.0..=180.0`
    /// or if `saturation` or `value` are not in the range `-1.0..=1.0`.
    #[must_use]
    pub fn new(hue: f32, saturation: f32, value: f32) -> Option<Self> {
        let unit = -1.0..=1.0;
        if (-180.0..=180.0).contains(&hue) && unit.contains(&saturation) && unit.contains(&value) {
            Some(Self { hue, saturation, value })
        } else {
            None
        }
    }

    /// Creates a new [`HsvShift`] from integer slider positions:
    /// degrees for the hue and percents for the saturation and value.
    ///
    /// The inputs are clamped to `-180..=180` and `-100..=100` respectively.
    #[must_use]
    pub fn from_sliders(hue: i16, saturation: i8, value: i8) -> Self {
        let percent = |x: i8| f32::from(x.clamp(-100, 100)) / 100.0;
        Self {
            hue: f32::from(hue.clamp(-180, 180)),
            saturation: percent(saturation),
            value: percent(value),
        }
    }

    /// The hue shift in degrees.
    #[must_use]
    pub const fn hue(&self) -> f32 {
        self.hue
    }

    /// The saturation shift.
    #[must_use]
    pub const fn saturation(&self) -> f32 {
        self.saturation
    }

    /// The value shift.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Whether or not this shift leaves every color as is.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_identity(&self) -> bool {
        self.hue == 0.0 && self.saturation == 0.0 && self.value == 0.0
    }

    /// Applies the shift to a single color.
    ///
    /// The adjusted components are truncated to 8 bits.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn apply(&self, color: Srgb<u8>) -> Srgb<u8> {
        let hsv: Hsv = Hsv::from_color(color.into_format::<f32>());
        let hue = (hsv.hue.into_positive_degrees() + self.hue).rem_euclid(360.0);
        let saturation = (hsv.saturation + self.saturation).clamp(0.0, 1.0);
        let value = (hsv.value + self.value).clamp(0.0, 1.0);

        let adjusted: Hsv = Hsv::new(hue, saturation, value);
        let rgb: Srgb = Srgb::from_color(adjusted);
        let truncate = |c: f32| (c * 255.0).clamp(0.0, 255.0) as u8;
        Srgb::new(truncate(rgb.red), truncate(rgb.green), truncate(rgb.blue))
    }
}

/// Returns a new palette with `shift` applied to each color, in the same order.
///
/// The identity shift returns an exact copy of the palette.
#[must_use]
pub fn adjust_palette(palette: &Palette, shift: HsvShift) -> Palette {
    if shift.is_identity() {
        palette.clone()
    } else {
        Palette::new_unchecked(palette.iter().map(|&color| shift.apply(color)).collect())
    }
}

/// Replaces every pixel equal to `old[i]` with `new[i]`.
///
/// If a color occurs multiple times in `old`, the last occurrence wins.
/// Pixels that are not in `old` are left unchanged.
/// Extra colors in the longer of `old` and `new` are ignored.
#[must_use]
pub fn recolor(pixels: &[Srgb<u8>], old: &[Srgb<u8>], new: &[Srgb<u8>]) -> Vec<Srgb<u8>> {
    let map = old
        .iter()
        .zip(new)
        .map(|(&old, &new)| (old.into_components(), new))
        .collect::<HashMap<_, _>>();

    pixels
        .iter()
        .map(|&pixel| map.get(&pixel.into_components()).copied().unwrap_or(pixel))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    const RED: Srgb<u8> = Srgb::new(255, 0, 0);

    #[test]
    fn shift_ranges() {
        assert!(HsvShift::new(180.0, 1.0, -1.0).is_some());
        assert!(HsvShift::new(-180.5, 0.0, 0.0).is_none());
        assert!(HsvShift::new(0.0, 1.5, 0.0).is_none());
        assert!(HsvShift::new(0.0, 0.0, f32::NAN).is_none());
        assert_eq!(
            HsvShift::from_sliders(400, -120, 50),
            HsvShift::new(180.0, -1.0, 0.5).unwrap()
        );
    }

    #[test]
    fn hue_rotation() {
        let shift = HsvShift::new(120.0, 0.0, 0.0).unwrap();
        assert_eq!(shift.apply(RED), Srgb::new(0, 255, 0));

        let forward = HsvShift::new(180.0, 0.0, 0.0).unwrap();
        let backward = HsvShift::new(-180.0, 0.0, 0.0).unwrap();
        assert_eq!(forward.apply(RED), Srgb::new(0, 255, 255));
        assert_eq!(forward.apply(RED), backward.apply(RED));
    }

    #[test]
    fn saturation_and_value_clamp() {
        let desaturate = HsvShift::new(0.0, -1.0, 0.0).unwrap();
        assert_eq!(desaturate.apply(RED), Srgb::new(255, 255, 255));

        let darken = HsvShift::new(0.0, 0.0, -1.0).unwrap();
        assert_eq!(darken.apply(RED), Srgb::new(0, 0, 0));

        let brighten = HsvShift::new(0.0, 0.0, 1.0).unwrap();
        assert_eq!(brighten.apply(RED), RED);
    }

    #[test]
    fn identity_keeps_palette() {
        let palette = Palette::try_from(test_data_256()).unwrap();
        assert_eq!(adjust_palette(&palette, HsvShift::default()), palette);

        let shift = HsvShift::new(45.0, 0.2, -0.3).unwrap();
        assert_eq!(adjust_palette(&palette, shift).len(), palette.len());
    }

    #[test]
    fn recolor_swaps_palette_colors() {
        let black = Srgb::new(0, 0, 0);
        let white = Srgb::new(255, 255, 255);
        let gray = Srgb::new(128, 128, 128);
        let pixels = [black, white, gray, black];

        let output = recolor(&pixels, &[black, white], &[RED, black]);
        assert_eq!(output, vec![RED, black, gray, RED]);
    }

    #[test]
    fn recolor_later_duplicates_win() {
        let black = Srgb::new(0, 0, 0);
        let blue = Srgb::new(0, 0, 255);
        let output = recolor(&[black], &[black, black], &[RED, blue]);
        assert_eq!(output, vec![blue]);
    }
}
