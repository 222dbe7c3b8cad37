//! Color grading with tone-mapping lookup tables.
//!
//! The per-channel tables are built once on first use and then shared by all threads.

use crate::{palettes::normalize_name, DitherError};
use palette::Srgb;
use std::{fmt::Display, str::FromStr, sync::OnceLock};
use tracing::debug;

/// A table mapping each `u8` value to a new one, for each of the red, green, and blue channels.
pub type ChannelTables = [[u8; 256]; 3];

/// The available color grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lut {
    /// A warm brown tone computed with a color matrix.
    Sepia,
    /// Inverts each channel.
    Invert,
    /// Dims red and green and boosts blue.
    Cool,
}

/// The sepia color matrix, one row per output channel.
const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Builds a channel table from a function for each channel.
#[allow(clippy::cast_possible_truncation)]
fn build_tables(f: impl Fn(usize, u8) -> u8) -> ChannelTables {
    std::array::from_fn(|channel| std::array::from_fn(|i| f(channel, i as u8)))
}

impl Lut {
    /// All color grades.
    pub const ALL: [Self; 3] = [Self::Sepia, Self::Invert, Self::Cool];

    /// The human readable name of the color grade.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sepia => "Sepia",
            Self::Invert => "Invert",
            Self::Cool => "Cool",
        }
    }

    /// Returns the cached per-channel tables for this grade,
    /// or `None` for grades that mix channels and so cannot be expressed as per-channel tables.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn tables(self) -> Option<&'static ChannelTables> {
        static INVERT: OnceLock<ChannelTables> = OnceLock::new();
        static COOL: OnceLock<ChannelTables> = OnceLock::new();

        match self {
            Self::Sepia => None,
            Self::Invert => Some(INVERT.get_or_init(|| {
                debug!(lut = %self, "building lookup table");
                build_tables(|_, c| 255 - c)
            })),
            Self::Cool => Some(COOL.get_or_init(|| {
                debug!(lut = %self, "building lookup table");
                build_tables(|channel, c| {
                    let c = f64::from(c);
                    match channel {
                        0 => (c * 0.8) as u8,
                        1 => (c * 0.9) as u8,
                        _ => (c * 1.2).min(255.0) as u8,
                    }
                })
            })),
        }
    }

    /// Applies this grade to a single color.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn apply(self, color: Srgb<u8>) -> Srgb<u8> {
        let (r, g, b) = color.into_components();
        if let Some(tables) = self.tables() {
            Srgb::new(
                tables[0][usize::from(r)],
                tables[1][usize::from(g)],
                tables[2][usize::from(b)],
            )
        } else {
            let input = [r, g, b].map(f32::from);
            let [r, g, b] = SEPIA.map(|row| {
                let v = row[0] * input[0] + row[1] * input[1] + row[2] * input[2];
                v.round().clamp(0.0, 255.0) as u8
            });
            Srgb::new(r, g, b)
        }
    }
}

impl Display for Lut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Lut {
    type Err = DitherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "sepia" => Ok(Self::Sepia),
            "invert" | "negative" => Ok(Self::Invert),
            "cool" => Ok(Self::Cool),
            _ => Err(DitherError::UnknownLut(s.to_owned())),
        }
    }
}

/// Returns a new pixel buffer with the color grade `lut` applied to every pixel.
///
/// # Examples
/// ```
/// # use dithertone::lut::{apply_lut, Lut};
/// # use palette::Srgb;
/// let pixels = [Srgb::new(0, 100, 255)];
/// assert_eq!(apply_lut(&pixels, Lut::Invert), vec![Srgb::new(255, 155, 0)]);
/// ```
#[must_use]
pub fn apply_lut(pixels: &[Srgb<u8>], lut: Lut) -> Vec<Srgb<u8>> {
    debug!(lut = %lut, pixels = pixels.len(), "applying color grade");
    pixels.iter().map(|&color| lut.apply(color)).collect()
}
