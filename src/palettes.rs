//! Contains the [`Palette`] type and the palette sources used to build one.

use crate::{wu, ColorSlice, DitherError, PaletteSize, MAX_K};
use bitvec::vec::BitVec;
use palette::Srgb;
use std::{fmt::Display, ops::Deref, str::FromStr};
use tracing::{debug, trace};

/// An ordered, non-empty list of at most [`MAX_COLORS`](crate::MAX_COLORS) colors.
///
/// The order of the colors does not affect dithering,
/// but it is kept so that colors can later be matched back up by index
/// (e.g., by [`adjust::recolor`](crate::adjust::recolor)).
///
/// # Examples
/// ```
/// # use dithertone::{Palette, DitherError};
/// # use palette::Srgb;
/// # fn main() -> Result<(), DitherError> {
/// let palette = Palette::try_from(vec![Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)])?;
/// assert_eq!(palette.num_colors(), 2);
///
/// assert_eq!(Palette::try_from(Vec::<Srgb<u8>>::new()), Err(DitherError::EmptyPalette));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[repr(transparent)]
pub struct Palette(Vec<Srgb<u8>>);

impl Palette {
    /// Creates a [`Palette`] without checking its length.
    pub(crate) fn new_unchecked(colors: Vec<Srgb<u8>>) -> Self {
        debug_assert!((1..=MAX_K).contains(&colors.len()));
        Self(colors)
    }

    /// Returns the palette colors as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Srgb<u8>] {
        &self.0
    }

    /// Returns the inner `Vec` of colors.
    #[must_use]
    pub fn into_inner(self) -> Vec<Srgb<u8>> {
        self.0
    }

    /// Returns the number of colors in the palette.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn num_colors(&self) -> u16 {
        self.0.len() as u16
    }
}

impl Deref for Palette {
    type Target = [Srgb<u8>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[Srgb<u8>]> for Palette {
    fn as_ref(&self) -> &[Srgb<u8>] {
        &self.0
    }
}

impl From<Palette> for Vec<Srgb<u8>> {
    fn from(value: Palette) -> Self {
        value.into_inner()
    }
}

impl TryFrom<Vec<Srgb<u8>>> for Palette {
    type Error = DitherError;

    fn try_from(colors: Vec<Srgb<u8>>) -> Result<Self, Self::Error> {
        match colors.len() {
            0 => Err(DitherError::EmptyPalette),
            len if len > MAX_K => Err(DitherError::TooManyColors(len)),
            _ => Ok(Self(colors)),
        }
    }
}

impl TryFrom<&[Srgb<u8>]> for Palette {
    type Error = DitherError;

    fn try_from(colors: &[Srgb<u8>]) -> Result<Self, Self::Error> {
        colors.to_vec().try_into()
    }
}

/// The 4 shades of green of the original Game Boy.
pub const GAME_BOY: [Srgb<u8>; 4] = [
    Srgb::new(15, 56, 15),
    Srgb::new(48, 98, 48),
    Srgb::new(139, 172, 15),
    Srgb::new(155, 188, 15),
];

/// The 16 color palette of the PICO-8 fantasy console.
pub const PICO_8: [Srgb<u8>; 16] = [
    Srgb::new(0, 0, 0),
    Srgb::new(29, 43, 83),
    Srgb::new(126, 37, 83),
    Srgb::new(0, 135, 81),
    Srgb::new(171, 82, 54),
    Srgb::new(95, 87, 79),
    Srgb::new(194, 195, 199),
    Srgb::new(255, 241, 232),
    Srgb::new(255, 0, 77),
    Srgb::new(255, 163, 0),
    Srgb::new(255, 236, 39),
    Srgb::new(0, 228, 54),
    Srgb::new(41, 173, 255),
    Srgb::new(131, 118, 156),
    Srgb::new(255, 119, 168),
    Srgb::new(255, 204, 170),
];

/// CGA palette 0 (low intensity): black, green, red, and brown.
pub const CGA: [Srgb<u8>; 4] = [
    Srgb::new(0, 0, 0),
    Srgb::new(0, 170, 0),
    Srgb::new(170, 0, 0),
    Srgb::new(170, 85, 0),
];

/// Lowercases `name` and strips everything but letters and digits,
/// so that `"Game Boy"`, `"game-boy"`, and `"gameboy"` all compare equal.
pub(crate) fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// The set of fixed, built-in palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedPalette {
    /// See [`GAME_BOY`].
    GameBoy,
    /// See [`PICO_8`].
    Pico8,
    /// See [`CGA`].
    Cga,
}

impl NamedPalette {
    /// All of the built-in palettes.
    pub const ALL: [Self; 3] = [Self::GameBoy, Self::Pico8, Self::Cga];

    /// Returns the colors of this palette.
    #[must_use]
    pub const fn colors(self) -> &'static [Srgb<u8>] {
        match self {
            NamedPalette::GameBoy => &GAME_BOY,
            NamedPalette::Pico8 => &PICO_8,
            NamedPalette::Cga => &CGA,
        }
    }

    /// Returns the display name of this palette.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            NamedPalette::GameBoy => "Game Boy",
            NamedPalette::Pico8 => "PICO-8",
            NamedPalette::Cga => "CGA",
        }
    }

    /// Returns this palette as a [`Palette`].
    #[must_use]
    pub fn palette(self) -> Palette {
        Palette::new_unchecked(self.colors().to_vec())
    }
}

impl Display for NamedPalette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamedPalette {
    type Err = DitherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = normalize_name(s);
        Self::ALL
            .into_iter()
            .find(|palette| normalize_name(palette.name()) == name)
            .ok_or_else(|| DitherError::UnknownPalette(s.to_owned()))
    }
}

/// Specifies where the colors of the output palette come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaletteSource {
    /// Colors representative of the input image, computed with Wu's color quantizer
    /// (see the [`wu`] module).
    #[default]
    Auto,
    /// A linear gray ramp from black to white (see [`grayscale`]).
    Grayscale,
    /// One of the built-in palettes, used as is.
    Named(NamedPalette),
    /// A caller supplied palette, used as is.
    Custom(Palette),
}

impl PaletteSource {
    /// Whether or not this source uses the requested [`PaletteSize`].
    ///
    /// Fixed palettes ignore it.
    #[must_use]
    pub const fn uses_palette_size(&self) -> bool {
        matches!(self, PaletteSource::Auto | PaletteSource::Grayscale)
    }
}

impl Display for PaletteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaletteSource::Auto => f.write_str("Auto (From Image)"),
            PaletteSource::Grayscale => f.write_str("Grayscale"),
            PaletteSource::Named(named) => write!(f, "{named}"),
            PaletteSource::Custom(palette) => write!(f, "Custom ({} colors)", palette.len()),
        }
    }
}

impl From<NamedPalette> for PaletteSource {
    fn from(named: NamedPalette) -> Self {
        Self::Named(named)
    }
}

impl From<Palette> for PaletteSource {
    fn from(palette: Palette) -> Self {
        Self::Custom(palette)
    }
}

impl FromStr for PaletteSource {
    type Err = DitherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "auto" | "autofromimage" | "fromimage" => Ok(Self::Auto),
            "grayscale" | "greyscale" | "gray" | "grey" => Ok(Self::Grayscale),
            _ => s.parse().map(Self::Named),
        }
    }
}

/// Returns `size` evenly spaced shades of gray from black to white (inclusive).
///
/// The `i`-th shade is `round(i * 255 / (size - 1))`, with halves rounded up.
/// A `size` of `1` gives a palette with only black.
///
/// # Examples
/// ```
/// # use dithertone::{grayscale, PaletteSize, DitherError};
/// # use palette::Srgb;
/// # fn main() -> Result<(), DitherError> {
/// let palette = grayscale(PaletteSize::try_from(4u16)?);
/// assert_eq!(
///     palette.as_slice(),
///     [0, 85, 170, 255].map(|v| Srgb::new(v, v, v)),
/// );
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn grayscale(size: PaletteSize) -> Palette {
    let n = u32::from(size.into_inner());
    if n == 1 {
        return Palette::new_unchecked(vec![Srgb::new(0, 0, 0)]);
    }

    let steps = n - 1;
    let colors = (0..n)
        .map(|i| {
            #[allow(clippy::cast_possible_truncation)]
            let v = ((2 * i * 255 + steps) / (2 * steps)) as u8;
            Srgb::new(v, v, v)
        })
        .collect();

    Palette::new_unchecked(colors)
}

/// Builds the palette for `colors` as specified by `source`.
///
/// `size` is only used by [`PaletteSource::Auto`] and [`PaletteSource::Grayscale`].
/// Both return exactly `size` colors. [`PaletteSource::Auto`] only repeats colors
/// when the image has fewer than `size` distinct colors.
///
/// # Errors
/// Returns [`DitherError::EmptyImage`] if `source` is [`PaletteSource::Auto`] and `colors` is empty.
pub fn build_palette(
    colors: ColorSlice<Srgb<u8>>,
    source: &PaletteSource,
    size: PaletteSize,
) -> Result<Palette, DitherError> {
    let palette = match source {
        PaletteSource::Auto => auto_palette(&colors, wu::palette(colors, size), size)?,
        PaletteSource::Grayscale => grayscale(size),
        PaletteSource::Named(named) => named.palette(),
        PaletteSource::Custom(palette) => palette.clone(),
    };

    debug!(source = %source, colors = palette.len(), "built palette");
    Ok(palette)
}

/// Builds the palette for `colors` as specified by `source`,
/// running the automatic quantizer in parallel.
///
/// See [`build_palette`] for more details.
///
/// # Errors
/// Returns [`DitherError::EmptyImage`] if `source` is [`PaletteSource::Auto`] and `colors` is empty.
#[cfg(feature = "threads")]
pub fn build_palette_par(
    colors: ColorSlice<Srgb<u8>>,
    source: &PaletteSource,
    size: PaletteSize,
) -> Result<Palette, DitherError> {
    match source {
        PaletteSource::Auto => {
            let palette = auto_palette(&colors, wu::palette_par(colors, size), size)?;
            debug!(source = %source, colors = palette.len(), "built palette");
            Ok(palette)
        }
        source => build_palette(colors, source, size),
    }
}

/// Completes the output of the automatic quantizer into a palette of exactly `size` colors.
///
/// Wu's quantizer works on a 32×32×32 histogram, so it returns fewer colors than requested
/// when the image colors fall into too few bins. The missing colors are then taken from
/// the image itself. If the image has no more than `size` distinct colors,
/// those colors make up the palette, repeated as needed to fill it.
fn auto_palette(
    colors: &[Srgb<u8>],
    quantized: Vec<Srgb<u8>>,
    size: PaletteSize,
) -> Result<Palette, DitherError> {
    if colors.is_empty() {
        return Err(DitherError::EmptyImage { width: 0, height: 0 });
    }

    let k = usize::from(size);
    let mut palette = Vec::with_capacity(k);
    for color in quantized {
        if !palette.contains(&color) {
            palette.push(color);
        }
    }

    if palette.len() < k {
        let distinct = distinct_colors(colors);
        trace!(quantized = palette.len(), distinct = distinct.len(), "filling auto palette");
        if distinct.len() <= k {
            palette = distinct.iter().copied().cycle().take(k).collect();
        } else {
            add_farthest_colors(&mut palette, &distinct, k);
        }
    }

    Ok(Palette::new_unchecked(palette))
}

/// Returns the distinct colors of `colors` in order of first appearance.
fn distinct_colors(colors: &[Srgb<u8>]) -> Vec<Srgb<u8>> {
    let mut seen: BitVec = BitVec::repeat(false, 1 << 24);
    let mut distinct = Vec::new();
    for &color in colors {
        let Srgb { red, green, blue, .. } = color;
        let i = (usize::from(red) << 16) | (usize::from(green) << 8) | usize::from(blue);
        if !seen[i] {
            seen.set(i, true);
            distinct.push(color);
        }
    }
    distinct
}

/// Squared euclidean distance between two colors.
fn distance(a: Srgb<u8>, b: Srgb<u8>) -> u32 {
    let d = |x: u8, y: u8| u32::from(x.abs_diff(y)).pow(2);
    d(a.red, b.red) + d(a.green, b.green) + d(a.blue, b.blue)
}

/// Adds the candidate farthest away from all palette colors until the palette has `k` colors.
///
/// Ties go to the earliest candidate. `candidates` must hold more than `k` distinct colors.
fn add_farthest_colors(palette: &mut Vec<Srgb<u8>>, candidates: &[Srgb<u8>], k: usize) {
    let mut min_distance = candidates
        .iter()
        .map(|&c| palette.iter().map(|&p| distance(c, p)).min().unwrap_or(u32::MAX))
        .collect::<Vec<_>>();

    while palette.len() < k {
        let (i, _) = min_distance
            .iter()
            .enumerate()
            .fold((0, 0), |best, (i, &d)| if d > best.1 { (i, d) } else { best });

        let color = candidates[i];
        palette.push(color);
        for (d, &c) in min_distance.iter_mut().zip(candidates) {
            *d = (*d).min(distance(c, color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[allow(clippy::unwrap_used)]
    fn size(k: u16) -> PaletteSize {
        PaletteSize::try_from(k).unwrap()
    }

    fn gray(v: u8) -> Srgb<u8> {
        Srgb::new(v, v, v)
    }

    #[test]
    fn grayscale_ramp() {
        assert_eq!(
            grayscale(size(4)).as_slice(),
            [gray(0), gray(85), gray(170), gray(255)]
        );
        assert_eq!(grayscale(size(2)).as_slice(), [gray(0), gray(255)]);
        assert_eq!(grayscale(size(3)).as_slice(), [gray(0), gray(128), gray(255)]);
        assert_eq!(grayscale(size(1)).as_slice(), [gray(0)]);

        let full = grayscale(PaletteSize::MAX);
        assert_eq!(full.len(), 256);
        #[allow(clippy::cast_possible_truncation)]
        for (i, &color) in full.iter().enumerate() {
            assert_eq!(color, gray(i as u8));
        }
    }

    #[test]
    fn named_palettes_ignore_size() {
        let colors = test_data_1024();
        let colors = ColorSlice::new_unchecked(&colors);

        for k in [1, 2, 16, 256] {
            let source = PaletteSource::Named(NamedPalette::GameBoy);
            let palette = build_palette(colors, &source, size(k)).unwrap_or_else(|e| panic!("{e}"));
            assert_eq!(palette.as_slice(), GAME_BOY);
        }

        let source = PaletteSource::Named(NamedPalette::Pico8);
        let palette = build_palette(colors, &source, size(2)).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(palette.as_slice(), PICO_8);
    }

    #[test]
    fn custom_palette_verbatim() {
        let custom = Palette::new_unchecked(vec![gray(200), gray(10), gray(200)]);
        let source = PaletteSource::Custom(custom.clone());
        let colors = test_data_256();
        let palette = build_palette(ColorSlice::new_unchecked(&colors), &source, size(8))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(palette, custom);
    }

    #[test]
    fn auto_palette_size() {
        let colors = test_data_1024();
        let colors = ColorSlice::new_unchecked(&colors);

        let palette = build_palette(colors, &PaletteSource::Auto, size(16))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(palette.len(), 16);

        #[cfg(feature = "threads")]
        {
            let par = build_palette_par(colors, &PaletteSource::Auto, size(16))
                .unwrap_or_else(|e| panic!("{e}"));
            assert_eq!(palette, par);
        }
    }

    #[test]
    fn auto_palette_splits_shared_bins() {
        // all of these fall into the same histogram bin
        let colors = (0..8).flat_map(|v| [gray(v); 4]).collect::<Vec<_>>();
        let colors = ColorSlice::new_unchecked(&colors);

        for k in [2, 4, 7] {
            let palette = build_palette(colors, &PaletteSource::Auto, size(k))
                .unwrap_or_else(|e| panic!("{e}"));
            assert_eq!(palette.len(), usize::from(k));
            assert_eq!(distinct_colors(&palette).len(), usize::from(k));
            assert!(palette.iter().all(|c| c.red < 8 && c.red == c.green && c.green == c.blue));

            #[cfg(feature = "threads")]
            {
                let par = build_palette_par(colors, &PaletteSource::Auto, size(k))
                    .unwrap_or_else(|e| panic!("{e}"));
                assert_eq!(palette, par);
            }
        }

        let palette = build_palette(colors, &PaletteSource::Auto, size(8))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(palette.as_slice(), (0..8).map(gray).collect::<Vec<_>>());
    }

    #[test]
    fn auto_palette_repeats_only_when_needed() {
        let image = [gray(3), gray(200), gray(4), gray(200), Srgb::new(9, 80, 40)];
        let colors = ColorSlice::new_unchecked(&image);

        let palette = build_palette(colors, &PaletteSource::Auto, size(6))
            .unwrap_or_else(|e| panic!("{e}"));
        let distinct = [gray(3), gray(200), gray(4), Srgb::new(9, 80, 40)];
        assert_eq!(palette.len(), 6);
        assert_eq!(palette[..4], distinct);
        assert_eq!(palette[4..], distinct[..2]);

        let palette = build_palette(colors, &PaletteSource::Auto, size(4))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(distinct_colors(&palette).len(), 4);
    }

    #[test]
    fn farthest_colors_are_added_first() {
        let candidates = [gray(10), gray(0), gray(250), gray(128), gray(60)];
        let mut palette = vec![gray(10)];
        add_farthest_colors(&mut palette, &candidates, 3);
        assert_eq!(palette, [gray(10), gray(250), gray(128)]);
    }

    #[test]
    fn auto_palette_of_empty_image() {
        let result = build_palette(ColorSlice::new_unchecked(&[]), &PaletteSource::Auto, size(4));
        assert_eq!(result, Err(DitherError::EmptyImage { width: 0, height: 0 }));
    }

    #[test]
    fn fixed_sources_ignore_size() {
        assert!(PaletteSource::Auto.uses_palette_size());
        assert!(PaletteSource::Grayscale.uses_palette_size());
        assert!(!PaletteSource::Named(NamedPalette::Cga).uses_palette_size());
        assert!(!PaletteSource::Custom(grayscale(size(3))).uses_palette_size());
    }

    #[test]
    fn parse_names() {
        assert_eq!("Game Boy".parse(), Ok(NamedPalette::GameBoy));
        assert_eq!("gameboy".parse(), Ok(NamedPalette::GameBoy));
        assert_eq!("pico8".parse(), Ok(NamedPalette::Pico8));
        assert_eq!("CGA".parse(), Ok(NamedPalette::Cga));
        assert_eq!(
            "NES".parse::<NamedPalette>(),
            Err(DitherError::UnknownPalette("NES".into()))
        );

        assert_eq!("Auto (From Image)".parse(), Ok(PaletteSource::Auto));
        assert_eq!("greyscale".parse(), Ok(PaletteSource::Grayscale));
        assert_eq!(
            "PICO-8".parse(),
            Ok(PaletteSource::Named(NamedPalette::Pico8))
        );
        assert_eq!(
            "sepia".parse::<PaletteSource>(),
            Err(DitherError::UnknownPalette("sepia".into()))
        );

        for named in NamedPalette::ALL {
            assert_eq!(named.to_string().parse(), Ok(named));
        }
    }

    #[test]
    fn palette_length_invariant() {
        assert_eq!(Palette::try_from(Vec::<Srgb<u8>>::new()), Err(DitherError::EmptyPalette));
        assert_eq!(
            Palette::try_from(vec![gray(0); 257]),
            Err(DitherError::TooManyColors(257))
        );
        assert!(Palette::try_from(vec![gray(0); 256]).is_ok());
    }
}
