//! A library for dithering images down to a small color palette.
//!
//! `dithertone` picks a palette for an image (derived from the image itself, a grayscale ramp,
//! or one of several fixed retro palettes) and then maps every pixel onto that palette using
//! one of several dithering algorithms:
//! - error diffusion: Floyd–Steinberg, Atkinson, Jarvis–Judice–Ninke, and Stucki
//! - ordered dithering: an 8×8 Bayer matrix and a 4×4 clustered-dot halftone
//! - random (noise) dithering with a caller supplied seed
//!
//! The amount of dithering is controlled by a [`Strength`] which, for error diffusion,
//! blends the dithered result with a plain nearest-color quantization.
//!
//! # Features
//! To reduce dependencies and compile times, `dithertone` has several `cargo` features
//! that can be turned off or on:
//! - `threads`: exposes parallel versions of the pixel-independent passes via [`rayon`].
//! - `image`: enables integration with the [`image`] crate.
//!
//! # High-Level API
//! To get started, see [`process`] or the [`DitherPipeline`] builder:
//! ```no_run
//! # use dithertone::{DitherAlgorithm, DitherPipeline, NamedPalette, PaletteSource, Strength};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("some image")?.into_rgb8();
//!
//! let output = DitherPipeline::try_from(&img)?
//!     .algorithm(DitherAlgorithm::Atkinson)
//!     .palette_source(PaletteSource::Named(NamedPalette::GameBoy))
//!     .strength(Strength::from_percent(80)?)
//!     .run()?;
//!
//! let dithered = output.into_rgbimage();
//! # Ok(())
//! # }
//! ```
//!
//! Note that some of the options and functions above require certain features to be enabled.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod api;
mod blender;
mod error;
mod nearest;
mod palettes;
mod types;

pub mod adjust;
pub mod dither;
pub mod lut;
pub mod wu;

pub use api::*;
pub use blender::*;
pub use dither::DitherAlgorithm;
pub use error::DitherError;
pub use nearest::{closest, NearestColor};
pub use palettes::*;
pub use types::*;

/// The maximum supported image size in number of pixels is `u32::MAX`.
pub const MAX_PIXELS: u32 = u32::MAX;

/// The maximum supported number of palette colors is `256`.
pub const MAX_COLORS: u16 = u8::MAX as u16 + 1;

/// `MAX_COLORS` as a `usize` for array and `Vec` lengths.
pub(crate) const MAX_K: usize = MAX_COLORS as usize;

#[cfg(test)]
pub(crate) mod tests {
    use palette::Srgb;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoroshiro128PlusPlus;

    /// Deterministic pseudo-random colors.
    fn test_data(len: usize, seed: u64) -> Vec<Srgb<u8>> {
        let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
        (0..len)
            .map(|_| Srgb::new(rng.gen(), rng.gen(), rng.gen()))
            .collect()
    }

    pub fn test_data_256() -> Vec<Srgb<u8>> {
        test_data(256, 256)
    }

    pub fn test_data_1024() -> Vec<Srgb<u8>> {
        test_data(1024, 1024)
    }

    /// A smooth diagonal RGB gradient of the given size.
    #[allow(clippy::cast_possible_truncation)]
    pub fn gradient(width: u32, height: u32) -> Vec<Srgb<u8>> {
        let span = (width + height).max(2) - 2;
        let span = span.max(1);
        (0..height)
            .flat_map(|y| {
                (0..width).map(move |x| {
                    let t = (x + y) * 255 / span;
                    Srgb::new(t as u8, (x * 255 / width.max(1)) as u8, (255 - t) as u8)
                })
            })
            .collect()
    }

    /// An image filled with a single color.
    pub fn solid(width: u32, height: u32, color: Srgb<u8>) -> Vec<Srgb<u8>> {
        vec![color; width as usize * height as usize]
    }
}
