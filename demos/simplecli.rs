#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use dithertone::{
    adjust::HsvShift, lut::Lut, DitherAlgorithm, DitherPipeline, PaletteSize, PaletteSource,
    Strength,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, ValueEnum)]
enum CliAlgorithm {
    FloydSteinberg,
    Atkinson,
    Jjn,
    Stucki,
    Bayer,
    ClusteredDot,
    Random,
}

impl From<CliAlgorithm> for DitherAlgorithm {
    fn from(value: CliAlgorithm) -> Self {
        match value {
            CliAlgorithm::FloydSteinberg => DitherAlgorithm::FloydSteinberg,
            CliAlgorithm::Atkinson => DitherAlgorithm::Atkinson,
            CliAlgorithm::Jjn => DitherAlgorithm::JarvisJudiceNinke,
            CliAlgorithm::Stucki => DitherAlgorithm::Stucki,
            CliAlgorithm::Bayer => DitherAlgorithm::Bayer,
            CliAlgorithm::ClusteredDot => DitherAlgorithm::ClusteredDot,
            CliAlgorithm::Random => DitherAlgorithm::Random,
        }
    }
}

#[derive(Parser)]
pub struct Options {
    #[arg(short, long, value_enum, default_value_t = CliAlgorithm::FloydSteinberg)]
    algorithm: CliAlgorithm,

    /// "auto", "grayscale", or one of the named palettes ("game boy", "pico-8", "cga").
    #[arg(short, long, default_value_t = PaletteSource::Auto, value_parser = parse_palette)]
    palette: PaletteSource,

    /// Number of colors for the "auto" and "grayscale" palettes [default: 8].
    #[arg(short, long, value_parser = parse_palette_size)]
    k: Option<PaletteSize>,

    /// Dither strength in percent.
    #[arg(short, long, default_value_t = 100, value_parser = clap::value_parser!(u16).range(0..=100))]
    strength: u16,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Hue shift in degrees.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    hue: i16,

    /// Saturation shift in percent.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    saturation: i8,

    /// Value shift in percent.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    value: i8,

    #[arg(long, value_parser = parse_lut)]
    lut: Option<Lut>,

    #[arg(short, long, default_value_t = 0)]
    threads: u8,

    input: PathBuf,

    output: PathBuf,
}

fn parse_palette(s: &str) -> Result<PaletteSource, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_palette_size(s: &str) -> Result<PaletteSize, String> {
    let value: u16 = s.parse().map_err(|e| format!("{e}"))?;
    value.try_into().map_err(|e| format!("{e}"))
}

fn parse_lut(s: &str) -> Result<Lut, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let Options {
        algorithm,
        palette,
        k,
        strength,
        seed,
        hue,
        saturation,
        value,
        lut,
        threads,
        input,
        output,
    } = Options::parse();

    macro_rules! log {
        ($name: literal, $val: expr) => {{
            let time = std::time::Instant::now();
            let value = $val;
            info!(elapsed_ms = time.elapsed().as_secs_f64() * 1000.0, "{} done", $name);
            value
        }};
    }

    if k.is_some() && !palette.uses_palette_size() {
        warn!(%palette, "-k is ignored by fixed palettes");
    }

    let image = log!("read image", image::open(input).unwrap()).into_rgb8();

    let mut pipeline = DitherPipeline::try_from(&image).unwrap();
    pipeline
        .algorithm(algorithm.into())
        .palette_source(palette)
        .palette_size(k.unwrap_or_default())
        .strength(Strength::from_percent(strength).unwrap())
        .seed(seed);

    let dithered = log!(
        "dithering",
        match threads {
            0 => pipeline.run_par(),
            1 => pipeline.run(),
            t => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(t.into())
                    .build()
                    .unwrap();

                pool.install(|| pipeline.run_par())
            }
        }
        .unwrap()
    );

    let dithered = dithered.adjusted(HsvShift::from_sliders(hue, saturation, value));
    let dithered = match lut {
        Some(lut) => log!("color grading", dithered.graded(lut)),
        None => dithered,
    };

    log!("write image", dithered.into_rgbimage().save(output).unwrap())
}
