#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use image::{Rgb, RgbImage};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

pub fn load_images(images: &[PathBuf]) -> Vec<(String, RgbImage)> {
    images
        .iter()
        .map(|path| {
            image::open(path).map(|image| {
                (
                    path.file_name().unwrap().to_owned().into_string().unwrap(),
                    image.into_rgb8(),
                )
            })
        })
        .collect::<Result<_, _>>()
        .expect("loaded each image")
}

pub fn load_image_dir(dir: impl AsRef<Path>) -> Vec<(String, RgbImage)> {
    let mut paths = std::fs::read_dir(dir)
        .expect("read img directory")
        .collect::<Result<Vec<_>, _>>()
        .expect("read each file")
        .iter()
        .map(std::fs::DirEntry::path)
        .collect::<Vec<_>>();

    paths.sort();

    load_images(&paths)
}

/// Extra images to benchmark are read from this directory, if set.
pub const IMAGE_DIR_VAR: &str = "DITHERTONE_BENCH_IMAGES";

/// A diagonal RGB gradient, the worst case for banding.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    let span = (width + height).max(3) - 2;
    RgbImage::from_fn(width, height, |x, y| {
        let t = (x + y) * 255 / span;
        #[allow(clippy::cast_possible_truncation)]
        let pixel = Rgb([t as u8, (x * 255 / width) as u8, (255 - t) as u8]);
        pixel
    })
}

/// Uniform noise, the worst case for the automatic palette.
pub fn noise_image(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    RgbImage::from_fn(width, height, |_, _| Rgb(rng.gen()))
}

pub fn load_benchmark_images() -> Vec<(String, RgbImage)> {
    let mut images = vec![
        ("gradient_1920x1080".to_owned(), gradient_image(1920, 1080)),
        ("noise_1024x1024".to_owned(), noise_image(1024, 1024, 0)),
    ];

    if let Some(dir) = std::env::var_os(IMAGE_DIR_VAR) {
        images.extend(load_image_dir(dir));
    }

    images
}

static BENCHMARK_IMAGES: OnceLock<Vec<(String, RgbImage)>> = OnceLock::new();

pub fn benchmark_images() -> &'static [(String, RgbImage)] {
    BENCHMARK_IMAGES.get_or_init(load_benchmark_images)
}
