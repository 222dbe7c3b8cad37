#[path = "../util/util.rs"]
mod util;

use util::benchmark_images;

use std::time::Duration;

use criterion::{
    criterion_group, criterion_main, measurement::WallTime, Bencher, BenchmarkId, Criterion,
    SamplingMode,
};
use dithertone::{
    build_palette, dither, ColorSlice, DitherAlgorithm, Palette, PaletteSize, PaletteSource,
    Strength,
};
use image::RgbImage;

fn bench(
    c: &mut Criterion,
    group: &str,
    mut f: impl FnMut(&mut Bencher<WallTime>, &(DitherAlgorithm, &RgbImage, &Palette)),
) {
    let mut group = c.benchmark_group(group);
    group
        .sample_size(20)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_secs(2));

    let palettes = benchmark_images()
        .iter()
        .map(|(path, image)| {
            let colors = ColorSlice::try_from(image).unwrap();
            let palette =
                build_palette(colors, &PaletteSource::Auto, PaletteSize::from_clamped(16)).unwrap();
            (path, image, palette)
        })
        .collect::<Vec<_>>();

    for algorithm in DitherAlgorithm::ALL {
        for (path, image, palette) in &palettes {
            group.bench_with_input(
                BenchmarkId::new(algorithm.to_string(), path),
                &(algorithm, *image, palette),
                &mut f,
            );
        }
    }
}

fn dither_single(c: &mut Criterion) {
    let strength = Strength::from_percent(80).unwrap();
    bench(c, "dither_single", |b, &(algorithm, image, palette)| {
        let colors = ColorSlice::try_from(image).unwrap();
        let width = image.width() as usize;
        b.iter(|| dither::dither(&colors, width, palette, algorithm, strength, 0))
    })
}

fn dither_par(c: &mut Criterion) {
    let strength = Strength::from_percent(80).unwrap();
    bench(c, "dither_par", |b, &(algorithm, image, palette)| {
        let colors = ColorSlice::try_from(image).unwrap();
        let width = image.width() as usize;
        b.iter(|| dither::dither_par(&colors, width, palette, algorithm, strength, 0))
    })
}

criterion_group!(benches, dither_single, dither_par);
criterion_main!(benches);
