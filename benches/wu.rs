#[path = "../util/util.rs"]
mod util;

use util::benchmark_images;

use std::time::Duration;

use criterion::{
    criterion_group, criterion_main, measurement::WallTime, Bencher, BenchmarkId, Criterion,
    SamplingMode,
};
use dithertone::{wu, ColorSlice, PaletteSize};
use image::RgbImage;

fn bench(
    c: &mut Criterion,
    group: &str,
    images: &[(String, RgbImage)],
    mut f: impl FnMut(&mut Bencher<WallTime>, &(PaletteSize, &RgbImage)),
) {
    let mut group = c.benchmark_group(group);
    group
        .sample_size(30)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_millis(500));

    for (k, secs) in [
        (PaletteSize::from_clamped(16), 2),
        (PaletteSize::from_clamped(64), 3),
        (PaletteSize::MAX, 4),
    ] {
        group.measurement_time(Duration::from_secs(secs));
        for (path, image) in images {
            group.bench_with_input(BenchmarkId::new(k.to_string(), path), &(k, image), &mut f);
        }
    }
}

fn wu_palette_single(c: &mut Criterion) {
    bench(c, "wu_palette_single", benchmark_images(), |b, &(k, image)| {
        let colors = ColorSlice::try_from(image).unwrap();
        b.iter(|| wu::palette(colors, k))
    })
}

fn wu_palette_par(c: &mut Criterion) {
    bench(c, "wu_palette_par", benchmark_images(), |b, &(k, image)| {
        let colors = ColorSlice::try_from(image).unwrap();
        b.iter(|| wu::palette_par(colors, k))
    })
}

criterion_group!(benches, wu_palette_single, wu_palette_par);
criterion_main!(benches);
