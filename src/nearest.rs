//! Contains the nearest palette color search.

use crate::Palette;
use palette::{cast::AsArrays, Srgb};
use std::array;
use wide::{f64x4, CmpLt};

/// The number of palette colors compared at once.
const LANES: usize = 4;

/// Squared euclidean distance between two points.
#[inline]
pub(crate) fn squared_euclidean_distance<const N: usize>(x: [f64; N], y: [f64; N]) -> f64 {
    let mut dist = 0.0;
    for c in 0..N {
        let d = x[c] - y[c];
        dist += d * d;
    }
    dist
}

/// Returns the palette color closest to `pixel` by squared euclidean distance in RGB space.
///
/// `pixel` may lie outside of the `0.0..=255.0` range, as happens after error has been
/// accumulated onto it. If multiple palette colors are equally close,
/// the first one in palette order is returned.
///
/// This is the straightforward linear scan. The dithering algorithms use the equivalent,
/// but faster, [`NearestColor`] instead.
///
/// # Examples
/// ```
/// # use dithertone::{closest, Palette, DitherError};
/// # use palette::Srgb;
/// # fn main() -> Result<(), DitherError> {
/// let palette = Palette::try_from(vec![Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)])?;
/// assert_eq!(closest([300.0, 180.0, 140.0], &palette), Srgb::new(255, 255, 255));
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn closest(pixel: [f64; 3], palette: &Palette) -> Srgb<u8> {
    let mut best = palette[0];
    let mut min_distance = f64::INFINITY;
    let colors = palette.as_slice();
    for (&color, components) in colors.iter().zip(colors.as_arrays()) {
        let distance = squared_euclidean_distance(pixel, components.map(f64::from));
        if distance < min_distance {
            min_distance = distance;
            best = color;
        }
    }
    best
}

/// Provides nearest palette color lookups over 4 palette colors at a time.
///
/// The palette is stored transposed in chunks of 4 colors so that the distances to a chunk
/// can be computed with a single set of SIMD operations.
/// The remainder of the last chunk is padded with infinitely far away colors.
///
/// Distances are computed in `f64`, in the same order as [`closest`],
/// so lookups give exactly the same result: ties are broken in favor of the palette color
/// with the lowest index.
#[derive(Debug, Clone)]
pub struct NearestColor {
    /// The palette colors as arrays of `f64`.
    palette: Vec<[f64; 3]>,
    /// The palette colors transposed into chunks of 4.
    chunks: Vec<[f64x4; 3]>,
}

impl NearestColor {
    /// Creates a new [`NearestColor`] for the given palette.
    #[must_use]
    pub fn new(palette: &Palette) -> Self {
        let palette = palette
            .as_slice()
            .as_arrays()
            .iter()
            .map(|c| c.map(f64::from))
            .collect::<Vec<_>>();

        let chunks = palette
            .chunks(LANES)
            .map(|chunk| {
                let mut components = [[f64::INFINITY; LANES]; 3];
                for (i, color) in chunk.iter().enumerate() {
                    for (d, &s) in components.iter_mut().zip(color) {
                        d[i] = s;
                    }
                }
                components.map(f64x4::new)
            })
            .collect();

        Self { palette, chunks }
    }

    /// Returns the palette color at `index` as floating point components.
    #[inline]
    #[must_use]
    pub fn color(&self, index: u8) -> [f64; 3] {
        self.palette[usize::from(index)]
    }

    /// Returns the index of the palette color nearest to `point`.
    #[allow(clippy::inline_always, clippy::float_cmp)]
    #[inline(always)]
    #[must_use]
    pub fn nearest(&self, point: [f64; 3]) -> u8 {
        let p = point.map(f64x4::splat);

        let incr = f64x4::splat(1.0);
        let mut cur_chunk = f64x4::splat(0.0);
        let mut min_chunk = cur_chunk;
        let mut min_distance = f64x4::splat(f64::INFINITY);

        for chunk in &self.chunks {
            #[allow(clippy::expect_used)]
            let distance = array::from_fn::<_, 3, _>(|i| {
                let diff = p[i] - chunk[i];
                diff * diff
            })
            .into_iter()
            .reduce(|a, b| a + b)
            .expect("N != 0");

            // strictly less, so earlier chunks win ties within a lane
            let mask = distance.cmp_lt(min_distance);
            min_chunk = mask.blend(cur_chunk, min_chunk);
            min_distance = mask.blend(distance, min_distance);
            cur_chunk += incr;
        }

        let mut min_index = 0;
        let mut min_dist = f64::INFINITY;
        for (lane, (dist, chunk)) in min_distance
            .to_array()
            .into_iter()
            .zip(min_chunk.to_array())
            .enumerate()
        {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let index = chunk as usize * LANES + lane;
            if dist < min_dist || (dist == min_dist && index < min_index) {
                min_dist = dist;
                min_index = index;
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        let min_index = min_index as u8;
        min_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[allow(clippy::unwrap_used)]
    fn make_palette(colors: Vec<Srgb<u8>>) -> Palette {
        Palette::try_from(colors).unwrap()
    }

    #[test]
    fn naive_nearest_neighbor_oracle() {
        let k = 249; // use non-multiple of 4 to test remainder handling
        let palette = make_palette(test_data_256()[..k].to_vec());
        let table = NearestColor::new(&palette);
        let points = test_data_1024();

        for color in points.as_slice().as_arrays() {
            let point = color.map(f64::from);
            let expected = closest(point, &palette);
            let actual = palette[usize::from(table.nearest(point))];
            assert_eq!(expected, actual);
        }
    }

    #[test]
    fn out_of_range_points() {
        let palette = make_palette(vec![
            Srgb::new(0, 0, 0),
            Srgb::new(255, 0, 0),
            Srgb::new(255, 255, 255),
        ]);
        let table = NearestColor::new(&palette);

        assert_eq!(table.nearest([-80.0, -3.0, -500.0]), 0);
        assert_eq!(table.nearest([400.0, -40.0, 10.0]), 1);
        assert_eq!(table.nearest([310.0, 290.0, 275.0]), 2);
    }

    #[test]
    fn ties_go_to_first_entry() {
        // 127.5 is equally far from 0 and 255
        let palette = make_palette(vec![Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)]);
        let table = NearestColor::new(&palette);
        assert_eq!(table.nearest([127.5; 3]), 0);
        assert_eq!(closest([127.5; 3], &palette), Srgb::new(0, 0, 0));

        // duplicate entries across chunk boundaries
        let mut colors = vec![Srgb::new(10, 10, 10); 20];
        colors[3] = Srgb::new(200, 200, 200);
        colors[11] = Srgb::new(200, 200, 200);
        colors[19] = Srgb::new(200, 200, 200);
        let table = NearestColor::new(&make_palette(colors));
        assert_eq!(table.nearest([190.0; 3]), 3);
        assert_eq!(table.nearest([0.0; 3]), 0);
    }

    #[test]
    fn tiny_differences_are_kept() {
        let palette = make_palette(vec![Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)]);
        let table = NearestColor::new(&palette);
        let point = [127.5 + 1e-9; 3];
        assert_eq!(table.nearest(point), 1);
        assert_eq!(closest(point, &palette), Srgb::new(255, 255, 255));
    }

    #[test]
    fn single_color_always_matches() {
        let palette = make_palette(vec![Srgb::new(12, 34, 56)]);
        let table = NearestColor::new(&palette);
        let points = test_data_256();
        for color in points.as_slice().as_arrays() {
            assert_eq!(table.nearest(color.map(f64::from)), 0);
        }
        assert_eq!(table.nearest([1e4, -1e4, 0.0]), 0);
    }
}
