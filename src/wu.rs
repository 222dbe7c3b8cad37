//! Wu's color quantizer (Greedy Orthogonal Bipartitioning).
//!
//! This is the palette generator behind [`PaletteSource::Auto`](crate::PaletteSource::Auto).
//! It recursively splits the histogram box with the greatest variance
//! along the dimension and bin that results in the greatest decrease in variance.
//! The average color of each final box becomes one palette entry.
//!
//! Colors are binned with `32` bins per component (the top 5 bits of each `u8`),
//! which is a good compromise between speed and accuracy for palettes of up to `256` colors.
//! The result is fully deterministic for a given input.

// Referenced code: https://www.ece.mcmaster.ca/~xwu/cq.c
// and relevant paper (free access):
// Xiaolin Wu, Color quantization by dynamic programming and principal analysis,
// ACM Transactions on Graphics, vol. 11, no. 4, 348–372, 1992.
// https://doi.org/10.1145/146443.146475

use crate::{ColorSlice, PaletteSize};
use ordered_float::OrderedFloat;
use palette::{cast::AsArrays, Srgb};
use std::{
    array,
    collections::BinaryHeap,
    ops::{Add, AddAssign, Index, IndexMut, Sub},
};
#[cfg(feature = "threads")]
use rayon::prelude::*;

/// The number of color components.
const N: usize = 3;

/// The number of histogram bins in each dimension.
const B: usize = 32;

/// The number of bits to shift a `u8` component right by to get its bin.
const SHIFT: u32 = u8::BITS - B.ilog2();

/// Returns the histogram bin for the given color.
#[inline]
fn bin(color: [u8; N]) -> [u8; N] {
    color.map(|c| c >> SHIFT)
}

/// A hypercube over a multi-dimensional range of histogram bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cube {
    /// The lower bin indices (inclusive).
    min: [u8; N],
    /// The upper bin indices (exclusive).
    max: [u8; N],
}

impl Cube {
    /// The cube spanning the whole histogram.
    #[allow(clippy::cast_possible_truncation)]
    const FULL: Self = Self { min: [0; N], max: [B as u8; N] };

    /// Whether or not this cube contains a single bin.
    fn is_single_bin(self) -> bool {
        let Self { min, max } = self;
        (0..N).all(|c| max[c] - min[c] == 1)
    }
}

/// Statistics for a histogram bin.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Stats {
    /// The number of pixels assigned to the bin.
    count: u32,
    /// The component-wise sum of the colors assigned to the bin.
    components: [u64; N],
    /// The sum of the squared components of the colors assigned to the bin.
    sum_squared: f64,
}

impl Stats {
    /// Empty statistics.
    const ZERO: Self = Self { count: 0, components: [0; N], sum_squared: 0.0 };
}

impl Add for Stats {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            count: self.count + rhs.count,
            components: array::from_fn(|i| self.components[i] + rhs.components[i]),
            sum_squared: self.sum_squared + rhs.sum_squared,
        }
    }
}

impl Sub for Stats {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            count: self.count - rhs.count,
            components: array::from_fn(|i| self.components[i] - rhs.components[i]),
            sum_squared: self.sum_squared - rhs.sum_squared,
        }
    }
}

impl AddAssign for Stats {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.count += rhs.count;
        for i in 0..N {
            self.components[i] += rhs.components[i];
        }
        self.sum_squared += rhs.sum_squared;
    }
}

/// A `B`×`B`×`B` histogram stored as a flat `Vec` in `r`, `g`, `b` order.
#[derive(Debug, Clone)]
struct Histogram(Vec<Stats>);

impl Histogram {
    /// Creates a new histogram with all bins empty.
    fn zeroed() -> Self {
        Self(vec![Stats::ZERO; B * B * B])
    }
}

impl Index<[usize; N]> for Histogram {
    type Output = Stats;

    #[inline]
    fn index(&self, [r, g, b]: [usize; N]) -> &Self::Output {
        &self.0[(r * B + g) * B + b]
    }
}

impl IndexMut<[usize; N]> for Histogram {
    #[inline]
    fn index_mut(&mut self, [r, g, b]: [usize; N]) -> &mut Self::Output {
        &mut self.0[(r * B + g) * B + b]
    }
}

impl Index<[u8; N]> for Histogram {
    type Output = Stats;

    #[inline]
    fn index(&self, index: [u8; N]) -> &Self::Output {
        &self[index.map(usize::from)]
    }
}

impl IndexMut<[u8; N]> for Histogram {
    #[inline]
    fn index_mut(&mut self, index: [u8; N]) -> &mut Self::Output {
        &mut self[index.map(usize::from)]
    }
}

/// This macro generates code for a fixed number of recursive calls to a volume function.
macro_rules! ndvolume {
    ($self: ident, $min: ident, $max: ident, $index: ident; $n: literal $(, $ns: literal)* $(,)?) => {{
        $index[$n] = $max[$n] - 1;
        let upper = ndvolume!($self, $min, $max, $index; $($ns,)*);

        let lower = if $min[$n] == 0 {
            Stats::ZERO
        } else {
            $index[$n] = $min[$n] - 1;
            ndvolume!($self, $min, $max, $index; $($ns,)*)
        };

        upper - lower
    }};
    ($self: ident, $min: ident, $max: ident, $index: ident;) => {
        $self[$index]
    };
}

impl Histogram {
    /// Returns the sum of the histogram bins specified by the given cube.
    fn volume(&self, Cube { min, max }: Cube) -> Stats {
        let mut index = [0u8; N];
        ndvolume!(self, min, max, index; 0, 1, 2)
    }

    /// Returns the sum of the histogram bins specified by the given cube
    /// but with one of the dimensions fixed to the given bin.
    fn volume_at(&self, Cube { min, max }: Cube, dim: u8, bin: u8) -> Stats {
        if bin == 0 {
            Stats::ZERO
        } else {
            let bin = bin - 1;
            let mut index = [0u8; N];
            match dim {
                0 => {
                    index[0] = bin;
                    ndvolume!(self, min, max, index; 1, 2)
                }
                1 => {
                    index[1] = bin;
                    ndvolume!(self, min, max, index; 0, 2)
                }
                2 => {
                    index[2] = bin;
                    ndvolume!(self, min, max, index; 0, 1)
                }
                _ => unreachable!("dim < {N}"),
            }
        }
    }

    /// Adds the given color to the histogram.
    #[allow(clippy::inline_always)]
    #[inline(always)]
    fn add_color(&mut self, color: [u8; N]) {
        let Stats { count, components, sum_squared } = &mut self[bin(color)];
        *count += 1;
        for (c, v) in components.iter_mut().zip(color) {
            *c += u64::from(v);
        }
        *sum_squared += sum_of_squares(color.map(u64::from));
    }

    /// Adds the given colors to the histogram.
    fn add_colors(&mut self, colors: &[[u8; N]]) {
        for &color in colors {
            self.add_color(color);
        }
    }

    /// Element-wise sums the bins of `other` into `self`.
    #[cfg(feature = "threads")]
    #[allow(clippy::needless_pass_by_value)]
    fn merge(mut self, other: Self) -> Self {
        for (a, &b) in self.0.iter_mut().zip(&other.0) {
            *a += b;
        }
        self
    }

    /// Creates moments from the histogram bins to allow inclusion-excluison lookups/calculations.
    fn calc_cumulative_moments(&mut self) {
        for r in 0..B {
            let mut area = [Stats::ZERO; B];

            for g in 0..B {
                let mut line = Stats::ZERO;

                for b in 0..B {
                    line += self[[r, g, b]];
                    area[b] += line;

                    if r == 0 {
                        self[[r, g, b]] = area[b];
                    } else {
                        self[[r, g, b]] = self[[r - 1, g, b]] + area[b];
                    }
                }
            }
        }
    }
}

/// Returns the sum of the squares of the given components.
#[inline]
#[allow(clippy::cast_precision_loss)]
fn sum_of_squares(components: [u64; N]) -> f64 {
    let mut square = 0.0;
    for c in components {
        let c = c as f64;
        square += c * c;
    }
    square
}

/// The data for Wu's color quantization method over cumulative moments.
struct Wu {
    /// The histogram moments.
    hist: Histogram,
}

impl Wu {
    /// Creates a new [`Wu`] with histogram data filled by the given colors.
    fn new(colors: &[Srgb<u8>]) -> Self {
        let mut hist = Histogram::zeroed();
        hist.add_colors(colors.as_arrays());
        hist.calc_cumulative_moments();
        Self { hist }
    }

    /// Creates a new [`Wu`] in parallel with histogram data filled by the given colors.
    #[cfg(feature = "threads")]
    fn new_par(colors: &[Srgb<u8>]) -> Self {
        let chunk_size = colors.len().div_ceil(rayon::current_num_threads()).max(1);
        let mut hist = colors
            .as_arrays()
            .par_chunks(chunk_size)
            .map(|colors| {
                let mut hist = Histogram::zeroed();
                hist.add_colors(colors);
                hist
            })
            .reduce_with(Histogram::merge)
            .unwrap_or_else(Histogram::zeroed);

        hist.calc_cumulative_moments();
        Self { hist }
    }

    /// Computes the variance of the given cube.
    fn variance(&self, cube: Cube) -> f64 {
        if cube.is_single_bin() {
            0.0
        } else {
            let Stats { count, components, sum_squared } = self.hist.volume(cube);
            sum_squared - sum_of_squares(components) / f64::from(count)
        }
    }

    /// Finds the index of the bin to cut along for the given dimension in order to minimize variance.
    fn minimize(&self, cube: Cube, dim: u8, sum: Stats) -> Option<(u8, f64)> {
        let d = usize::from(dim);
        let bottom = cube.min[d];
        let top = cube.max[d];

        let base = self.hist.volume_at(cube, dim, bottom);

        ((bottom + 1)..top)
            .filter_map(|bin| {
                let upper = self.hist.volume_at(cube, dim, bin) - base;
                let lower = sum - upper;
                if upper.count == 0 || lower.count == 0 {
                    None
                } else {
                    let upper2 = sum_of_squares(upper.components) / f64::from(upper.count);
                    let lower2 = sum_of_squares(lower.components) / f64::from(lower.count);
                    Some((bin, -(upper2 + lower2)))
                }
            })
            .min_by_key(|&(_, v)| OrderedFloat(v))
    }

    /// Attempts to cut the given cube to give a lower variance.
    fn cut(&self, cube: &mut Cube) -> Option<Cube> {
        let sum = self.hist.volume(*cube);

        #[allow(clippy::cast_possible_truncation)]
        let cut = (0..(N as u8))
            .filter_map(|c| {
                self.minimize(*cube, c, sum)
                    .map(|(x, v)| ((usize::from(c), x), v))
            })
            .min_by_key(|&(_, v)| OrderedFloat(v));

        if let Some(((i, cut), _)) = cut {
            let mut new_cube = *cube;
            cube.max[i] = cut;
            new_cube.min[i] = cut;
            Some(new_cube)
        } else {
            None
        }
    }

    /// Returns the disjoint, non-empty cubes resulting from Wu's color quantization method.
    fn cubes(&self, k: PaletteSize) -> impl Iterator<Item = Cube> {
        /// A cube and its variance.
        struct CubeVar(Cube, f64);

        impl PartialOrd for CubeVar {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for CubeVar {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                OrderedFloat(self.1).cmp(&OrderedFloat(other.1))
            }
        }

        impl Eq for CubeVar {}

        impl PartialEq for CubeVar {
            fn eq(&self, other: &Self) -> bool {
                self.1 == other.1
            }
        }

        let k = usize::from(k);

        let mut queue = BinaryHeap::with_capacity(k);
        queue.push(CubeVar(Cube::FULL, f64::INFINITY));

        while queue.len() < k {
            // at least one cube is added back for each popped
            #[allow(clippy::expect_used)]
            let CubeVar(mut cube1, variance) = queue.pop().expect("at least one cube");

            if variance <= 0.0 {
                // no cube can be cut further
                queue.push(CubeVar(cube1, 0.0));
                break;
            }

            if let Some(cube2) = self.cut(&mut cube1) {
                queue.push(CubeVar(cube1, self.variance(cube1)));
                queue.push(CubeVar(cube2, self.variance(cube2)));
            } else {
                queue.push(CubeVar(cube1, 0.0));
            }
        }

        queue.into_iter().map(|x| x.0)
    }

    /// Returns the average color of the given cube.
    #[allow(clippy::cast_possible_truncation)]
    fn cube_color(&self, cube: Cube) -> Srgb<u8> {
        let Stats { count, components, .. } = self.hist.volume(cube);
        debug_assert!(count > 0);
        let n = u64::from(count);
        let [r, g, b] = components.map(|c| (c / n) as u8);
        Srgb::new(r, g, b)
    }

    /// Computes the color palette.
    fn palette(&self, k: PaletteSize) -> Vec<Srgb<u8>> {
        self.cubes(k).map(|cube| self.cube_color(cube)).collect()
    }
}

/// Computes a color palette from the given colors with at most `palette_size` entries.
///
/// Fewer than `palette_size` colors are returned if the colors fall into
/// fewer distinct histogram bins. An empty input gives an empty palette.
#[must_use]
pub fn palette(colors: ColorSlice<Srgb<u8>>, palette_size: PaletteSize) -> Vec<Srgb<u8>> {
    if colors.is_empty() {
        Vec::new()
    } else {
        Wu::new(colors.as_slice()).palette(palette_size)
    }
}

/// Computes a color palette in parallel from the given colors with at most `palette_size` entries.
///
/// The result is identical to [`palette`].
#[cfg(feature = "threads")]
#[must_use]
pub fn palette_par(colors: ColorSlice<Srgb<u8>>, palette_size: PaletteSize) -> Vec<Srgb<u8>> {
    if colors.is_empty() {
        Vec::new()
    } else {
        Wu::new_par(colors.as_slice()).palette(palette_size)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::*;

    fn size(k: u16) -> PaletteSize {
        PaletteSize::try_from(k).unwrap()
    }

    fn sorted(mut colors: Vec<Srgb<u8>>) -> Vec<Srgb<u8>> {
        colors.sort_by_key(|srgb| srgb.into_components());
        colors
    }

    /// 64 colors which all land in different histogram bins.
    #[allow(clippy::cast_possible_truncation)]
    fn spread_colors() -> Vec<Srgb<u8>> {
        (0..64u32)
            .map(|i| {
                let c = |x: u32| (x * 64 + 17) as u8;
                Srgb::new(c(i % 4), c(i / 4 % 4), c(i / 16))
            })
            .collect()
    }

    #[test]
    fn empty_input() {
        let colors = ColorSlice::<Srgb<u8>>::new_unchecked(&[]);
        assert!(palette(colors, PaletteSize::MAX).is_empty());

        #[cfg(feature = "threads")]
        assert!(palette_par(colors, PaletteSize::MAX).is_empty());
    }

    #[test]
    fn not_enough_colors() {
        let colors = spread_colors();
        let colors = ColorSlice::try_from(colors.as_slice()).unwrap();

        let result = palette(colors, PaletteSize::MAX);
        assert_eq!(result.len(), 64);
    }

    #[test]
    fn exact_match_image_unaffected() {
        let expected = sorted(spread_colors());

        let mut colors = [expected.as_slice(); 4].concat();
        colors.rotate_right(7);
        let colors = ColorSlice::try_from(colors.as_slice()).unwrap();

        let actual = sorted(palette(colors, PaletteSize::MAX));
        assert_eq!(actual, expected);

        #[cfg(feature = "threads")]
        {
            let actual = sorted(palette_par(colors, PaletteSize::MAX));
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn at_most_k_colors() {
        let colors = test_data_1024();
        let colors = ColorSlice::try_from(colors.as_slice()).unwrap();

        for k in [1, 2, 7, 16, 64] {
            assert_eq!(palette(colors, size(k)).len(), usize::from(k));
        }

        let single = vec![Srgb::new(90, 20, 200); 50];
        let single = ColorSlice::try_from(single.as_slice()).unwrap();
        assert_eq!(palette(single, size(8)), vec![Srgb::new(90, 20, 200)]);
    }

    #[test]
    fn single_color_is_mean() {
        let colors = vec![Srgb::new(0, 0, 0), Srgb::new(100, 50, 255)];
        let colors = ColorSlice::try_from(colors.as_slice()).unwrap();
        assert_eq!(palette(colors, size(1)), vec![Srgb::new(50, 25, 127)]);
    }

    #[test]
    #[cfg(feature = "threads")]
    fn single_and_multi_threaded_match() {
        let colors = test_data_1024();
        let colors = ColorSlice::try_from(colors.as_slice()).unwrap();

        let wu_single = Wu::new(&colors);
        let wu_par = Wu::new_par(&colors);
        assert_eq!(wu_single.hist.0, wu_par.hist.0);

        for k in [2, 16, 256] {
            assert_eq!(palette(colors, size(k)), palette_par(colors, size(k)));
        }
    }
}
