//! Four-directional FIR smoothing ("erosion") filter.
//!
//! Each sweep runs a one-pole exponential filter along every row or column:
//! `new = filter * prev + (1 - filter) * current`, where `prev` is the value
//! just written. The four sweeps run one after another, each seeing the
//! output of the previous one.

use rayon::prelude::*;

use crate::terrain::Heightmap;

/// Applies the smoothing recurrence to `count` cells starting at `start`,
/// stepping by `stride`. The first cell is left untouched.
fn filter_band(heights: &mut [f32], start: usize, stride: isize, count: usize, filter: f32) {
    let mut prev = heights[start];
    let mut index = start as isize;

    for _ in 1..count {
        index += stride;
        let i = index as usize;
        let value = filter * prev + (1.0 - filter) * heights[i];
        heights[i] = value;
        prev = value;
    }
}

/// Smooths the heightmap in place: left to right, right to left, top to
/// bottom, then bottom to top.
///
/// `filter == 0.0` leaves every cell unchanged. Values close to 1.0 drag
/// each cell towards its predecessor and flatten the terrain.
pub fn apply_fir_filter(heightmap: &mut Heightmap, filter: f32) {
    let size = heightmap.size() as usize;
    if size == 0 {
        return;
    }
    let heights = heightmap.heights_mut();
    let row_stride = size as isize;

    // Rows are contiguous and independent.
    heights.par_chunks_mut(size).for_each(|row| {
        filter_band(row, 0, 1, size, filter);
        filter_band(row, size - 1, -1, size, filter);
    });

    for x in 0..size {
        filter_band(heights, x, row_stride, size, filter);
    }

    let last_row = (size - 1) * size;
    for x in 0..size {
        filter_band(heights, last_row + x, -row_stride, size, filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn noisy_heightmap(size: u32, seed: u64) -> Heightmap {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Heightmap::from_fn(size, |_, _| rng.random_range(-10.0f32..10.0))
    }

    fn variance(heightmap: &Heightmap) -> f64 {
        let n = heightmap.cell_count() as f64;
        let mean = heightmap.heights().iter().map(|&h| h as f64).sum::<f64>() / n;
        heightmap
            .heights()
            .iter()
            .map(|&h| (h as f64 - mean).powi(2))
            .sum::<f64>()
            / n
    }

    #[test]
    fn test_zero_filter_is_identity() {
        let original = noisy_heightmap(17, 3);
        let mut filtered = original.clone();

        apply_fir_filter(&mut filtered, 0.0);

        assert_eq!(filtered, original);
    }

    #[test]
    fn test_filter_creates_no_new_extrema() {
        let mut heightmap = noisy_heightmap(33, 11);
        let (min, max) = heightmap.height_range();

        apply_fir_filter(&mut heightmap, 0.7);

        let (new_min, new_max) = heightmap.height_range();
        assert!(new_min >= min - 1e-4, "{} < {}", new_min, min);
        assert!(new_max <= max + 1e-4, "{} > {}", new_max, max);
    }

    #[test]
    fn test_repeated_filtering_keeps_smoothing() {
        let mut once = noisy_heightmap(32, 5);
        apply_fir_filter(&mut once, 0.5);

        let mut twice = once.clone();
        apply_fir_filter(&mut twice, 0.5);

        assert!(variance(&twice) < variance(&once));
    }

    #[test]
    fn test_constant_grid_unchanged() {
        let mut heightmap = Heightmap::new(8);
        heightmap.fill(4.25);

        apply_fir_filter(&mut heightmap, 0.9);

        assert!(heightmap.heights().iter().all(|&h| (h - 4.25).abs() < 1e-6));
    }

    #[test]
    fn test_single_row_sweep_values() {
        // Only the middle cell of row 0 is raised.
        let mut heightmap = Heightmap::new(3);
        heightmap.set(1, 0, 1.0);

        apply_fir_filter(&mut heightmap, 0.5);

        // Left to right on row 0: [0, 0.5, 0.25]
        // Right to left on row 0: [0.1875, 0.375, 0.25]
        // Column 1 top to bottom: [0.375, 0.1875, 0.09375]
        // Column 1 bottom to top: [0.2578125, 0.140625, 0.09375]
        assert_eq!(heightmap.get(1, 0), 0.2578125);
        assert_eq!(heightmap.get(1, 1), 0.140625);
        assert_eq!(heightmap.get(1, 2), 0.09375);
        assert!(heightmap.get(0, 0) > 0.0);
    }

    #[test]
    fn test_tiny_grid() {
        let mut heightmap = Heightmap::new(1);
        heightmap.set(0, 0, 2.0);
        apply_fir_filter(&mut heightmap, 0.5);
        assert_eq!(heightmap.get(0, 0), 2.0);
    }
}
