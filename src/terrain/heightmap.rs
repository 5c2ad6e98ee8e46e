//! Square heightmap grid.

/// A square grid of terrain elevations addressed by `(x, z)`.
///
/// Heights are stored in row-major order, one row per `z`. The size is fixed
/// at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    size: u32,
    heights: Vec<f32>,
}

impl Heightmap {
    /// Creates a new `size` x `size` heightmap with every cell at 0.0.
    pub fn new(size: u32) -> Self {
        let count = (size as usize) * (size as usize);
        Self {
            size,
            heights: vec![0.0; count],
        }
    }

    /// Creates a heightmap whose cells are produced by `f(x, z)`.
    pub fn from_fn(size: u32, mut f: impl FnMut(u32, u32) -> f32) -> Self {
        let mut heightmap = Self::new(size);
        for z in 0..size {
            for x in 0..size {
                heightmap.set(x, z, f(x, z));
            }
        }
        heightmap
    }

    /// Wraps existing row-major heights.
    ///
    /// Returns `None` if `heights.len()` is not `size * size`.
    pub fn from_heights(size: u32, heights: Vec<f32>) -> Option<Self> {
        if heights.len() != (size as usize) * (size as usize) {
            return None;
        }
        Some(Self { size, heights })
    }

    /// Width and depth of the grid.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.heights.len()
    }

    /// Row-major view of all heights.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Mutable row-major view of all heights.
    pub fn heights_mut(&mut self) -> &mut [f32] {
        &mut self.heights
    }

    #[inline]
    fn index(&self, x: u32, z: u32) -> usize {
        debug_assert!(x < self.size && z < self.size);
        (z as usize) * (self.size as usize) + x as usize
    }

    /// Returns the height at `(x, z)`.
    ///
    /// # Panics
    /// Panics if `x` or `z` is out of bounds.
    pub fn get(&self, x: u32, z: u32) -> f32 {
        self.heights[self.index(x, z)]
    }

    /// Sets the height at `(x, z)`.
    ///
    /// # Panics
    /// Panics if `x` or `z` is out of bounds.
    pub fn set(&mut self, x: u32, z: u32, height: f32) {
        let i = self.index(x, z);
        self.heights[i] = height;
    }

    /// Adds `delta` to the height at `(x, z)`.
    pub fn add(&mut self, x: u32, z: u32, delta: f32) {
        let i = self.index(x, z);
        self.heights[i] += delta;
    }

    /// Sets every cell to `height`.
    pub fn fill(&mut self, height: f32) {
        self.heights.fill(height);
    }

    /// Returns the (min, max) height over all cells.
    pub fn height_range(&self) -> (f32, f32) {
        let mut min = f32::MAX;
        let mut max = f32::MIN;

        for &height in &self.heights {
            min = min.min(height);
            max = max.max(height);
        }

        (min, max)
    }

    /// Linearly rescales all heights so the observed minimum becomes
    /// `min_height` and the observed maximum becomes `max_height`.
    ///
    /// A flat grid has no range to stretch and is set to `min_height`.
    pub fn normalize(&mut self, min_height: f32, max_height: f32) {
        let (lo, hi) = self.height_range();
        let span = hi - lo;

        if !(span > 0.0) {
            self.fill(min_height);
            return;
        }

        for height in &mut self.heights {
            let t = (*height - lo) / span;
            // Lerp form keeps both endpoints exact.
            let value = min_height * (1.0 - t) + max_height * t;
            *height = value.clamp(min_height, max_height);
        }
    }

    /// Returns an iterator over all `(x, z)` coordinates in storage order.
    pub fn pixel_coords(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let size = self.size;
        (0..size).flat_map(move |z| (0..size).map(move |x| (x, z)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heightmap_creation() {
        let heightmap = Heightmap::new(128);
        assert_eq!(heightmap.size(), 128);
        assert_eq!(heightmap.cell_count(), 128 * 128);
        assert!(heightmap.heights().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_get_set_height() {
        let mut heightmap = Heightmap::new(64);
        heightmap.set(10, 20, 0.5);
        assert_eq!(heightmap.get(10, 20), 0.5);
        assert_eq!(heightmap.heights()[20 * 64 + 10], 0.5);

        heightmap.add(10, 20, 1.0);
        assert_eq!(heightmap.get(10, 20), 1.5);
    }

    #[test]
    fn test_from_heights_rejects_wrong_length() {
        assert!(Heightmap::from_heights(4, vec![0.0; 15]).is_none());
        assert!(Heightmap::from_heights(4, vec![0.0; 16]).is_some());
    }

    #[test]
    fn test_height_range() {
        let mut heightmap = Heightmap::new(32);
        heightmap.set(0, 0, -0.5);
        heightmap.set(31, 31, 1.5);

        let (min, max) = heightmap.height_range();
        assert_eq!(min, -0.5);
        assert_eq!(max, 1.5);
    }

    #[test]
    fn test_normalize_hits_both_bounds() {
        let mut heightmap = Heightmap::from_fn(8, |x, z| (x * 3 + z) as f32 * 0.37 - 2.0);
        heightmap.normalize(-12.5, 40.0);

        let (min, max) = heightmap.height_range();
        assert_eq!(min, -12.5);
        assert_eq!(max, 40.0);
        assert!(heightmap
            .heights()
            .iter()
            .all(|&h| (-12.5..=40.0).contains(&h)));
    }

    #[test]
    fn test_normalize_preserves_order() {
        let mut heightmap = Heightmap::from_fn(4, |x, z| (z * 4 + x) as f32);
        heightmap.normalize(0.0, 1.0);

        let heights = heightmap.heights();
        assert!(heights.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_normalize_flat_grid() {
        let mut heightmap = Heightmap::new(16);
        heightmap.fill(7.0);
        heightmap.normalize(2.0, 5.0);
        assert!(heightmap.heights().iter().all(|&h| h == 2.0));
    }

    #[test]
    fn test_pixel_coords_iterator() {
        let heightmap = Heightmap::new(4);
        let coords: Vec<_> = heightmap.pixel_coords().collect();

        assert_eq!(coords.len(), 16);
        assert_eq!(coords[0], (0, 0));
        assert_eq!(coords[1], (1, 0));
        assert_eq!(coords[4], (0, 1));
        assert_eq!(coords[15], (3, 3));
    }
}
