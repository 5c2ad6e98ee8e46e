//! Fault-formation heightmap synthesis.
//!
//! Every iteration cuts the grid with a random line and raises the cells on
//! one side of it. The amount raised shrinks linearly with the iteration
//! index, so early faults carve the large features and late faults add
//! detail. A FIR smoothing pass softens the fault edges, and a final min-max
//! normalization maps the result into the configured height range.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::config::{FaultFormationConfig, SmoothingSchedule};
use super::error::TerrainError;
use super::heightmap::Heightmap;
use crate::erosion::apply_fir_filter;

/// Draws allowed when looking for a second fault point distinct from the first.
pub const MAX_POINT_ATTEMPTS: u32 = 1000;

/// An integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainPoint {
    pub x: i32,
    pub z: i32,
}

impl TerrainPoint {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    fn random<R: Rng>(rng: &mut R, size: u32) -> Self {
        Self {
            x: rng.random_range(0..size) as i32,
            z: rng.random_range(0..size) as i32,
        }
    }
}

/// A directed cutting line through two distinct grid points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultLine {
    pub origin: TerrainPoint,
    pub dir_x: i64,
    pub dir_z: i64,
}

impl FaultLine {
    pub fn through(p1: TerrainPoint, p2: TerrainPoint) -> Self {
        Self {
            origin: p1,
            dir_x: (p2.x - p1.x) as i64,
            dir_z: (p2.z - p1.z) as i64,
        }
    }

    /// True if `(x, z)` lies strictly on the raised side of the line.
    #[inline]
    pub fn raises(&self, x: u32, z: u32) -> bool {
        let in_x = x as i64 - self.origin.x as i64;
        let in_z = z as i64 - self.origin.z as i64;
        in_x * self.dir_z - self.dir_x * in_z > 0
    }
}

/// Picks two distinct random points in `[0, size) x [0, size)`.
///
/// The second point is redrawn until it differs from the first, giving up
/// after [`MAX_POINT_ATTEMPTS`] draws.
pub fn gen_random_terrain_points<R: Rng>(
    rng: &mut R,
    size: u32,
) -> Result<(TerrainPoint, TerrainPoint), TerrainError> {
    if size == 0 {
        return Err(TerrainError::SizeTooSmall(size));
    }

    let p1 = TerrainPoint::random(rng, size);

    for _ in 0..MAX_POINT_ATTEMPTS {
        let p2 = TerrainPoint::random(rng, size);
        if p2 != p1 {
            return Ok((p1, p2));
        }
    }

    Err(TerrainError::FaultLineExhausted(MAX_POINT_ATTEMPTS))
}

/// Raises every cell of row `z` that lies on the raised side of `fault`.
fn raise_row(row: &mut [f32], z: u32, fault: &FaultLine, height: f32) {
    for (x, cell) in row.iter_mut().enumerate() {
        if fault.raises(x as u32, z) {
            *cell += height;
        }
    }
}

/// Runs the fault iterations on `heightmap` without normalizing.
///
/// The heightmap must have the configured size. It is not cleared first, so
/// faults accumulate on top of existing heights.
pub fn accumulate_faults<R: Rng>(
    heightmap: &mut Heightmap,
    config: &FaultFormationConfig,
    rng: &mut R,
) -> Result<(), TerrainError> {
    config.validate()?;
    if heightmap.size() != config.size {
        return Err(TerrainError::SizeMismatch {
            expected: config.size,
            actual: heightmap.size(),
        });
    }

    let size = config.size;

    for iteration in 0..config.iterations {
        let height = config.iteration_height(iteration);
        let (p1, p2) = gen_random_terrain_points(rng, size)?;
        let fault = FaultLine::through(p1, p2);

        log::debug!("Iteration {} height {}", iteration, height);
        log::trace!("Fault points: {:?} -> {:?}", p1, p2);

        apply_fault(heightmap, &fault, height, config.filter, config.schedule);
    }

    Ok(())
}

/// Raises one side of `fault` by `height` and smooths according to `schedule`.
fn apply_fault(
    heightmap: &mut Heightmap,
    fault: &FaultLine,
    height: f32,
    filter: f32,
    schedule: SmoothingSchedule,
) {
    let size = heightmap.size();

    match schedule {
        SmoothingSchedule::PerIteration => {
            heightmap
                .heights_mut()
                .par_chunks_mut(size as usize)
                .enumerate()
                .for_each(|(z, row)| raise_row(row, z as u32, fault, height));
            apply_fir_filter(heightmap, filter);
        }
        SmoothingSchedule::PerRow => {
            for z in 0..size {
                let start = (z as usize) * (size as usize);
                let row = &mut heightmap.heights_mut()[start..start + size as usize];
                raise_row(row, z, fault, height);
                apply_fir_filter(heightmap, filter);
            }
        }
    }
}

/// Generates a normalized fault-formation heightmap using `rng`.
///
/// `config.seed` is ignored; the caller controls randomness through `rng`.
pub fn create_fault_formation<R: Rng>(
    config: &FaultFormationConfig,
    rng: &mut R,
) -> Result<Heightmap, TerrainError> {
    config.validate()?;

    let mut heightmap = Heightmap::new(config.size);
    accumulate_faults(&mut heightmap, config, rng)?;
    heightmap.normalize(config.min_height, config.max_height);

    Ok(heightmap)
}

/// Generates a normalized fault-formation heightmap seeded from `config.seed`.
///
/// Identical configurations always produce identical heightmaps.
pub fn create_fault_formation_seeded(config: &FaultFormationConfig) -> Result<Heightmap, TerrainError> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    create_fault_formation(config, &mut rng)
}
