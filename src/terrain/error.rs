//! Errors raised while generating terrain.

use thiserror::Error;

/// Configuration and invariant failures of the fault-formation generator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerrainError {
    #[error("Invalid height range: min ({0}) must be less than max ({1})")]
    InvalidHeightRange(f32, f32),
    #[error("Terrain size must be at least 2, got {0}")]
    SizeTooSmall(u32),
    #[error("Iteration count must be greater than zero")]
    NoIterations,
    #[error("Filter coefficient must be in [0, 1), got {0}")]
    InvalidFilter(f32),
    #[error("Heightmap size {actual} does not match configured size {expected}")]
    SizeMismatch { expected: u32, actual: u32 },
    #[error("No distinct fault points found after {0} attempts")]
    FaultLineExhausted(u32),
}
