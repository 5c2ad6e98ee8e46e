//! Configuration for fault-formation terrain generation.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::TerrainError;

/// When the FIR smoothing pass runs inside a fault iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingSchedule {
    /// Smooth once, after every row has been raised.
    #[default]
    PerIteration,
    /// Smooth after each z-row of the fault sweep. Kept for compatibility
    /// with terrain produced by the legacy generator.
    PerRow,
}

/// Errors that can occur while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] TerrainError),
}

/// Parameters for fault-formation heightmap generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultFormationConfig {
    /// Width and depth of the heightmap in cells.
    pub size: u32,
    /// Number of fault passes. Earlier passes raise more than later ones.
    pub iterations: u32,
    /// Lowest elevation after normalization.
    pub min_height: f32,
    /// Highest elevation after normalization.
    pub max_height: f32,
    /// FIR smoothing coefficient in [0, 1). 0 disables smoothing.
    pub filter: f32,
    /// Random seed for reproducible generation.
    pub seed: u64,
    /// Placement of the smoothing pass within each iteration.
    pub schedule: SmoothingSchedule,
}

impl Default for FaultFormationConfig {
    fn default() -> Self {
        Self {
            size: 256,
            iterations: 500,
            min_height: 0.0,
            max_height: 300.0,
            filter: 0.5,
            seed: 42,
            schedule: SmoothingSchedule::default(),
        }
    }
}

impl FaultFormationConfig {
    /// Creates the default configuration with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Sharp ridges and cliffs: light smoothing, many faults.
    pub fn rugged(seed: u64) -> Self {
        Self {
            iterations: 800,
            filter: 0.2,
            seed,
            ..Default::default()
        }
    }

    /// Rolling hills: heavy smoothing, fewer faults.
    pub fn smooth(seed: u64) -> Self {
        Self {
            iterations: 250,
            max_height: 150.0,
            filter: 0.85,
            seed,
            ..Default::default()
        }
    }

    /// Checks every parameter, reporting the first violation.
    pub fn validate(&self) -> Result<(), TerrainError> {
        // Negated so NaN bounds are rejected too.
        if !(self.min_height < self.max_height) {
            return Err(TerrainError::InvalidHeightRange(self.min_height, self.max_height));
        }
        // Accumulated heights are bounded by iterations * max(|min|, |max|);
        // both it and the span must stay finite for normalization.
        let peak = self.min_height.abs().max(self.max_height.abs());
        let span = self.max_height - self.min_height;
        if !span.is_finite() || !(peak * self.iterations as f32).is_finite() {
            return Err(TerrainError::InvalidHeightRange(self.min_height, self.max_height));
        }
        if self.size < 2 {
            return Err(TerrainError::SizeTooSmall(self.size));
        }
        if self.iterations == 0 {
            return Err(TerrainError::NoIterations);
        }
        if !(0.0..1.0).contains(&self.filter) {
            return Err(TerrainError::InvalidFilter(self.filter));
        }
        Ok(())
    }

    /// Elevation added on the raised side of the fault in iteration `iteration`.
    ///
    /// Decreases linearly from `max_height` at the first iteration towards
    /// `min_height`.
    pub fn iteration_height(&self, iteration: u32) -> f32 {
        let delta = self.max_height - self.min_height;
        self.max_height - delta * (iteration as f32 / self.iterations as f32)
    }

    /// Parses and validates a configuration from JSON. Missing fields take
    /// their default values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
