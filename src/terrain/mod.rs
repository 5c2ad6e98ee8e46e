//! Terrain generation module.
//!
//! Provides the heightmap grid and the fault-formation generator that
//! fills it.

mod config;
mod error;
mod fault;
mod heightmap;

pub use config::{ConfigError, FaultFormationConfig, SmoothingSchedule};
pub use error::TerrainError;
pub use fault::{
    accumulate_faults, create_fault_formation, create_fault_formation_seeded,
    gen_random_terrain_points, FaultLine, TerrainPoint, MAX_POINT_ATTEMPTS,
};
pub use heightmap::Heightmap;
