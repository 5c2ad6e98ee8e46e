//! Fault-formation procedural terrain generator.
//!
//! Builds square heightmaps by repeatedly cutting the grid with random fault
//! lines, raising one side, and smoothing the result with a four-directional
//! FIR filter. Finished heightmaps can be meshed or exported.

pub mod terrain;
pub mod erosion;
pub mod mesh;
pub mod export;
pub mod pipeline;
pub mod logging;

pub use terrain::{
    create_fault_formation, create_fault_formation_seeded, FaultFormationConfig, Heightmap,
    SmoothingSchedule, TerrainError,
};
pub use erosion::apply_fir_filter;
pub use mesh::TriangleList;
pub use pipeline::{Pipeline, StageConfig};
