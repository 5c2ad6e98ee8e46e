//! Triangle mesh construction from finished heightmaps.

mod triangle_list;

pub use triangle_list::{TerrainVertex, TriangleList};
