//! Indexed triangle list over a heightmap.

use glam::Vec3;

use crate::terrain::Heightmap;

/// A single mesh vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Indexed triangle list with one vertex per heightmap cell.
#[derive(Debug, Clone)]
pub struct TriangleList {
    /// Vertices per row (equal to the heightmap size).
    pub width: u32,
    /// Number of rows.
    pub depth: u32,
    pub vertices: Vec<TerrainVertex>,
    /// Three indices per triangle.
    pub indices: Vec<u32>,
}

impl TriangleList {
    /// Builds the mesh for `heightmap`.
    ///
    /// Cell `(x, z)` becomes the vertex `(x * world_scale, height, z * world_scale)`.
    /// Each quad is split into two triangles wound so that flat terrain faces +Y.
    pub fn from_heightmap(heightmap: &Heightmap, world_scale: f32) -> Self {
        let size = heightmap.size();

        let vertices: Vec<TerrainVertex> = heightmap
            .pixel_coords()
            .map(|(x, z)| TerrainVertex {
                position: Vec3::new(
                    x as f32 * world_scale,
                    heightmap.get(x, z),
                    z as f32 * world_scale,
                ),
                normal: Vec3::ZERO,
            })
            .collect();

        let quads = size.saturating_sub(1) as usize;
        let mut indices = Vec::with_capacity(quads * quads * 6);

        for z in 0..size.saturating_sub(1) {
            for x in 0..size - 1 {
                let bottom_left = z * size + x;
                let top_left = (z + 1) * size + x;
                let top_right = (z + 1) * size + x + 1;
                let bottom_right = z * size + x + 1;

                indices.extend([bottom_left, top_left, top_right]);
                indices.extend([bottom_left, top_right, bottom_right]);
            }
        }

        let mut list = Self {
            width: size,
            depth: size,
            vertices,
            indices,
        };
        list.calc_normals();
        list
    }

    /// Number of triangles in the list.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Recomputes per-vertex normals as the normalized sum of the adjacent
    /// face normals.
    fn calc_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];

        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let p0 = self.vertices[i0].position;
            let edge1 = self.vertices[i1].position - p0;
            let edge2 = self.vertices[i2].position - p0;
            let face_normal = edge1.cross(edge2);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            vertex.normal = normal.try_normalize().unwrap_or(Vec3::Y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let heightmap = Heightmap::new(5);
        let list = TriangleList::from_heightmap(&heightmap, 1.0);

        assert_eq!(list.vertices.len(), 25);
        assert_eq!(list.triangle_count(), 4 * 4 * 2);
        assert!(list.indices.iter().all(|&i| (i as usize) < list.vertices.len()));
    }

    #[test]
    fn test_vertex_positions() {
        let mut heightmap = Heightmap::new(3);
        heightmap.set(2, 1, 7.5);
        let list = TriangleList::from_heightmap(&heightmap, 4.0);

        let vertex = list.vertices[(1 * 3 + 2) as usize];
        assert_eq!(vertex.position, Vec3::new(8.0, 7.5, 4.0));
    }

    #[test]
    fn test_quad_winding() {
        let heightmap = Heightmap::new(2);
        let list = TriangleList::from_heightmap(&heightmap, 1.0);
        assert_eq!(list.indices, vec![0, 2, 3, 0, 3, 1]);
    }

    #[test]
    fn test_flat_terrain_normals_point_up() {
        let heightmap = Heightmap::new(6);
        let list = TriangleList::from_heightmap(&heightmap, 2.0);

        for vertex in &list.vertices {
            assert!((vertex.normal - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn test_slope_normals_lean_downhill() {
        // Height rises with x, so normals should tilt towards -x.
        let heightmap = Heightmap::from_fn(4, |x, _| x as f32);
        let list = TriangleList::from_heightmap(&heightmap, 1.0);

        for vertex in &list.vertices {
            assert!(vertex.normal.x < 0.0);
            assert!(vertex.normal.y > 0.0);
            assert!((vertex.normal.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_single_cell_has_no_triangles() {
        let heightmap = Heightmap::new(1);
        let list = TriangleList::from_heightmap(&heightmap, 1.0);
        assert_eq!(list.vertices.len(), 1);
        assert_eq!(list.triangle_count(), 0);
        assert_eq!(list.vertices[0].normal, Vec3::Y);
    }
}
