//! Wavefront OBJ export for terrain meshes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use crate::mesh::TriangleList;

/// Errors that can occur during OBJ export.
#[derive(Error, Debug)]
pub enum ObjExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes the mesh as positions, normals and faces. OBJ indices are 1-based.
pub fn export_mesh_obj(mesh: &TriangleList, path: &Path) -> Result<(), ObjExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# {}x{} terrain, {} triangles", mesh.width, mesh.depth, mesh.triangle_count())?;

    for vertex in &mesh.vertices {
        let p = vertex.position;
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for vertex in &mesh.vertices {
        let n = vertex.normal;
        writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
    }
    for tri in mesh.indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] + 1, tri[1] + 1, tri[2] + 1);
        writeln!(writer, "f {a}//{a} {b}//{b} {c}//{c}")?;
    }

    writer.flush()?;
    Ok(())
}
