//! RAW format export for game engine compatibility.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use crate::terrain::Heightmap;

/// Errors that can occur during RAW export or import.
#[derive(Error, Debug)]
pub enum RawExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
    #[error("RAW file of {0} bytes is not a square grid of f32 heights")]
    NotSquare(u64),
}

/// RAW export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawFormat {
    /// 16-bit unsigned integer, little-endian (Unity default).
    #[default]
    R16LittleEndian,
    /// 16-bit unsigned integer, big-endian.
    R16BigEndian,
    /// 32-bit float, little-endian (high precision).
    R32Float,
}

/// Exports a heightmap as a headerless RAW file in row-major order.
///
/// `min_height` and `max_height` only matter for the R16 formats, which
/// quantize `[min_height, max_height]` to `[0, 65535]`.
pub fn export_heightmap_raw(
    heightmap: &Heightmap,
    path: &Path,
    format: RawFormat,
    min_height: f32,
    max_height: f32,
) -> Result<(), RawExportError> {
    if format != RawFormat::R32Float && !(min_height < max_height) {
        return Err(RawExportError::InvalidHeightRange(min_height, max_height));
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let range = max_height - min_height;
    let quantize = |height: f32| {
        let normalized = ((height - min_height) / range).clamp(0.0, 1.0);
        (normalized * 65535.0) as u16
    };

    match format {
        RawFormat::R16LittleEndian => {
            for &height in heightmap.heights() {
                writer.write_all(&quantize(height).to_le_bytes())?;
            }
        }
        RawFormat::R16BigEndian => {
            for &height in heightmap.heights() {
                writer.write_all(&quantize(height).to_be_bytes())?;
            }
        }
        RawFormat::R32Float => {
            for &height in heightmap.heights() {
                writer.write_all(&height.to_le_bytes())?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// Loads a square heightmap from a little-endian f32 RAW file.
///
/// The size is inferred from the file length.
pub fn load_heightmap_raw_f32(path: &Path) -> Result<Heightmap, RawExportError> {
    let data = std::fs::read(path)?;
    let len = data.len() as u64;

    if len == 0 || len % 4 != 0 {
        return Err(RawExportError::NotSquare(len));
    }
    let cells = len / 4;
    let size = (cells as f64).sqrt().round() as u64;
    if size * size != cells || size > u32::MAX as u64 {
        return Err(RawExportError::NotSquare(len));
    }

    let heights = data
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    Heightmap::from_heights(size as u32, heights).ok_or(RawExportError::NotSquare(len))
}

/// Returns the expected file size for a RAW export.
pub fn expected_file_size(size: u32, format: RawFormat) -> u64 {
    let cells = (size as u64) * (size as u64);
    match format {
        RawFormat::R16LittleEndian | RawFormat::R16BigEndian => cells * 2,
        RawFormat::R32Float => cells * 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn gradient(size: u32) -> Heightmap {
        let cells = (size * size) as f32;
        Heightmap::from_fn(size, |x, z| (z * size + x) as f32 / cells * 2.0 - 1.0)
    }

    #[test]
    fn test_export_heightmap_raw_r16() {
        let heightmap = gradient(64);

        let dir = tempdir().unwrap();
        let path = dir.path().join("test.raw");

        export_heightmap_raw(&heightmap, &path, RawFormat::R16LittleEndian, -1.0, 1.0).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert_eq!(metadata.len(), expected_file_size(64, RawFormat::R16LittleEndian));
    }

    #[test]
    fn test_export_heightmap_raw_r32() {
        let heightmap = gradient(32);

        let dir = tempdir().unwrap();
        let path = dir.path().join("test.raw");

        export_heightmap_raw(&heightmap, &path, RawFormat::R32Float, 0.0, 0.0).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert_eq!(metadata.len(), expected_file_size(32, RawFormat::R32Float));
    }

    #[test]
    fn test_r16_rejects_empty_range() {
        let heightmap = Heightmap::new(4);
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.raw");

        let result = export_heightmap_raw(&heightmap, &path, RawFormat::R16BigEndian, 1.0, 1.0);
        assert!(matches!(result, Err(RawExportError::InvalidHeightRange(..))));
    }

    #[test]
    fn test_expected_file_size() {
        assert_eq!(expected_file_size(256, RawFormat::R16LittleEndian), 256 * 256 * 2);
        assert_eq!(expected_file_size(256, RawFormat::R32Float), 256 * 256 * 4);
    }

    #[test]
    fn test_raw_content_correctness() {
        let mut heightmap = Heightmap::new(2);
        heightmap.set(0, 0, -1.0);
        heightmap.set(1, 0, 0.0);
        heightmap.set(0, 1, 0.5);
        heightmap.set(1, 1, 1.0);

        let dir = tempdir().unwrap();
        let path = dir.path().join("test.raw");

        export_heightmap_raw(&heightmap, &path, RawFormat::R16BigEndian, -1.0, 1.0).unwrap();

        let data = std::fs::read(&path).unwrap();
        assert_eq!(data.len(), 8);

        assert_eq!(u16::from_be_bytes([data[0], data[1]]), 0);
        let mid = u16::from_be_bytes([data[2], data[3]]);
        assert!((mid as i32 - 32767).abs() < 2);
        assert_eq!(u16::from_be_bytes([data[6], data[7]]), 65535);
    }

    #[test]
    fn test_float_raw_reloads_exactly() {
        let heightmap = gradient(9);
        let dir = tempdir().unwrap();
        let path = dir.path().join("terrain.raw");

        export_heightmap_raw(&heightmap, &path, RawFormat::R32Float, 0.0, 1.0).unwrap();
        let loaded = load_heightmap_raw_f32(&path).unwrap();

        assert_eq!(loaded, heightmap);
    }

    #[test]
    fn test_load_rejects_non_square() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.raw");
        std::fs::write(&path, vec![0u8; 4 * 3]).unwrap();

        assert!(matches!(load_heightmap_raw_f32(&path), Err(RawExportError::NotSquare(12))));
    }

    #[test]
    fn test_load_rejects_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.raw");
        std::fs::write(&path, Vec::<u8>::new()).unwrap();

        assert!(matches!(load_heightmap_raw_f32(&path), Err(RawExportError::NotSquare(0))));
    }
}
