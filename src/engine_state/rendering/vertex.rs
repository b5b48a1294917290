//! Packed quad records for vertex-buffer upload.
//!
//! A finished mesh is handed to the renderer as a flat array of quad records
//! rather than expanded vertices. The record layout is fixed and has no padding
//! so a slice of records can be cast straight to bytes.

use super::meshing::mesh::Quad3D;

/// One quad in upload format.
///
/// # Memory Layout
/// - Block type: u8 (1 byte)
/// - Corner 1: 3x i32 (12 bytes)
/// - Corner 2: 3x i32 (12 bytes)
/// - Normal: 3x i32 (12 bytes)
/// - Lighting: u8 (1 byte)
/// - Metadata: u8 (1 byte)
///
/// Total size: 39 bytes
#[repr(C, packed)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadRecord {
    block_type: u8,
    corner1: [i32; 3],
    corner2: [i32; 3],
    normal: [i32; 3],
    light: u8,
    metadata: u8,
}

impl QuadRecord {
    /// Size of one record in bytes.
    pub const SIZE: usize = std::mem::size_of::<QuadRecord>();

    /// Packs a chunk-local quad.
    pub fn new(quad: &Quad3D) -> Self {
        QuadRecord {
            block_type: quad.block_type as u8,
            corner1: [quad.corner1.x, quad.corner1.y, quad.corner1.z],
            corner2: [quad.corner2.x, quad.corner2.y, quad.corner2.z],
            normal: [quad.normal.x, quad.normal.y, quad.normal.z],
            light: quad.light,
            metadata: quad.metadata,
        }
    }

    pub fn block_type(&self) -> u8 {
        self.block_type
    }

    pub fn corners(&self) -> ([i32; 3], [i32; 3]) {
        (self.corner1, self.corner2)
    }

    pub fn normal(&self) -> [i32; 3] {
        self.normal
    }
}

/// Casts a record slice to its byte representation.
pub fn records_as_bytes(records: &[QuadRecord]) -> &[u8] {
    bytemuck::cast_slice(records)
}

#[cfg(test)]
mod tests {
    use bytemuck::Zeroable;
    use cgmath::{Point3, Vector3};

    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    #[test]
    fn test_record_has_no_padding() {
        assert_eq!(QuadRecord::SIZE, 39);
    }

    #[test]
    fn test_record_byte_layout() {
        let quad = Quad3D {
            block_type: BlockType::GRASS,
            corner1: Point3::new(1, 2, 3),
            corner2: Point3::new(4, 2, -5),
            normal: Vector3::new(0, 1, 0),
            light: 0x0F,
            metadata: 0x70,
        };
        let record = QuadRecord::new(&quad);
        let bytes = bytemuck::bytes_of(&record);

        assert_eq!(bytes.len(), 39);
        assert_eq!(bytes[0], BlockType::GRASS as u8);
        assert_eq!(&bytes[1..5], &1i32.to_ne_bytes());
        assert_eq!(&bytes[21..25], &(-5i32).to_ne_bytes());
        assert_eq!(&bytes[29..33], &1i32.to_ne_bytes());
        assert_eq!(bytes[37], 0x0F);
        assert_eq!(bytes[38], 0x70);
        assert_eq!(record.corners(), ([1, 2, 3], [4, 2, -5]));
        assert_eq!(record.normal(), [0, 1, 0]);
        assert_eq!(record.block_type(), BlockType::GRASS as u8);
    }

    #[test]
    fn test_slice_cast_is_contiguous() {
        let records = vec![QuadRecord::zeroed(); 3];
        assert_eq!(records_as_bytes(&records).len(), 3 * QuadRecord::SIZE);
    }
}
