use cgmath::{Point3, Vector3};

use crate::engine_state::{
    rendering::vertex::QuadRecord, voxels::block::block_type::BlockType,
};

/// A merged rectangle of same-type faces inside one face layer.
///
/// Corners are in the layer's `(u, v)` coordinates; `(u1, v1)` is the first
/// covered cell and `(u2, v2)` is exclusive, so the quad covers
/// `[u1, u2) × [v1, v2)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Quad2D {
    pub block_type: BlockType,
    pub u1: i32,
    pub v1: i32,
    pub u2: i32,
    pub v2: i32,
    pub light: u8,
    pub metadata: u8,
}

impl Quad2D {
    pub fn width(&self) -> i32 {
        self.u2 - self.u1
    }

    pub fn height(&self) -> i32 {
        self.v2 - self.v1
    }

    /// Number of layer cells covered.
    pub fn area(&self) -> i32 {
        self.width() * self.height()
    }

    pub fn covers(&self, i: usize, j: usize) -> bool {
        let (i, j) = (i as i32, j as i32);
        i >= self.u1 && i < self.u2 && j >= self.v1 && j < self.v2
    }
}

/// A quad in chunk-local 3D coordinates.
///
/// Exactly one coordinate is equal between `corner1` and `corner2`; that axis
/// is the axis of `normal`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Quad3D {
    pub block_type: BlockType,
    pub corner1: Point3<i32>,
    pub corner2: Point3<i32>,
    pub normal: Vector3<i32>,
    pub light: u8,
    pub metadata: u8,
}

impl Quad3D {
    /// Whether this quad is drawn in the translucent pass.
    pub fn is_translucent(&self) -> bool {
        self.block_type.is_translucent()
    }

    /// Number of coordinate axes on which the two corners agree.
    pub fn flat_axes(&self) -> usize {
        let delta = self.corner2 - self.corner1;
        [delta.x, delta.y, delta.z].iter().filter(|d| **d == 0).count()
    }

    pub fn to_record(&self) -> QuadRecord {
        QuadRecord::new(self)
    }
}
