//! # Block Side Module
//!
//! This module defines the six faces of a voxel block. A side fixes the axis a
//! face layer is taken along, the sign of its normal, and which neighbor chunk
//! a face on the chunk border looks into.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The discriminant is also the index of the matching neighbor snapshot in a
/// mesh request. The order is: [NORTH, SOUTH, EAST, WEST, UP, DOWN]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// Facing negative Z
    NORTH = 0,

    /// Facing positive Z
    SOUTH = 1,

    /// Facing positive X
    EAST = 2,

    /// Facing negative X
    WEST = 3,

    /// Facing positive Y
    UP = 4,

    /// Facing negative Y
    DOWN = 5,
}

impl BlockSide {
    /// Returns all six sides in meshing order.
    ///
    /// Meshing walks the x axis, then y, then z, negative face before positive
    /// face, so full-chunk output is deterministic.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::WEST,
            BlockSide::EAST,
            BlockSide::DOWN,
            BlockSide::UP,
            BlockSide::NORTH,
            BlockSide::SOUTH,
        ]
    }

    /// The coordinate axis of the face normal (0 = x, 1 = y, 2 = z).
    pub fn axis(self) -> usize {
        match self {
            BlockSide::EAST | BlockSide::WEST => 0,
            BlockSide::UP | BlockSide::DOWN => 1,
            BlockSide::NORTH | BlockSide::SOUTH => 2,
        }
    }

    /// Whether the normal points away from the origin.
    pub fn is_positive(self) -> bool {
        matches!(self, BlockSide::SOUTH | BlockSide::EAST | BlockSide::UP)
    }

    /// The unit step along the normal, `+1` or `-1`.
    pub fn sign(self) -> i32 {
        if self.is_positive() {
            1
        } else {
            -1
        }
    }

    /// The face normal as a vector with one non-zero component.
    pub fn normal(self) -> Vector3<i32> {
        let mut normal = [0; 3];
        normal[self.axis()] = self.sign();
        Vector3::new(normal[0], normal[1], normal[2])
    }

    /// The side facing the other way.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::NORTH => BlockSide::SOUTH,
            BlockSide::SOUTH => BlockSide::NORTH,
            BlockSide::EAST => BlockSide::WEST,
            BlockSide::WEST => BlockSide::EAST,
            BlockSide::UP => BlockSide::DOWN,
            BlockSide::DOWN => BlockSide::UP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normals_are_unit_axes() {
        for side in BlockSide::all() {
            let normal = side.normal();
            let components = [normal.x, normal.y, normal.z];
            assert_eq!(components.iter().filter(|c| **c != 0).count(), 1);
            assert_eq!(components[side.axis()], side.sign());
        }
    }

    #[test]
    fn test_opposite_flips_normal() {
        for side in BlockSide::all() {
            assert_eq!(side.opposite().normal(), -side.normal());
            assert_eq!(side.opposite().opposite(), side);
        }
    }
}
