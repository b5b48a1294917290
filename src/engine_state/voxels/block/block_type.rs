//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! It provides block type identification, integer conversion and the optical
//! properties (translucency, liquidity) the face extractor relies on.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminant is the block code stored in a chunk cell. `AIR` is always
/// code 0. The `FromPrimitive` derive allows conversion from the stored code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive)]
pub enum BlockType {
    /// An empty cell. Never produces geometry.
    AIR = 0,

    /// Solid rock, the bulk of generated terrain.
    STONE = 1,

    /// A basic dirt block found under the grass layer.
    DIRT = 2,

    /// A grass block, the top layer of generated terrain.
    GRASS = 3,

    /// A wooden block.
    WOOD = 4,

    /// Sand, generated on the sea floor.
    SAND = 5,

    /// A translucent solid. Faces behind it stay visible.
    GLASS = 6,

    /// A translucent liquid with a per-cell level.
    WATER = 7,
}

impl BlockType {
    /// Converts a stored block code to a `BlockType`.
    ///
    /// # Panics
    /// Panics if the code does not name a block type. Codes only ever come from
    /// `BlockType as BlockTypeSize`, so an unknown code means corrupted data.
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Self {
        match num::FromPrimitive::from_u8(btype) {
            Some(block_type) => block_type,
            None => panic!("unknown block code {btype}"),
        }
    }

    /// Whether this block occupies no space.
    pub fn is_air(self) -> bool {
        self == BlockType::AIR
    }

    /// Whether light and sight pass through this block.
    ///
    /// Air is not considered translucent; it is handled as "empty" by the
    /// face visibility rule.
    pub fn is_translucent(self) -> bool {
        matches!(self, BlockType::GLASS | BlockType::WATER)
    }

    /// Whether this block is a liquid whose surface height varies per cell.
    pub fn is_liquid(self) -> bool {
        self == BlockType::WATER
    }

    /// Returns all non-air block types, in code order.
    pub fn solid_types() -> [BlockType; 7] {
        [
            BlockType::STONE,
            BlockType::DIRT,
            BlockType::GRASS,
            BlockType::WOOD,
            BlockType::SAND,
            BlockType::GLASS,
            BlockType::WATER,
        ]
    }
}
