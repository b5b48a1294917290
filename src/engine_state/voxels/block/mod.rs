//! # Block Module
//!
//! This module provides the per-cell block data of the voxel engine: the block
//! type code plus packed metadata, the block type definitions and the six
//! block faces.

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Highest value of the 4-bit light field.
pub const MAX_LIGHT: u8 = 0x0F;

/// Highest value of the 4-bit liquid level field.
pub const MAX_LIQUID_LEVEL: u8 = 0x0F;

/// Represents a single voxel cell in the world.
///
/// # Memory Layout
/// Two bytes per cell. `metadata` packs the liquid level in the high nibble
/// and the combined sky/torch light in the low nibble.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    pub block_type: BlockTypeSize,
    /// Packed liquid level (bits 4..8) and light (bits 0..4).
    pub metadata: u8,
}

impl Block {
    /// The empty cell.
    pub const AIR: Block = Block {
        block_type: BlockType::AIR as BlockTypeSize,
        metadata: 0,
    };

    /// Creates a new block of the specified type with zeroed metadata.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
            metadata: 0,
        }
    }

    /// Creates a block with explicit liquid level and light.
    ///
    /// Both values are truncated to their 4-bit fields.
    pub fn with_metadata(block_type: BlockType, liquid_level: u8, light: u8) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
            metadata: ((liquid_level & MAX_LIQUID_LEVEL) << 4) | (light & MAX_LIGHT),
        }
    }

    /// Decodes the block type.
    pub fn kind(&self) -> BlockType {
        BlockType::get_block_type_from_int(self.block_type)
    }

    pub fn is_air(&self) -> bool {
        self.block_type == BlockType::AIR as BlockTypeSize
    }

    pub fn is_translucent(&self) -> bool {
        self.kind().is_translucent()
    }

    pub fn is_liquid(&self) -> bool {
        self.kind().is_liquid()
    }

    /// The 4-bit liquid level.
    pub fn liquid_level(&self) -> u8 {
        self.metadata >> 4
    }

    /// The 4-bit combined sky/torch light.
    pub fn light(&self) -> u8 {
        self.metadata & MAX_LIGHT
    }

    /// Returns a copy with the light nibble replaced.
    pub fn with_light(self, light: u8) -> Self {
        Block {
            block_type: self.block_type,
            metadata: (self.metadata & !MAX_LIGHT) | (light & MAX_LIGHT),
        }
    }
}
