//! # Chunk Module
//!
//! This module provides the `Chunk` struct, a 16x16x16 block of voxel cells and
//! the unit of meshing, together with chunk coordinates and generation.
//!
//! ## Storage
//!
//! - `blocks`: one `Block` (type + packed metadata) per cell, row-major in
//!   x, then y, then z
//! - `solid_array`: a bit vector (1 bit per cell) mirroring which cells are
//!   non-air, plus a running count of set bits
//!
//! The bit vector lets the mesher and the world answer "is this chunk empty?"
//! in O(1) and skip whole chunks without touching block data.
//!
//! ## Access Contract
//!
//! `get`/`set` take chunk-local coordinates in `0..CHUNK_DIMENSION`. Every
//! caller validates its coordinates first, so out-of-range access is a bug and
//! panics instead of returning an error.

use bitvec::prelude::BitVec;

use super::block::{block_type::BlockType, Block};

pub mod chunk_coord;
pub mod chunk_creation;

pub use chunk_coord::ChunkCoord;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// Chunk dimension as a `usize` for indexing.
pub const CHUNK_DIMENSION_USIZE: usize = CHUNK_DIMENSION as usize;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: usize = CHUNK_DIMENSION_USIZE * CHUNK_DIMENSION_USIZE;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: usize = CHUNK_PLANE_SIZE * CHUNK_DIMENSION_USIZE;

/// Represents a 16x16x16 collection of voxel blocks in the world.
///
/// The position is fixed at creation. Only cell contents change afterwards.
#[derive(Clone, Debug)]
pub struct Chunk {
    position: ChunkCoord,
    blocks: Vec<Block>,
    solid_array: BitVec,
    solid_count: usize,
}

impl Chunk {
    /// Creates a new, completely empty chunk (all blocks are air).
    pub fn empty(position: ChunkCoord) -> Self {
        Chunk {
            position,
            blocks: vec![Block::AIR; CHUNK_SIZE],
            solid_array: BitVec::repeat(false, CHUNK_SIZE),
            solid_count: 0,
        }
    }

    /// Creates a chunk completely filled with `block`.
    pub fn filled(position: ChunkCoord, block: Block) -> Self {
        let solid = !block.is_air();
        Chunk {
            position,
            blocks: vec![block; CHUNK_SIZE],
            solid_array: BitVec::repeat(solid, CHUNK_SIZE),
            solid_count: if solid { CHUNK_SIZE } else { 0 },
        }
    }

    /// The coordinates of this chunk.
    pub fn position(&self) -> ChunkCoord {
        self.position
    }

    fn index(x: usize, y: usize, z: usize) -> usize {
        assert!(
            x < CHUNK_DIMENSION_USIZE && y < CHUNK_DIMENSION_USIZE && z < CHUNK_DIMENSION_USIZE,
            "chunk access out of range: ({x}, {y}, {z})"
        );
        x + CHUNK_DIMENSION_USIZE * y + CHUNK_PLANE_SIZE * z
    }

    /// Gets the block at the specified chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if any coordinate is outside `0..CHUNK_DIMENSION`.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Block {
        self.blocks[Self::index(x, y, z)]
    }

    /// Array form of [`Chunk::get`].
    pub fn get_at(&self, local: [usize; 3]) -> Block {
        self.get(local[0], local[1], local[2])
    }

    /// Replaces the block at the specified chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if any coordinate is outside `0..CHUNK_DIMENSION`.
    pub fn set(&mut self, x: usize, y: usize, z: usize, block: Block) {
        let index = Self::index(x, y, z);
        let was_solid = self.solid_array[index];
        let is_solid = !block.is_air();
        if was_solid != is_solid {
            self.solid_array.set(index, is_solid);
            if is_solid {
                self.solid_count += 1;
            } else {
                self.solid_count -= 1;
            }
        }
        self.blocks[index] = block;
    }

    /// Array form of [`Chunk::set`].
    pub fn set_at(&mut self, local: [usize; 3], block: Block) {
        self.set(local[0], local[1], local[2], block)
    }

    /// Checks if the block at the specified chunk-relative coordinates is solid.
    pub fn is_block_solid(&self, x: usize, y: usize, z: usize) -> bool {
        self.solid_array[Self::index(x, y, z)]
    }

    /// Number of non-air cells.
    pub fn solid_count(&self) -> usize {
        self.solid_count
    }

    /// `true` if every cell is air.
    pub fn is_empty(&self) -> bool {
        self.solid_count == 0
    }

    /// `true` if no cell is air.
    pub fn is_full(&self) -> bool {
        self.solid_count == CHUNK_SIZE
    }

    /// Counts the cells of one block type.
    pub fn count_of(&self, block_type: BlockType) -> usize {
        let code = block_type as u8;
        self.blocks.iter().filter(|b| b.block_type == code).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_tracks_solid_count() {
        let mut chunk = Chunk::empty(ChunkCoord::default());
        assert!(chunk.is_empty());

        chunk.set(1, 2, 3, Block::new(BlockType::STONE));
        chunk.set(1, 2, 3, Block::new(BlockType::DIRT));
        assert_eq!(chunk.solid_count(), 1);
        assert!(chunk.is_block_solid(1, 2, 3));
        assert_eq!(chunk.get(1, 2, 3).kind(), BlockType::DIRT);

        chunk.set(1, 2, 3, Block::AIR);
        assert!(chunk.is_empty());
        assert!(!chunk.is_block_solid(1, 2, 3));
    }

    #[test]
    fn test_filled_chunk_is_full() {
        let chunk = Chunk::filled(ChunkCoord::new(2, 16, -3), Block::new(BlockType::STONE));
        assert!(chunk.is_full());
        assert_eq!(chunk.count_of(BlockType::STONE), CHUNK_SIZE);
        assert_eq!(chunk.position(), ChunkCoord::new(2, 16, -3));
    }

    #[test]
    fn test_air_fill_is_empty() {
        let chunk = Chunk::filled(ChunkCoord::default(), Block::AIR);
        assert!(chunk.is_empty());
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_get_panics() {
        Chunk::empty(ChunkCoord::default()).get(16, 0, 0);
    }
}
