//! Chunk coordinates.
//!
//! A `ChunkCoord` names a 16x16x16 chunk. `x` and `z` are chunk indices while
//! `y` is the block height of the chunk's floor, always a multiple of
//! `CHUNK_DIMENSION`. The type is a plain value that other structures embed.

use std::fmt;

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use super::CHUNK_DIMENSION;
use crate::engine_state::voxels::block::block_side::BlockSide;

/// Identifies a chunk in the world.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// Chunk index along x.
    pub x: i32,
    /// Block height of the chunk floor, a multiple of `CHUNK_DIMENSION`.
    pub y: i32,
    /// Chunk index along z.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a chunk coordinate.
    ///
    /// # Panics
    /// Panics if `y` is not a multiple of `CHUNK_DIMENSION`.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        assert!(
            y.rem_euclid(CHUNK_DIMENSION) == 0,
            "chunk y coordinate {y} is not a multiple of {CHUNK_DIMENSION}"
        );
        ChunkCoord { x, y, z }
    }

    /// The chunk containing a world block position, together with the
    /// position local to that chunk.
    pub fn from_world(position: Point3<i32>) -> (ChunkCoord, [usize; 3]) {
        let coords = ChunkCoord {
            x: position.x.div_euclid(CHUNK_DIMENSION),
            y: position.y.div_euclid(CHUNK_DIMENSION) * CHUNK_DIMENSION,
            z: position.z.div_euclid(CHUNK_DIMENSION),
        };
        let local = [
            position.x.rem_euclid(CHUNK_DIMENSION) as usize,
            position.y.rem_euclid(CHUNK_DIMENSION) as usize,
            position.z.rem_euclid(CHUNK_DIMENSION) as usize,
        ];
        (coords, local)
    }

    /// World block position of the chunk's minimum corner.
    pub fn origin(&self) -> Point3<i32> {
        Point3::new(self.x * CHUNK_DIMENSION, self.y, self.z * CHUNK_DIMENSION)
    }

    /// The y axis expressed in chunks instead of blocks.
    pub fn layer(&self) -> i32 {
        self.y.div_euclid(CHUNK_DIMENSION)
    }

    /// The chunk adjacent across `side`.
    pub fn neighbor(&self, side: BlockSide) -> ChunkCoord {
        let normal = side.normal();
        ChunkCoord {
            x: self.x + normal.x,
            y: self.y + normal.y * CHUNK_DIMENSION,
            z: self.z + normal.z,
        }
    }

    /// Squared distance to `other`, counted in chunks on every axis.
    /// Saturates at `i64::MAX`.
    pub fn distance_squared(&self, other: &ChunkCoord) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.layer() as i64 - other.layer() as i64;
        let dz = self.z as i64 - other.z as i64;
        dx.saturating_mul(dx)
            .saturating_add(dy * dy)
            .saturating_add(dz.saturating_mul(dz))
    }

    /// Chebyshev distance to `other`, counted in chunks. Saturates at
    /// `i32::MAX`.
    pub fn chebyshev_distance(&self, other: &ChunkCoord) -> i32 {
        let distance = (self.x as i64 - other.x as i64)
            .abs()
            .max((self.layer() as i64 - other.layer() as i64).abs())
            .max((self.z as i64 - other.z as i64).abs());
        i32::try_from(distance).unwrap_or(i32::MAX)
    }

    /// A stable hash used to route requests for this chunk to a worker.
    ///
    /// Independent of `std`'s randomized hasher so routing is reproducible.
    pub fn shard_key(&self) -> u64 {
        let mut key = 0xcbf2_9ce4_8422_2325_u64;
        for value in [self.x, self.y, self.z] {
            key ^= value as u32 as u64;
            key = key.wrapping_mul(0x0000_0100_0000_01b3);
        }
        key
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_world_handles_negative_positions() {
        let (coords, local) = ChunkCoord::from_world(Point3::new(-1, 17, 32));
        assert_eq!(coords, ChunkCoord::new(-1, 16, 2));
        assert_eq!(local, [15, 1, 0]);
        assert_eq!(coords.origin(), Point3::new(-16, 16, 32));
    }

    #[test]
    fn test_distances_of_far_apart_chunks() {
        let origin = ChunkCoord::new(0, 0, 0);
        let east = ChunkCoord::new(i32::MAX, 0, 0);
        let span = i32::MAX as i64;
        assert_eq!(east.distance_squared(&origin), span * span);
        assert_eq!(east.chebyshev_distance(&origin), i32::MAX);

        let a = ChunkCoord::new(i32::MAX, 0, i32::MIN);
        let b = ChunkCoord::new(i32::MIN, 0, i32::MAX);
        assert_eq!(a.distance_squared(&b), i64::MAX);
        assert_eq!(a.chebyshev_distance(&b), i32::MAX);
        assert_eq!(a.chebyshev_distance(&a), 0);
    }

    #[test]
    fn test_neighbor_steps_y_in_blocks() {
        let coords = ChunkCoord::new(0, 32, 0);
        assert_eq!(coords.neighbor(BlockSide::UP), ChunkCoord::new(0, 48, 0));
        assert_eq!(coords.neighbor(BlockSide::DOWN), ChunkCoord::new(0, 16, 0));
        assert_eq!(coords.neighbor(BlockSide::EAST), ChunkCoord::new(1, 32, 0));
        assert_eq!(coords.neighbor(BlockSide::NORTH), ChunkCoord::new(0, 32, -1));
    }

    #[test]
    fn test_distance_counts_chunks() {
        let a = ChunkCoord::new(0, 0, 0);
        let b = ChunkCoord::new(1, 32, 2);
        assert_eq!(a.distance_squared(&b), 1 + 4 + 4);
        assert_eq!(a.chebyshev_distance(&b), 2);
    }

    #[test]
    #[should_panic]
    fn test_unaligned_y_panics() {
        ChunkCoord::new(0, 5, 0);
    }
}
