//! # World Module
//!
//! This module provides the `World` struct which owns every live chunk on the
//! main thread. It serves as the central coordinator for chunk loading,
//! unloading, edits and mesh request snapshots.
//!
//! ## Snapshots
//!
//! Chunks are stored as `Arc<Chunk>`. A mesh request clones the `Arc`s of the
//! chunk and its neighbors, which is cheap and gives the worker an immutable
//! view. An edit goes through `Arc::make_mut`: while a worker still holds a
//! snapshot the chunk is copied first, so the worker never observes the write.
//!
//! ## Vertical Range
//!
//! The world spans block heights `0..world_height`. Reads outside that range
//! return air. Neighbor snapshots requested outside the range are an all-air
//! chunk, so terrain at the top of the world still gets its top faces.

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::Point3;
use log::debug;

use crate::engine_state::{
    error::EngineError,
    rendering::tasks::chunk_mesh_generation_task::MeshRequest,
    voxels::{
        block::{block_side::BlockSide, Block, MAX_LIGHT},
        chunk::{Chunk, ChunkCoord, CHUNK_DIMENSION_USIZE},
    },
};

/// Represents a voxel world composed of multiple chunks.
pub struct World {
    chunks: HashMap<ChunkCoord, Arc<Chunk>>,
    world_height: i32,
    sky: Arc<Chunk>,
}

impl World {
    /// Creates a new, empty world spanning block heights `0..world_height`.
    pub fn new(world_height: i32) -> Self {
        World {
            chunks: HashMap::new(),
            world_height,
            sky: Arc::new(Chunk::filled(ChunkCoord::default(), Block::AIR.with_light(MAX_LIGHT))),
        }
    }

    pub fn world_height(&self) -> i32 {
        self.world_height
    }

    /// Whether a chunk's floor lies inside the vertical range of the world.
    pub fn contains_layer(&self, coords: ChunkCoord) -> bool {
        coords.y >= 0 && coords.y < self.world_height
    }

    /// Inserts (or replaces) a chunk, returning the previous one.
    pub fn insert_chunk(&mut self, chunk: Chunk) -> Option<Arc<Chunk>> {
        self.chunks.insert(chunk.position(), Arc::new(chunk))
    }

    pub fn remove_chunk(&mut self, coords: ChunkCoord) -> Option<Arc<Chunk>> {
        self.chunks.remove(&coords)
    }

    pub fn chunk(&self, coords: ChunkCoord) -> Option<&Arc<Chunk>> {
        self.chunks.get(&coords)
    }

    pub fn is_loaded(&self, coords: ChunkCoord) -> bool {
        self.chunks.contains_key(&coords)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Coordinates of every loaded chunk, sorted.
    pub fn loaded_coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self.chunks.keys().copied().collect();
        coords.sort();
        coords
    }

    /// Reads the block at a world position.
    ///
    /// Positions outside the vertical range, or inside a chunk that is not
    /// loaded, read as air.
    pub fn get_block(&self, position: Point3<i32>) -> Block {
        if position.y < 0 || position.y >= self.world_height {
            return Block::AIR;
        }
        let (coords, local) = ChunkCoord::from_world(position);
        match self.chunks.get(&coords) {
            Some(chunk) => chunk.get_at(local),
            None => Block::AIR,
        }
    }

    /// Writes the block at a world position.
    ///
    /// # Returns
    /// The chunks whose meshes the edit invalidates: the owning chunk first,
    /// then every loaded neighbor whose shared face the edited cell touches.
    ///
    /// # Errors
    /// `OutOfWorld` if the position is outside the vertical range,
    /// `ChunkNotLoaded` if the owning chunk is not loaded.
    pub fn set_block(&mut self, position: Point3<i32>, block: Block) -> Result<Vec<ChunkCoord>, EngineError> {
        if position.y < 0 || position.y >= self.world_height {
            return Err(EngineError::OutOfWorld([position.x, position.y, position.z]));
        }
        let (coords, local) = ChunkCoord::from_world(position);
        let chunk = self
            .chunks
            .get_mut(&coords)
            .ok_or(EngineError::ChunkNotLoaded(coords))?;
        Arc::make_mut(chunk).set_at(local, block);

        let mut invalidated = vec![coords];
        for side in BlockSide::all() {
            let on_border = if side.is_positive() {
                local[side.axis()] == CHUNK_DIMENSION_USIZE - 1
            } else {
                local[side.axis()] == 0
            };
            let neighbor = coords.neighbor(side);
            if on_border && self.chunks.contains_key(&neighbor) {
                invalidated.push(neighbor);
            }
        }
        debug!("Edit at {:?} invalidates {} chunk(s)", position, invalidated.len());
        Ok(invalidated)
    }

    /// Loaded chunks adjacent to `coords`.
    pub fn loaded_neighbors(&self, coords: ChunkCoord) -> Vec<ChunkCoord> {
        BlockSide::all()
            .into_iter()
            .map(|side| coords.neighbor(side))
            .filter(|neighbor| self.chunks.contains_key(neighbor))
            .collect()
    }

    /// The neighbor snapshot across `side`, following the vertical clamp.
    fn neighbor_snapshot(&self, coords: ChunkCoord, side: BlockSide) -> Option<Arc<Chunk>> {
        let neighbor = coords.neighbor(side);
        if !self.contains_layer(neighbor) {
            return Some(self.sky.clone());
        }
        self.chunks.get(&neighbor).cloned()
    }

    /// Snapshots a loaded chunk and its neighbors into a mesh request.
    ///
    /// Returns `None` if the chunk itself is not loaded.
    pub fn mesh_request(&self, coords: ChunkCoord) -> Option<MeshRequest> {
        let chunk = self.chunks.get(&coords)?.clone();
        let mut neighbors: [Option<Arc<Chunk>>; 6] = Default::default();
        for side in BlockSide::all() {
            neighbors[side as usize] = self.neighbor_snapshot(coords, side);
        }
        Some(MeshRequest::new(coords, chunk, neighbors))
    }

    /// All chunk coordinates within `radius` chunks of `center`, limited to
    /// the vertical range, nearest first.
    pub fn coords_within(&self, center: ChunkCoord, radius: i32) -> Vec<ChunkCoord> {
        let mut coords = Vec::new();
        for dz in -radius..=radius {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    let y = center.y + dy * CHUNK_DIMENSION_USIZE as i32;
                    let candidate = ChunkCoord::new(center.x + dx, y, center.z + dz);
                    if self.contains_layer(candidate) {
                        coords.push(candidate);
                    }
                }
            }
        }
        coords.sort_by_key(|c| (c.distance_squared(&center), *c));
        coords
    }

    /// Removes every chunk farther than `radius` chunks from `center`.
    ///
    /// # Returns
    /// The coordinates of the removed chunks, sorted.
    pub fn unload_outside(&mut self, center: ChunkCoord, radius: i32) -> Vec<ChunkCoord> {
        let mut removed: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .filter(|coords| coords.chebyshev_distance(&center) > radius)
            .copied()
            .collect();
        removed.sort();
        for coords in removed.iter() {
            self.chunks.remove(coords);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn stone() -> Block {
        Block::new(BlockType::STONE)
    }

    #[test]
    fn test_reads_outside_height_are_air() {
        let mut world = World::new(32);
        world.insert_chunk(Chunk::filled(ChunkCoord::new(0, 0, 0), stone()));
        assert_eq!(world.get_block(Point3::new(0, 0, 0)).kind(), BlockType::STONE);
        assert!(world.get_block(Point3::new(0, -1, 0)).is_air());
        assert!(world.get_block(Point3::new(0, 32, 0)).is_air());
        // Inside the range but not loaded.
        assert!(world.get_block(Point3::new(0, 20, 0)).is_air());
    }

    #[test]
    fn test_set_block_errors() {
        let mut world = World::new(32);
        assert!(matches!(
            world.set_block(Point3::new(0, 40, 0), stone()),
            Err(EngineError::OutOfWorld(_))
        ));
        assert!(matches!(
            world.set_block(Point3::new(0, 4, 0), stone()),
            Err(EngineError::ChunkNotLoaded(_))
        ));
    }

    #[test]
    fn test_border_edit_invalidates_loaded_neighbors() {
        let mut world = World::new(64);
        let center = ChunkCoord::new(0, 16, 0);
        world.insert_chunk(Chunk::empty(center));
        world.insert_chunk(Chunk::empty(center.neighbor(BlockSide::WEST)));
        world.insert_chunk(Chunk::empty(center.neighbor(BlockSide::DOWN)));

        // Corner cell (0, 16, 0): touches west, down and north faces; north is not loaded.
        let invalidated = world.set_block(Point3::new(0, 16, 0), stone()).unwrap();
        assert_eq!(
            invalidated,
            vec![
                center,
                center.neighbor(BlockSide::WEST),
                center.neighbor(BlockSide::DOWN)
            ]
        );

        // Interior cell: only the owner.
        let invalidated = world.set_block(Point3::new(5, 21, 5), stone()).unwrap();
        assert_eq!(invalidated, vec![center]);
    }

    #[test]
    fn test_edit_does_not_touch_outstanding_snapshot() {
        let mut world = World::new(16);
        let coords = ChunkCoord::new(0, 0, 0);
        world.insert_chunk(Chunk::empty(coords));
        let request = world.mesh_request(coords).unwrap();

        world.set_block(Point3::new(1, 1, 1), stone()).unwrap();

        assert!(request.chunk().is_empty());
        assert_eq!(world.get_block(Point3::new(1, 1, 1)).kind(), BlockType::STONE);
    }

    #[test]
    fn test_mesh_request_neighbors() {
        let mut world = World::new(32);
        let coords = ChunkCoord::new(0, 16, 0);
        world.insert_chunk(Chunk::empty(coords));
        world.insert_chunk(Chunk::empty(coords.neighbor(BlockSide::EAST)));

        let request = world.mesh_request(coords).unwrap();
        assert!(request.neighbor(BlockSide::EAST).is_some());
        assert!(request.neighbor(BlockSide::WEST).is_none());
        // Above the world: clamped to air.
        let up = request.neighbor(BlockSide::UP).unwrap();
        assert!(up.is_empty());
        // Inside the range, not loaded.
        assert!(request.neighbor(BlockSide::DOWN).is_none());

        assert!(world.mesh_request(ChunkCoord::new(5, 0, 5)).is_none());
    }

    #[test]
    fn test_coords_within_and_unload() {
        let mut world = World::new(32);
        let center = ChunkCoord::new(0, 0, 0);
        let coords = world.coords_within(center, 1);
        // Only layers 0 and 16 exist.
        assert_eq!(coords.len(), 9 * 2);
        assert_eq!(coords[0], center);

        for c in coords.iter() {
            world.insert_chunk(Chunk::empty(*c));
        }
        let removed = world.unload_outside(ChunkCoord::new(1, 0, 0), 1);
        assert_eq!(removed.len(), 6);
        assert!(removed.iter().all(|c| c.x == -1));
        assert_eq!(world.len(), 12);
    }
}
