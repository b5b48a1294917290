//! # Chunk Creation Module
//!
//! Procedural generation of chunk contents from chunk coordinates. Generation
//! is a pure function of the coordinates, the method and the seed, so a chunk
//! regenerated after unloading comes back identical.
//!
//! ## Perlin Terrain
//!
//! Column heights come from 2D Perlin noise. Columns are layered grass (sand
//! under water), dirt, then stone, and 3D Perlin noise carves caves where the
//! sample falls inside a narrow band around zero. Air below sea level becomes
//! water. Cells open to the sky carry full light.

use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use super::{Chunk, ChunkCoord, CHUNK_DIMENSION};
use crate::engine_state::voxels::block::{block_type::BlockType, Block, MAX_LIGHT, MAX_LIQUID_LEVEL};

/// Scaling factor applied to world coordinates when sampling column heights.
pub const PERLIN_SCALE_FACTOR: f64 = 0.02;
/// Scaling factor applied to world coordinates when sampling caves.
pub const CAVE_SCALE_FACTOR: f64 = 0.06;
/// Caves are carved where the 3D sample lies inside `±CAVE_THRESHOLD`.
pub const CAVE_THRESHOLD: f64 = 0.06;
/// Column height variation around the base height, in blocks.
pub const TERRAIN_AMPLITUDE: f64 = 12.0;
/// Height of a flat world's surface and the mean height of Perlin terrain.
pub const TERRAIN_BASE_HEIGHT: i32 = 24;
/// Number of dirt blocks between the surface and stone.
pub const DIRT_DEPTH: i32 = 3;

/// The method used to generate new chunks.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    /// Noise-based terrain with caves and water.
    #[default]
    Perlin,
    /// Grass on dirt on stone, flat at `TERRAIN_BASE_HEIGHT`.
    Flat,
    /// Every cell is stone.
    Solid,
    /// Every cell is air.
    Empty,
    /// Alternating stone and air cells.
    Checkerboard,
}

/// Generates chunk contents for a fixed method and seed.
pub struct ChunkGenerator {
    method: GenerationMethod,
    sea_level: i32,
    perlin: Perlin,
}

impl ChunkGenerator {
    pub fn new(method: GenerationMethod, seed: u32, sea_level: i32) -> Self {
        ChunkGenerator {
            method,
            sea_level,
            perlin: Perlin::new(seed),
        }
    }

    /// Generates the chunk at `position`.
    pub fn generate(&self, position: ChunkCoord) -> Chunk {
        match self.method {
            GenerationMethod::Perlin => self.perlin(position),
            GenerationMethod::Flat => self.layered(position, |_, _| TERRAIN_BASE_HEIGHT, false),
            GenerationMethod::Solid => Chunk::filled(position, Block::new(BlockType::STONE)),
            GenerationMethod::Empty => Chunk::filled(position, Block::AIR.with_light(MAX_LIGHT)),
            GenerationMethod::Checkerboard => Self::checkerboard(position),
        }
    }

    fn perlin(&self, position: ChunkCoord) -> Chunk {
        self.layered(
            position,
            |wx, wz| {
                let sample = self.perlin.get([
                    wx as f64 * PERLIN_SCALE_FACTOR,
                    0.0,
                    wz as f64 * PERLIN_SCALE_FACTOR,
                ]);
                TERRAIN_BASE_HEIGHT + (sample * TERRAIN_AMPLITUDE).round() as i32
            },
            true,
        )
    }

    /// Fills a chunk column by column from a height function.
    fn layered<F>(&self, position: ChunkCoord, height_at: F, carve_caves: bool) -> Chunk
    where
        F: Fn(i32, i32) -> i32,
    {
        let mut chunk = Chunk::empty(position);
        let origin = position.origin();

        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                let (wx, wz) = (origin.x + x, origin.z + z);
                let surface = height_at(wx, wz);

                for y in 0..CHUNK_DIMENSION {
                    let wy = origin.y + y;
                    let block = if wy < surface {
                        let depth = surface - 1 - wy;
                        if carve_caves && depth > DIRT_DEPTH && self.is_cave(wx, wy, wz) {
                            Block::AIR
                        } else {
                            Block::new(self.layer_type(surface, depth))
                        }
                    } else if wy < self.sea_level {
                        Block::with_metadata(BlockType::WATER, MAX_LIQUID_LEVEL, MAX_LIGHT)
                    } else {
                        Block::AIR.with_light(MAX_LIGHT)
                    };
                    chunk.set(x as usize, y as usize, z as usize, block);
                }
            }
        }

        chunk
    }

    fn layer_type(&self, surface: i32, depth: i32) -> BlockType {
        match depth {
            0 if surface <= self.sea_level => BlockType::SAND,
            0 => BlockType::GRASS,
            d if d <= DIRT_DEPTH => BlockType::DIRT,
            _ => BlockType::STONE,
        }
    }

    fn is_cave(&self, wx: i32, wy: i32, wz: i32) -> bool {
        let sample = self.perlin.get([
            wx as f64 * CAVE_SCALE_FACTOR,
            wy as f64 * CAVE_SCALE_FACTOR,
            wz as f64 * CAVE_SCALE_FACTOR,
        ]);
        (-CAVE_THRESHOLD..CAVE_THRESHOLD).contains(&sample)
    }

    fn checkerboard(position: ChunkCoord) -> Chunk {
        let mut chunk = Chunk::empty(position);
        for z in 0..CHUNK_DIMENSION as usize {
            for y in 0..CHUNK_DIMENSION as usize {
                for x in 0..CHUNK_DIMENSION as usize {
                    if (x + y + z) % 2 == 0 {
                        chunk.set(x, y, z, Block::new(BlockType::STONE));
                    }
                }
            }
        }
        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::CHUNK_SIZE;

    #[test]
    fn test_generation_is_deterministic() {
        let generator = ChunkGenerator::new(GenerationMethod::Perlin, 7, 20);
        let position = ChunkCoord::new(3, 16, -2);
        let a = generator.generate(position);
        let b = generator.generate(position);
        for z in 0..16 {
            for y in 0..16 {
                for x in 0..16 {
                    assert_eq!(a.get(x, y, z), b.get(x, y, z));
                }
            }
        }
    }

    #[test]
    fn test_flat_world_layers() {
        let generator = ChunkGenerator::new(GenerationMethod::Flat, 0, 0);
        let chunk = generator.generate(ChunkCoord::new(0, 16, 0));
        // TERRAIN_BASE_HEIGHT = 24: world y 23 is grass, y 20..23 dirt, below stone.
        assert_eq!(chunk.get(0, 7, 0).kind(), BlockType::GRASS);
        assert_eq!(chunk.get(0, 6, 0).kind(), BlockType::DIRT);
        assert_eq!(chunk.get(0, 3, 0).kind(), BlockType::STONE);
        assert!(chunk.get(0, 8, 0).is_air());
        assert_eq!(chunk.get(0, 8, 0).light(), MAX_LIGHT);
    }

    #[test]
    fn test_air_below_sea_level_is_water() {
        let generator = ChunkGenerator::new(GenerationMethod::Flat, 0, 30);
        let chunk = generator.generate(ChunkCoord::new(0, 16, 0));
        assert_eq!(chunk.get(0, 9, 0).kind(), BlockType::WATER);
        assert!(chunk.get(0, 14, 0).is_air());
    }

    #[test]
    fn test_checkerboard_is_half_full() {
        let generator = ChunkGenerator::new(GenerationMethod::Checkerboard, 0, 0);
        let chunk = generator.generate(ChunkCoord::default());
        assert_eq!(chunk.solid_count(), CHUNK_SIZE / 2);
    }
}
