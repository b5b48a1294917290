//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Files are JSON:
//!
//! ```text
//! {
//!     "render_distance": 4,
//!     "mesh_workers": 2,
//!     "generation": "flat",
//!     "boundary_policy": "exposed"
//! }
//! ```

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use super::{
    error::EngineError,
    rendering::meshing::mesh::BoundaryPolicy,
    task_management::{scheduler::DuplicatePolicy, worker::ShutdownMode},
    voxels::chunk::{chunk_creation::GenerationMethod, ChunkCoord, CHUNK_DIMENSION},
};

/// Radius of loaded chunks around the viewer, in chunks.
pub const DEFAULT_RENDER_DISTANCE: i32 = 3;
/// World height in blocks.
pub const DEFAULT_WORLD_HEIGHT: i32 = 64;
pub const DEFAULT_MESH_WORKERS: usize = 2;
pub const DEFAULT_CHUNK_WORKERS: usize = 1;
/// High-water mark of each worker channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
/// Sleep between attempts to send to a full channel.
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 10;
pub const DEFAULT_SEED: u32 = 0;
pub const DEFAULT_SEA_LEVEL: i32 = 20;

/// Settings of an `EngineState`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub render_distance: i32,
    pub world_height: i32,
    pub mesh_workers: usize,
    pub chunk_workers: usize,
    pub channel_capacity: usize,
    pub retry_interval_ms: u64,
    pub generation: GenerationMethod,
    pub seed: u32,
    pub sea_level: i32,
    pub boundary_policy: BoundaryPolicy,
    /// Defaults to `ReplaceData`. Neighbor re-meshes queued behind an older
    /// request for the same chunk would be lost under `KeepExisting`.
    pub duplicate_policy: DuplicatePolicy,
    pub shutdown_mode: ShutdownMode,
    /// Chunk the viewer starts in
    pub viewer: ChunkCoord,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            render_distance: DEFAULT_RENDER_DISTANCE,
            world_height: DEFAULT_WORLD_HEIGHT,
            mesh_workers: DEFAULT_MESH_WORKERS,
            chunk_workers: DEFAULT_CHUNK_WORKERS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            generation: GenerationMethod::default(),
            seed: DEFAULT_SEED,
            sea_level: DEFAULT_SEA_LEVEL,
            boundary_policy: BoundaryPolicy::default(),
            duplicate_policy: DuplicatePolicy::ReplaceData,
            shutdown_mode: ShutdownMode::default(),
            viewer: ChunkCoord::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a JSON config; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.mesh_workers == 0 || self.chunk_workers == 0 {
            return Err(EngineError::Config(
                "at least one mesh worker and one chunk worker are required".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(EngineError::Config("channel_capacity must be positive".to_string()));
        }
        if self.retry_interval_ms == 0 {
            return Err(EngineError::Config("retry_interval_ms must be positive".to_string()));
        }
        if self.world_height <= 0 || self.world_height % CHUNK_DIMENSION != 0 {
            return Err(EngineError::Config(format!(
                "world_height {} is not a positive multiple of {}",
                self.world_height, CHUNK_DIMENSION
            )));
        }
        if self.render_distance < 0 {
            return Err(EngineError::Config(format!(
                "render_distance {} is negative",
                self.render_distance
            )));
        }
        if self.viewer.y % CHUNK_DIMENSION != 0 {
            return Err(EngineError::Config(format!(
                "viewer height {} is not a chunk floor",
                self.viewer.y
            )));
        }
        Ok(())
    }
}
