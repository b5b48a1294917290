#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Mesh Pipeline
//!
//! An asynchronous mesh-generation pipeline for chunked voxel worlds.
//!
//! The main thread owns the world. Worker threads generate terrain and turn
//! chunk snapshots into greedy-meshed quads, always serving the chunks nearest
//! the viewer first. Finished meshes are installed into a store whose quads can
//! be uploaded to a vertex buffer as packed records.
//!
//! ## Key Modules
//!
//! * `engine_state` - The engine coordinator and its subsystems
//! * `engine_state::voxels` - Blocks, chunks, terrain generation and the world
//! * `engine_state::rendering` - Face extraction, greedy meshing, mesh store
//! * `engine_state::task_management` - Dispatcher, workers and scheduling
//!
//! ## Usage
//!
//! ```ignore
//! fn main() {
//!     if let Err(error) = voxel_mesh_pipeline::run() {
//!         log::error!("{error}");
//!     }
//! }
//! ```

use std::time::Duration;

use cgmath::Point3;
use log::info;
use web_time::Instant;

pub mod engine_state;

pub use engine_state::{config::EngineConfig, error::EngineError, EngineState};

use engine_state::voxels::{block::Block, chunk::ChunkCoord};

/// Environment variable naming the config file when no argument is given.
pub const CONFIG_ENV_VAR: &str = "VOXEL_CONFIG";

/// How long the driver waits for further responses before calling the
/// pipeline idle.
const SETTLE_TIMEOUT: Duration = Duration::from_millis(250);

/// Chunks the driver moves the viewer along x.
const WALK_STEPS: i32 = 2;

/// Runs the headless pipeline driver.
///
/// Loads the world around the viewer, walks the viewer a few chunks, digs one
/// block and shuts down, logging what the pipeline produced at each step.
pub fn run() -> Result<(), EngineError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = load_config()?;
    let mut engine_state = EngineState::new(config)?;

    let start = Instant::now();
    engine_state.load_around_viewer()?;
    settle(&mut engine_state)?;
    report(&engine_state, "Initial load", start);

    let origin = engine_state.viewer();
    for step in 1..=WALK_STEPS {
        let start = Instant::now();
        engine_state.update_viewer(ChunkCoord::new(origin.x + step, origin.y, origin.z))?;
        settle(&mut engine_state)?;
        report(&engine_state, "Viewer moved", start);
    }

    if let Some(surface) = surface_block(&engine_state) {
        let start = Instant::now();
        let invalidated = engine_state.set_block(surface, Block::AIR)?;
        info!("Dug block at {:?}, {} chunk(s) invalidated", surface, invalidated.len());
        settle(&mut engine_state)?;
        report(&engine_state, "Edit", start);
    }

    engine_state.shutdown()?;
    Ok(())
}

/// Reads the config named by the first argument or `VOXEL_CONFIG`, falling
/// back to defaults.
fn load_config() -> Result<EngineConfig, EngineError> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok());
    match path {
        Some(path) => {
            info!("Loading config from {}", path);
            EngineConfig::load(path)
        }
        None => {
            info!("Using default config");
            Ok(EngineConfig::default())
        }
    }
}

/// Handles responses until none arrives for `SETTLE_TIMEOUT`.
fn settle(engine_state: &mut EngineState) -> Result<(), EngineError> {
    while engine_state.wait_for_completed_tasks(SETTLE_TIMEOUT)? > 0 {}
    Ok(())
}

/// The highest solid block in the column at the viewer chunk's origin.
fn surface_block(engine_state: &EngineState) -> Option<Point3<i32>> {
    let origin = engine_state.viewer().origin();
    (0..engine_state.world().world_height())
        .rev()
        .map(|y| Point3::new(origin.x, y, origin.z))
        .find(|position| !engine_state.get_block(*position).is_air())
}

fn report(engine_state: &EngineState, stage: &str, start: Instant) {
    let mesh_store = engine_state.mesh_store();
    info!(
        "{}: {} chunks loaded, {} meshes, {} quads in {:?}",
        stage,
        engine_state.world().len(),
        mesh_store.len(),
        mesh_store.quad_count(),
        start.elapsed()
    );
}
