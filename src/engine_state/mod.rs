//! # Engine State Module
//!
//! The core engine module that owns the voxel world and drives the background
//! generation and meshing pipeline.
//!
//! ## Key Components
//!
//! * `EngineState` - The main-thread coordinator
//! * `config` - Engine settings loaded from JSON
//! * `rendering` - Meshing, the mesh store and packed quad records
//! * `task_management` - Dispatcher, worker loops and priority scheduling
//! * `voxels` - Blocks, chunks, terrain generation and the world
//!
//! ## Data Flow
//!
//! 1. The viewer enters a chunk; missing chunks in range are requested from the
//!    chunk generation workers and chunks out of range are unloaded
//! 2. Generated chunks come back, are inserted into the `World` and meshed
//!    together with their loaded neighbors
//! 3. Finished meshes come back and are installed into the `MeshStore`
//! 4. Block edits invalidate the owning chunk and any touched neighbor; their
//!    mesh requests take the workers' fast lane
//!
//! The main thread is the only owner of live chunk data. Workers see `Arc`
//! snapshots and reply with owned results.

use std::{collections::HashSet, time::Duration};

use cgmath::Point3;
use log::{debug, info, warn};

use config::EngineConfig;
use error::EngineError;
use rendering::{
    meshing::MeshStore,
    tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask,
};
use task_management::{
    message::Message,
    worker::{WorkerSettings, WorkerStats},
    Dispatcher,
};
use voxels::{
    block::Block,
    chunk::{chunk_creation::ChunkGenerator, ChunkCoord},
    tasks::chunk_generation_task::ChunkGenerationTask,
    world::World,
};

pub mod config;
pub mod error;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The main state container for the voxel pipeline.
///
/// # Examples
///
/// ```ignore
/// let mut engine_state = EngineState::new(EngineConfig::default())?;
/// engine_state.load_around_viewer()?;
///
/// // Main loop
/// loop {
///     engine_state.process_completed_tasks()?;
///     // read engine_state.mesh_store() for rendering
/// }
/// ```
pub struct EngineState {
    config: EngineConfig,
    /// The voxel world containing all live chunk data
    world: World,
    /// Finished meshes, written only by `process_completed_tasks`
    mesh_store: MeshStore,
    dispatcher: Dispatcher,
    /// Chunk the viewer is in
    viewer: ChunkCoord,
    /// Chunks requested from the generation workers and not yet received
    pending_generation: HashSet<ChunkCoord>,
}

impl EngineState {
    /// Creates the engine and spawns its worker threads.
    ///
    /// # Errors
    /// Returns an error if the config is invalid or a thread cannot be spawned.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let settings = WorkerSettings {
            viewer: config.viewer,
            duplicate_policy: config.duplicate_policy,
            shutdown_mode: config.shutdown_mode,
        };
        let mut dispatcher = Dispatcher::new(config.channel_capacity, config.retry_interval());

        for index in 0..config.chunk_workers {
            let generator = ChunkGenerator::new(config.generation, config.seed, config.sea_level);
            dispatcher.spawn_worker(
                &format!("chunk-gen-{index}"),
                ChunkGenerationTask::new(generator),
                settings,
            )?;
        }
        for index in 0..config.mesh_workers {
            dispatcher.spawn_worker(
                &format!("mesh-gen-{index}"),
                ChunkMeshGenerationTask::new(config.boundary_policy),
                settings,
            )?;
        }

        info!(
            "Engine started with {} chunk worker(s) and {} mesh worker(s)",
            config.chunk_workers, config.mesh_workers
        );

        Ok(EngineState {
            world: World::new(config.world_height),
            mesh_store: MeshStore::new(),
            dispatcher,
            viewer: config.viewer,
            pending_generation: HashSet::new(),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn mesh_store(&self) -> &MeshStore {
        &self.mesh_store
    }

    pub fn viewer(&self) -> ChunkCoord {
        self.viewer
    }

    /// Number of requested chunks that have not arrived yet.
    pub fn pending_generation(&self) -> usize {
        self.pending_generation.len()
    }

    /// Moves the viewer to another chunk.
    ///
    /// Workers are told to reorder their queues, chunks out of range are
    /// unloaded along with their meshes, and missing chunks in range are
    /// requested. Does nothing if the viewer is already in `viewer`.
    pub fn update_viewer(&mut self, viewer: ChunkCoord) -> Result<(), EngineError> {
        if viewer == self.viewer {
            return Ok(());
        }
        debug!("Viewer moved from {} to {}", self.viewer, viewer);
        self.viewer = viewer;
        self.dispatcher.publish(Message::PlayerMovedChunks(viewer))?;

        let render_distance = self.config.render_distance;
        let mut border = HashSet::new();
        for coords in self.world.unload_outside(viewer, render_distance) {
            self.mesh_store.remove(coords);
            border.extend(self.world.loaded_neighbors(coords));
        }
        // Chunks next to an unloaded one now have a missing neighbor.
        let mut border: Vec<ChunkCoord> = border.into_iter().collect();
        border.sort();
        for coords in border {
            self.request_mesh(coords, false)?;
        }
        self.pending_generation
            .retain(|coords| coords.chebyshev_distance(&viewer) <= render_distance);

        self.load_around_viewer()?;
        Ok(())
    }

    /// Requests every chunk within render distance that is neither loaded nor
    /// already requested, nearest first.
    ///
    /// # Returns
    /// The number of chunks requested.
    pub fn load_around_viewer(&mut self) -> Result<usize, EngineError> {
        let mut requested = 0;
        for coords in self.world.coords_within(self.viewer, self.config.render_distance) {
            if self.world.is_loaded(coords) || self.pending_generation.contains(&coords) {
                continue;
            }
            self.dispatcher.publish(Message::ChunkGenRequest {
                coords,
                urgent: false,
            })?;
            self.pending_generation.insert(coords);
            requested += 1;
        }
        if requested > 0 {
            debug!("Requested {} chunk(s) around {}", requested, self.viewer);
        }
        Ok(requested)
    }

    /// Edits one block and schedules urgent re-meshing of every chunk the edit
    /// invalidated.
    ///
    /// # Returns
    /// The invalidated chunk coordinates.
    ///
    /// # Errors
    /// `EngineError::OutOfWorld` or `EngineError::ChunkNotLoaded` if the block
    /// cannot be edited.
    pub fn set_block(&mut self, position: Point3<i32>, block: Block) -> Result<Vec<ChunkCoord>, EngineError> {
        let invalidated = self.world.set_block(position, block)?;
        for coords in invalidated.iter() {
            self.request_mesh(*coords, true)?;
        }
        Ok(invalidated)
    }

    /// Reads one block; positions that are not loaded read as air.
    pub fn get_block(&self, position: Point3<i32>) -> Block {
        self.world.get_block(position)
    }

    /// Handles every response that has already arrived.
    ///
    /// # Returns
    /// The number of responses handled.
    pub fn process_completed_tasks(&mut self) -> Result<usize, EngineError> {
        let mut handled = 0;
        while let Some(message) = self.dispatcher.try_receive() {
            self.handle_response(message)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Waits up to `timeout` for a first response, then handles it and every
    /// response behind it.
    pub fn wait_for_completed_tasks(&mut self, timeout: Duration) -> Result<usize, EngineError> {
        match self.dispatcher.receive_timeout(timeout) {
            Some(message) => {
                self.handle_response(message)?;
                Ok(1 + self.process_completed_tasks()?)
            }
            None => Ok(0),
        }
    }

    fn handle_response(&mut self, message: Message) -> Result<(), EngineError> {
        match message {
            Message::ChunkGenResponse(chunk) => {
                let coords = chunk.position();
                self.pending_generation.remove(&coords);

                if coords.chebyshev_distance(&self.viewer) > self.config.render_distance {
                    debug!("Dropping generated chunk {} outside render distance", coords);
                    return Ok(());
                }
                if self.world.is_loaded(coords) {
                    // Keep the live chunk and any edits made to it.
                    debug!("Dropping duplicate generated chunk {}", coords);
                    return Ok(());
                }

                self.world.insert_chunk(*chunk);
                self.request_mesh(coords, false)?;
                for neighbor in self.world.loaded_neighbors(coords) {
                    self.request_mesh(neighbor, false)?;
                }
            }
            Message::MeshGenResponse(result) => {
                if self.world.is_loaded(result.coords()) {
                    self.mesh_store.install(result);
                } else {
                    debug!("Dropping mesh of unloaded chunk {}", result.coords());
                }
            }
            other => warn!("Unexpected message on the response channel: {:?}", other),
        }
        Ok(())
    }

    /// Publishes a mesh request snapshot of a loaded chunk.
    fn request_mesh(&mut self, coords: ChunkCoord, urgent: bool) -> Result<(), EngineError> {
        if let Some(request) = self.world.mesh_request(coords) {
            self.dispatcher.publish(Message::MeshGenRequest { request, urgent })?;
        }
        Ok(())
    }

    /// Stops every worker and waits for them.
    ///
    /// # Returns
    /// The final counters of each worker.
    pub fn shutdown(self) -> Result<Vec<WorkerStats>, EngineError> {
        info!("Shutting down engine");
        let stats = self.dispatcher.shutdown()?;
        for worker in stats.iter() {
            info!(
                "{}: {} processed, {} deduplicated, {} discarded",
                worker.name, worker.processed, worker.deduplicated, worker.discarded
            );
        }
        Ok(stats)
    }
}
