//! Task for generating mesh data for chunks in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask` which turns a
//! `MeshRequest` snapshot into a `MeshResult` on a worker thread. This keeps
//! the main thread responsive while greedy meshing runs.

use std::{fmt, sync::Arc};

use crate::engine_state::{
    rendering::meshing::mesh::{mesh_chunk, BoundaryPolicy, Quad3D},
    task_management::{
        message::{Message, Topic},
        task::{Submission, Task},
    },
    voxels::{
        block::block_side::BlockSide,
        chunk::{Chunk, ChunkCoord},
    },
};

/// A read-only snapshot of a chunk and its neighbors.
///
/// The snapshots are shared with the main thread through `Arc`. The main
/// thread copies a chunk before editing it while any request still holds it,
/// so the data seen here never changes.
#[derive(Clone)]
pub struct MeshRequest {
    coords: ChunkCoord,
    chunk: Arc<Chunk>,
    /// Indexed by `BlockSide as usize`
    neighbors: [Option<Arc<Chunk>>; 6],
}

impl MeshRequest {
    /// Creates a mesh request.
    ///
    /// # Arguments
    /// * `coords` - The coordinates of the chunk to mesh
    /// * `chunk` - The chunk snapshot
    /// * `neighbors` - Neighbor snapshots indexed by `BlockSide as usize`;
    ///   `None` where the neighbor is not loaded
    pub fn new(coords: ChunkCoord, chunk: Arc<Chunk>, neighbors: [Option<Arc<Chunk>>; 6]) -> Self {
        MeshRequest {
            coords,
            chunk,
            neighbors,
        }
    }

    pub fn coords(&self) -> ChunkCoord {
        self.coords
    }

    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    /// The neighbor snapshot across `side`, if it was loaded.
    pub fn neighbor(&self, side: BlockSide) -> Option<&Arc<Chunk>> {
        self.neighbors[side as usize].as_ref()
    }
}

impl fmt::Debug for MeshRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loaded = self.neighbors.iter().filter(|n| n.is_some()).count();
        f.debug_struct("MeshRequest")
            .field("coords", &self.coords)
            .field("solid_count", &self.chunk.solid_count())
            .field("neighbors", &loaded)
            .finish()
    }
}

/// A finished mesh on its way to the installer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeshResult {
    coords: ChunkCoord,
    visible: bool,
    opaque: Vec<Quad3D>,
    translucent: Vec<Quad3D>,
}

impl MeshResult {
    /// Creates a result. It is visible when it has at least one quad.
    pub fn new(coords: ChunkCoord, opaque: Vec<Quad3D>, translucent: Vec<Quad3D>) -> Self {
        MeshResult {
            coords,
            visible: !(opaque.is_empty() && translucent.is_empty()),
            opaque,
            translucent,
        }
    }

    pub fn coords(&self) -> ChunkCoord {
        self.coords
    }

    /// `false` when the chunk produced no geometry and can be skipped.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn opaque(&self) -> &[Quad3D] {
        &self.opaque
    }

    pub fn translucent(&self) -> &[Quad3D] {
        &self.translucent
    }

    /// Consumes the result, returning `(opaque, translucent)`.
    pub fn into_quads(self) -> (Vec<Quad3D>, Vec<Quad3D>) {
        (self.opaque, self.translucent)
    }
}

/// A task that meshes chunk snapshots on a worker thread.
pub struct ChunkMeshGenerationTask {
    /// Treatment of border faces next to chunks that are not loaded
    boundary_policy: BoundaryPolicy,
}

impl ChunkMeshGenerationTask {
    pub fn new(boundary_policy: BoundaryPolicy) -> Self {
        ChunkMeshGenerationTask { boundary_policy }
    }
}

impl Task for ChunkMeshGenerationTask {
    type Request = MeshRequest;

    fn request_topic(&self) -> Topic {
        Topic::MeshGenRequest
    }

    fn unpack(&self, message: Message) -> Result<Submission<MeshRequest>, Message> {
        match message {
            Message::MeshGenRequest { request, urgent } => Ok(Submission {
                coords: request.coords(),
                request,
                urgent,
            }),
            other => Err(other),
        }
    }

    /// Meshes the snapshot. The request, and with it the last reference to an
    /// outdated chunk snapshot, is dropped when this returns.
    fn process(&mut self, _coords: ChunkCoord, request: MeshRequest) -> Message {
        Message::MeshGenResponse(mesh_chunk(&request, self.boundary_policy))
    }
}
