//! Mesh generation and management for voxel rendering.
//!
//! This module owns the finished meshes of every chunk and the algorithms that
//! produce them.
//!
//! # Architecture
//! - `MeshStore`: the installer; the only writer of finished meshes
//! - `ChunkMesh`: the opaque and translucent quads of one chunk
//! - `mesh/`: face extraction and greedy meshing
//!
//! Meshes arrive from worker threads as `MeshResult`s and are installed on the
//! main thread. A reader may look up any chunk at any time; a chunk that has
//! not been meshed yet, or whose mesh was not visible, simply has no entry.

use std::collections::HashMap;

use log::trace;

pub mod mesh;

use mesh::Quad3D;

use crate::engine_state::{
    rendering::{tasks::chunk_mesh_generation_task::MeshResult, vertex::QuadRecord},
    voxels::chunk::ChunkCoord,
};

/// The installed mesh of one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkMesh {
    pub coords: ChunkCoord,
    pub opaque: Vec<Quad3D>,
    pub translucent: Vec<Quad3D>,
}

impl ChunkMesh {
    pub fn quad_count(&self) -> usize {
        self.opaque.len() + self.translucent.len()
    }
}

/// Installed meshes keyed by chunk coordinates.
#[derive(Debug, Default)]
pub struct MeshStore {
    meshes: HashMap<ChunkCoord, ChunkMesh>,
}

impl MeshStore {
    pub fn new() -> Self {
        MeshStore::default()
    }

    /// Installs a mesh result, replacing the chunk's previous mesh.
    ///
    /// A result that is not visible removes the chunk's entry instead.
    ///
    /// # Returns
    /// The mesh that was replaced, if any.
    pub fn install(&mut self, result: MeshResult) -> Option<ChunkMesh> {
        let coords = result.coords();
        if !result.is_visible() {
            trace!("Chunk {} is fully occluded", coords);
            return self.meshes.remove(&coords);
        }

        let (opaque, translucent) = result.into_quads();
        self.meshes.insert(
            coords,
            ChunkMesh {
                coords,
                opaque,
                translucent,
            },
        )
    }

    pub fn remove(&mut self, coords: ChunkCoord) -> Option<ChunkMesh> {
        self.meshes.remove(&coords)
    }

    pub fn get(&self, coords: ChunkCoord) -> Option<&ChunkMesh> {
        self.meshes.get(&coords)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChunkMesh> {
        self.meshes.values()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Total number of installed quads.
    pub fn quad_count(&self) -> usize {
        self.meshes.values().map(ChunkMesh::quad_count).sum()
    }

    /// Packed opaque quads of a chunk, ready for upload.
    pub fn packed_opaque(&self, coords: ChunkCoord) -> Vec<QuadRecord> {
        self.get(coords)
            .map(|mesh| mesh.opaque.iter().map(Quad3D::to_record).collect())
            .unwrap_or_default()
    }

    /// Packed translucent quads of a chunk, ready for upload.
    pub fn packed_translucent(&self, coords: ChunkCoord) -> Vec<QuadRecord> {
        self.get(coords)
            .map(|mesh| mesh.translucent.iter().map(Quad3D::to_record).collect())
            .unwrap_or_default()
    }
}
