//! Rendering-side data for the voxel engine.
//!
//! This module turns chunk snapshots into quad meshes on worker threads and
//! keeps the installed meshes in a form ready for vertex-buffer upload. Drawing
//! itself is left to the embedding application.

pub mod meshing;
pub mod tasks;
pub mod vertex;

pub use meshing::{ChunkMesh, MeshStore};
pub use vertex::QuadRecord;
