//! Mesh generation for voxel chunks.
//!
//! This module converts chunk snapshots into quad lists. It extracts one face
//! layer at a time, merges each layer greedily, and lifts the merged
//! rectangles back into chunk space.
//!
//! # Architecture
//! - [`FaceLayer`]: the visible faces of one 16×16 slice in one direction
//! - [`Quad2D`] / [`Quad3D`]: merged rectangles in layer and chunk space
//! - [`mesh_chunk`]: the whole pipeline for one chunk
//!
//! # Usage
//! ```ignore
//! use crate::engine_state::rendering::meshing::mesh::{mesh_chunk, BoundaryPolicy};
//!
//! let request = world.mesh_request(coords).unwrap();
//! let result = mesh_chunk(&request, BoundaryPolicy::Hidden);
//! println!("{} opaque quads", result.opaque().len());
//! ```

mod face;
mod greedy;
mod mesh;
mod quad;

pub use face::{extract_layer, is_face_visible, layer_axes, BoundaryPolicy, FaceLayer, LayerCell};
pub use greedy::{greedy_merge, is_mergeable, lift, mesh_layer};
pub use mesh::mesh_chunk;
pub use quad::{Quad2D, Quad3D};
