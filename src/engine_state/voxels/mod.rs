//! # Voxel Data
//!
//! This module contains the voxel data of the engine: what a cell holds, how
//! cells are grouped into chunks, how chunks are generated, and the world that
//! owns them.
//!
//! ## Architecture
//!
//! * **Block**: Block types, per-cell metadata and the six faces
//! * **Chunk**: 16×16×16 cells plus a solid mask for O(1) emptiness checks
//! * **World**: Owns live chunks as `Arc` snapshots and applies edits
//! * **Tasks**: Chunk generation on worker threads
//!
//! ## Thread Safety
//!
//! Only the main thread mutates chunks. Workers receive `Arc<Chunk>` snapshots;
//! an edit to a chunk that is still shared copies it first.

pub mod block;
pub mod chunk;
pub mod tasks;
pub mod world;
