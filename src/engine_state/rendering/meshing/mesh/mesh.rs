//! Full-chunk mesh generation.
//!
//! This module runs the face extractor and the greedy mesher over every layer
//! of a chunk snapshot and splits the output into the opaque and translucent
//! passes.

use log::{debug, trace};
use web_time::Instant;

use crate::engine_state::{
    rendering::tasks::chunk_mesh_generation_task::{MeshRequest, MeshResult},
    voxels::{block::block_side::BlockSide, chunk::CHUNK_DIMENSION_USIZE},
};

use super::{
    face::{extract_layer, BoundaryPolicy},
    greedy::mesh_layer,
    quad::Quad3D,
};

/// Generates the quads of every visible face of a chunk.
///
/// Sides are processed in `BlockSide::all()` order and layers from 0 to 15, so
/// the same snapshot always yields the same quad lists.
///
/// # Arguments
/// * `request` - The chunk snapshot with its neighbor snapshots
/// * `policy` - Treatment of border faces next to chunks that are not loaded
///
/// # Returns
/// A `MeshResult` with opaque and translucent quads. The result is not visible
/// when both lists are empty.
pub fn mesh_chunk(request: &MeshRequest, policy: BoundaryPolicy) -> MeshResult {
    let start = Instant::now();
    let mut quads: Vec<Quad3D> = Vec::new();

    if !request.chunk().is_empty() {
        for side in BlockSide::all() {
            for layer in 0..CHUNK_DIMENSION_USIZE {
                let face_layer = extract_layer(request, side, layer, policy);
                if face_layer.is_empty() {
                    continue;
                }
                let layer_quads = mesh_layer(&face_layer);
                trace!(
                    "{} {:?} layer {}: {} faces into {} quads",
                    request.coords(),
                    side,
                    layer,
                    face_layer.face_count(),
                    layer_quads.len()
                );
                quads.extend(layer_quads);
            }
        }
    }

    let (translucent, opaque): (Vec<Quad3D>, Vec<Quad3D>) =
        quads.into_iter().partition(Quad3D::is_translucent);

    debug!(
        "Meshed {} into {} opaque and {} translucent quads in {:?}",
        request.coords(),
        opaque.len(),
        translucent.len(),
        start.elapsed()
    );

    MeshResult::new(request.coords(), opaque, translucent)
}
