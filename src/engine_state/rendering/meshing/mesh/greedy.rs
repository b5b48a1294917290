//! Greedy meshing implementation for voxel rendering.
//!
//! This module merges the visible faces of one face layer into as few
//! rectangles as its scan order allows, then lifts each rectangle back into
//! chunk space.
//!
//! # Scan order
//! - `i` is the outer loop, `j` the inner loop, both from 0 to 15
//! - From an unmerged start cell the quad first grows along `j` while the
//!   block type matches, fixing its height
//! - It then grows along `i` while the whole column range matches
//!
//! Merging compares block types only. A quad takes its lighting and metadata
//! from its start cell. Liquid cells are never merged because their surface
//! height differs per cell.

use bitvec::prelude::*;
use cgmath::Point3;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::{CHUNK_DIMENSION_USIZE, CHUNK_PLANE_SIZE},
};

use super::{
    face::{layer_axes, FaceLayer},
    quad::{Quad2D, Quad3D},
};

/// Merges the faces of a layer into quads.
///
/// # Arguments
/// * `layer` - The extracted face layer
///
/// # Returns
/// Non-overlapping quads covering exactly the non-empty cells of the layer, in
/// scan order.
pub fn greedy_merge(layer: &FaceLayer) -> Vec<Quad2D> {
    let mut merged = bitvec![0; CHUNK_PLANE_SIZE];
    let mut quads = Vec::new();
    let size = CHUNK_DIMENSION_USIZE;
    let index = |i: usize, j: usize| i + size * j;

    for i in 0..size {
        for j in 0..size {
            let start = layer.get(i, j);
            if start.is_empty() || merged[index(i, j)] {
                continue;
            }
            let block_type = start.block.kind();
            let mergeable = |i: usize, j: usize, merged: &BitVec| {
                !merged[index(i, j)] && layer.get(i, j).block.kind() == block_type
            };

            let (mut width, mut height) = (1, 1);
            if is_mergeable(block_type) {
                while j + height < size && mergeable(i, j + height, &merged) {
                    height += 1;
                }
                while i + width < size
                    && (j..j + height).all(|jj| mergeable(i + width, jj, &merged))
                {
                    width += 1;
                }
            }

            for di in 0..width {
                for dj in 0..height {
                    merged.set(index(i + di, j + dj), true);
                }
            }

            quads.push(Quad2D {
                block_type,
                u1: i as i32,
                v1: j as i32,
                u2: (i + width) as i32,
                v2: (j + height) as i32,
                light: start.light,
                metadata: start.block.liquid_level(),
            });
        }
    }

    quads
}

/// Places a layer quad into chunk space.
///
/// # Arguments
/// * `quad` - The merged layer quad
/// * `side` - The face direction of the layer
/// * `layer` - Index of the layer along the side's axis
///
/// # Panics
/// Panics if the resulting quad is not flat along exactly one axis.
pub fn lift(quad: &Quad2D, side: BlockSide, layer: usize) -> Quad3D {
    let axis = side.axis();
    let (u, v) = layer_axes(axis);
    let plane = layer as i32 + if side.is_positive() { 1 } else { 0 };

    let mut corner1 = [0; 3];
    let mut corner2 = [0; 3];
    corner1[axis] = plane;
    corner2[axis] = plane;
    corner1[u] = quad.u1;
    corner1[v] = quad.v1;
    corner2[u] = quad.u2;
    corner2[v] = quad.v2;

    if !side.is_positive() {
        std::mem::swap(&mut corner1[u], &mut corner2[u]);
    }

    let lifted = Quad3D {
        block_type: quad.block_type,
        corner1: Point3::new(corner1[0], corner1[1], corner1[2]),
        corner2: Point3::new(corner2[0], corner2[1], corner2[2]),
        normal: side.normal(),
        light: quad.light,
        metadata: quad.metadata,
    };
    assert_eq!(
        lifted.flat_axes(),
        1,
        "non-planar quad {:?} on {:?} layer {}",
        lifted,
        side,
        layer
    );
    lifted
}

/// Merges one layer and lifts every quad into chunk space.
pub fn mesh_layer(layer: &FaceLayer) -> Vec<Quad3D> {
    greedy_merge(layer)
        .iter()
        .map(|quad| lift(quad, layer.side(), layer.layer()))
        .collect()
}

/// Whether `block_type` cells may be merged with their neighbors.
pub fn is_mergeable(block_type: BlockType) -> bool {
    !block_type.is_liquid()
}
