//! Face layer extraction.
//!
//! A face layer is the 16×16 slice of a chunk perpendicular to one face
//! direction, holding the cells whose face in that direction is visible. The
//! greedy mesher works on one layer at a time.
//!
//! For a face along axis `d` the layer axes are `u = (d + 1) % 3` and
//! `v = (d + 2) % 3`; layer cell `(i, j)` is the chunk cell with
//! `pos[d] = layer`, `pos[u] = i`, `pos[v] = j`.

use serde::{Deserialize, Serialize};

use crate::engine_state::{
    rendering::tasks::chunk_mesh_generation_task::MeshRequest,
    voxels::{
        block::{block_side::BlockSide, Block, MAX_LIGHT},
        chunk::{CHUNK_DIMENSION_USIZE, CHUNK_PLANE_SIZE},
    },
};

/// How faces on a chunk border are treated when the neighbor chunk is not
/// loaded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// The whole border layer is empty; nothing is drawn against unknown data.
    #[default]
    Hidden,
    /// The unknown neighbor is air at full light; border faces are drawn.
    Exposed,
}

/// One cell of a face layer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerCell {
    /// The block owning the face, `Block::AIR` when there is no face
    pub block: Block,
    /// Light of the cell the face looks into
    pub light: u8,
}

impl LayerCell {
    pub const EMPTY: LayerCell = LayerCell {
        block: Block::AIR,
        light: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.block.is_air()
    }
}

/// The visible faces of one chunk slice in one direction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceLayer {
    side: BlockSide,
    layer: usize,
    cells: Vec<LayerCell>,
}

impl FaceLayer {
    /// Creates a layer without faces.
    pub fn empty(side: BlockSide, layer: usize) -> Self {
        assert!(layer < CHUNK_DIMENSION_USIZE, "layer {layer} out of range");
        FaceLayer {
            side,
            layer,
            cells: vec![LayerCell::EMPTY; CHUNK_PLANE_SIZE],
        }
    }

    pub fn side(&self) -> BlockSide {
        self.side
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    fn index(i: usize, j: usize) -> usize {
        assert!(
            i < CHUNK_DIMENSION_USIZE && j < CHUNK_DIMENSION_USIZE,
            "layer cell ({i}, {j}) out of range"
        );
        i + CHUNK_DIMENSION_USIZE * j
    }

    pub fn get(&self, i: usize, j: usize) -> LayerCell {
        self.cells[Self::index(i, j)]
    }

    pub fn set(&mut self, i: usize, j: usize, cell: LayerCell) {
        self.cells[Self::index(i, j)] = cell;
    }

    /// Whether no cell of the layer holds a face.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(LayerCell::is_empty)
    }

    /// Number of cells holding a face.
    pub fn face_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }
}

/// The layer axes `(u, v)` for a face normal along `axis`.
pub fn layer_axes(axis: usize) -> (usize, usize) {
    ((axis + 1) % 3, (axis + 2) % 3)
}

/// Whether the face of `current` toward `neighbor` can be seen.
///
/// Faces between two liquid cells are suppressed while a solid cell next to a
/// liquid keeps its face.
pub fn is_face_visible(current: Block, neighbor: Block) -> bool {
    neighbor.is_air()
        || (neighbor.is_translucent() && !current.is_liquid())
        || (neighbor.is_translucent() && !current.is_translucent())
}

/// Extracts the visible faces of `layer` in direction `side`.
///
/// # Arguments
/// * `request` - The chunk snapshot and its neighbor snapshots
/// * `side` - The face direction
/// * `layer` - Index of the slice along the side's axis
/// * `policy` - What to do when the border layer looks into a missing chunk
///
/// # Returns
/// A `FaceLayer` where every non-empty cell is a visible face.
pub fn extract_layer(
    request: &MeshRequest,
    side: BlockSide,
    layer: usize,
    policy: BoundaryPolicy,
) -> FaceLayer {
    let mut face_layer = FaceLayer::empty(side, layer);
    let axis = side.axis();
    let (u, v) = layer_axes(axis);

    let neighbor_layer = layer as i32 + side.sign();
    let inside = (0..CHUNK_DIMENSION_USIZE as i32).contains(&neighbor_layer);
    let neighbor_chunk = if inside {
        Some(request.chunk())
    } else {
        match (request.neighbor(side), policy) {
            (Some(chunk), _) => Some(&**chunk),
            (None, BoundaryPolicy::Hidden) => return face_layer,
            (None, BoundaryPolicy::Exposed) => None,
        }
    };
    let neighbor_index = neighbor_layer.rem_euclid(CHUNK_DIMENSION_USIZE as i32) as usize;
    let chunk = request.chunk();

    for j in 0..CHUNK_DIMENSION_USIZE {
        for i in 0..CHUNK_DIMENSION_USIZE {
            let mut position = [0; 3];
            position[axis] = layer;
            position[u] = i;
            position[v] = j;

            let current = chunk.get_at(position);
            if current.is_air() {
                continue;
            }

            position[axis] = neighbor_index;
            let neighbor = match neighbor_chunk {
                Some(neighbor_chunk) => neighbor_chunk.get_at(position),
                None => Block::AIR.with_light(MAX_LIGHT),
            };

            if is_face_visible(current, neighbor) {
                face_layer.set(
                    i,
                    j,
                    LayerCell {
                        block: current,
                        light: neighbor.light(),
                    },
                );
            }
        }
    }

    face_layer
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine_state::voxels::{
        block::block_type::BlockType,
        chunk::{Chunk, ChunkCoord},
    };

    fn block(block_type: BlockType) -> Block {
        Block::new(block_type)
    }

    fn request(chunk: Chunk, neighbors: [Option<Arc<Chunk>>; 6]) -> MeshRequest {
        MeshRequest::new(chunk.position(), Arc::new(chunk), neighbors)
    }

    #[test]
    fn test_visibility_rule() {
        let stone = block(BlockType::STONE);
        let glass = block(BlockType::GLASS);
        let water = block(BlockType::WATER);

        assert!(is_face_visible(stone, Block::AIR));
        assert!(!is_face_visible(stone, stone));
        assert!(is_face_visible(stone, water));
        assert!(is_face_visible(stone, glass));
        assert!(!is_face_visible(water, water));
        assert!(is_face_visible(water, Block::AIR));
        assert!(is_face_visible(glass, glass));
        assert!(is_face_visible(glass, water));
        assert!(!is_face_visible(water, glass));
    }

    #[test]
    fn test_layer_axes_cycle() {
        assert_eq!(layer_axes(0), (1, 2));
        assert_eq!(layer_axes(1), (2, 0));
        assert_eq!(layer_axes(2), (0, 1));
    }

    #[test]
    fn test_interior_face_takes_neighbor_light() {
        let coords = ChunkCoord::new(0, 0, 0);
        let mut chunk = Chunk::empty(coords);
        chunk.set(4, 5, 6, block(BlockType::DIRT));
        chunk.set(4, 6, 6, Block::AIR.with_light(9));
        let request = request(chunk, Default::default());

        let up = extract_layer(&request, BlockSide::UP, 5, BoundaryPolicy::Hidden);
        // UP is axis 1, so u = z and v = x.
        assert_eq!(up.face_count(), 1);
        let cell = up.get(6, 4);
        assert_eq!(cell.block.kind(), BlockType::DIRT);
        assert_eq!(cell.light, 9);

        let down = extract_layer(&request, BlockSide::DOWN, 5, BoundaryPolicy::Hidden);
        assert_eq!(down.face_count(), 1);
        assert!(extract_layer(&request, BlockSide::UP, 4, BoundaryPolicy::Hidden).is_empty());
    }

    #[test]
    fn test_missing_neighbor_follows_policy() {
        let coords = ChunkCoord::new(0, 0, 0);
        let request = request(Chunk::filled(coords, block(BlockType::STONE)), Default::default());

        let hidden = extract_layer(&request, BlockSide::EAST, 15, BoundaryPolicy::Hidden);
        assert!(hidden.is_empty());

        let exposed = extract_layer(&request, BlockSide::EAST, 15, BoundaryPolicy::Exposed);
        assert_eq!(exposed.face_count(), CHUNK_PLANE_SIZE);
        assert_eq!(exposed.get(3, 3).light, MAX_LIGHT);
    }

    #[test]
    fn test_neighbor_snapshot_is_read_across_border() {
        let coords = ChunkCoord::new(0, 0, 0);
        let mut neighbor = Chunk::filled(coords.neighbor(BlockSide::WEST), block(BlockType::STONE));
        neighbor.set(15, 2, 3, Block::AIR);

        let mut neighbors: [Option<Arc<Chunk>>; 6] = Default::default();
        neighbors[BlockSide::WEST as usize] = Some(Arc::new(neighbor));
        let request = request(Chunk::filled(coords, block(BlockType::SAND)), neighbors);

        let west = extract_layer(&request, BlockSide::WEST, 0, BoundaryPolicy::Hidden);
        // WEST is axis 0, so u = y and v = z.
        assert_eq!(west.face_count(), 1);
        assert_eq!(west.get(2, 3).block.kind(), BlockType::SAND);
    }

    #[test]
    #[should_panic]
    fn test_layer_out_of_range_panics() {
        FaceLayer::empty(BlockSide::UP, 16);
    }
}
