//! End-to-end runs of the threaded pipeline.

use std::time::Duration;

use cgmath::Point3;
use voxel_mesh_pipeline::{
    engine_state::{
        rendering::meshing::mesh::{mesh_chunk, BoundaryPolicy},
        task_management::worker::ShutdownMode,
        voxels::{
            block::{block_type::BlockType, Block},
            chunk::{chunk_creation::GenerationMethod, ChunkCoord},
        },
    },
    EngineConfig, EngineError, EngineState,
};

fn config(boundary_policy: BoundaryPolicy) -> EngineConfig {
    EngineConfig {
        render_distance: 1,
        world_height: 48,
        mesh_workers: 2,
        chunk_workers: 2,
        channel_capacity: 4,
        retry_interval_ms: 1,
        generation: GenerationMethod::Perlin,
        seed: 1234,
        boundary_policy,
        viewer: ChunkCoord::new(0, 16, 0),
        ..Default::default()
    }
}

fn settle(engine_state: &mut EngineState) {
    while engine_state
        .wait_for_completed_tasks(Duration::from_millis(300))
        .unwrap()
        > 0
    {}
    assert_eq!(engine_state.pending_generation(), 0);
}

/// Every installed mesh matches a fresh mesh of the chunk's current snapshot.
fn assert_meshes_current(engine_state: &EngineState, policy: BoundaryPolicy) {
    for coords in engine_state.world().loaded_coords() {
        let request = engine_state.world().mesh_request(coords).unwrap();
        let expected = mesh_chunk(&request, policy);
        match engine_state.mesh_store().get(coords) {
            Some(mesh) => {
                assert!(expected.is_visible(), "{coords} should have no mesh");
                assert_eq!(mesh.opaque, expected.opaque(), "{coords}");
                assert_eq!(mesh.translucent, expected.translucent(), "{coords}");
            }
            None => assert!(!expected.is_visible(), "{coords} has no mesh"),
        }
    }
}

#[test]
fn test_pipeline_converges_to_current_meshes() {
    for policy in [BoundaryPolicy::Hidden, BoundaryPolicy::Exposed] {
        let mut engine_state = EngineState::new(config(policy)).unwrap();
        engine_state.load_around_viewer().unwrap();
        settle(&mut engine_state);

        // 3 × 3 columns of three layers each.
        assert_eq!(engine_state.world().len(), 27);
        assert!(engine_state.mesh_store().quad_count() > 0);
        assert_meshes_current(&engine_state, policy);

        let stats = engine_state.shutdown().unwrap();
        assert_eq!(stats.len(), 4);
        assert_eq!(
            stats.iter().filter(|s| s.name.starts_with("chunk-gen")).map(|s| s.processed).sum::<usize>(),
            27
        );
    }
}

#[test]
fn test_default_policies_converge_after_edits() {
    // Only sizes and terrain differ from the defaults.
    let config = EngineConfig {
        render_distance: 1,
        world_height: 48,
        generation: GenerationMethod::Perlin,
        seed: 99,
        viewer: ChunkCoord::new(0, 16, 0),
        ..Default::default()
    };
    let defaults = EngineConfig::default();
    assert_eq!(config.boundary_policy, defaults.boundary_policy);
    assert_eq!(config.duplicate_policy, defaults.duplicate_policy);
    assert_eq!(config.shutdown_mode, defaults.shutdown_mode);

    let mut engine_state = EngineState::new(config).unwrap();
    engine_state.load_around_viewer().unwrap();
    // Edit the viewer chunk as soon as it arrives, while the other chunks and
    // their neighbor re-meshes are still in flight.
    let center = ChunkCoord::new(0, 16, 0);
    while !engine_state.world().is_loaded(center) {
        engine_state
            .wait_for_completed_tasks(Duration::from_millis(100))
            .unwrap();
    }
    for x in 0..16 {
        engine_state
            .set_block(Point3::new(x, 16, 15), Block::new(BlockType::GLASS))
            .unwrap();
    }
    settle(&mut engine_state);

    assert_eq!(engine_state.world().len(), 27);
    assert_meshes_current(&engine_state, defaults.boundary_policy);
    engine_state.shutdown().unwrap();
}

#[test]
fn test_edit_remeshes_owner_and_neighbor() {
    let policy = BoundaryPolicy::Hidden;
    let mut engine_state = EngineState::new(config(policy)).unwrap();
    engine_state.load_around_viewer().unwrap();
    settle(&mut engine_state);

    // A block on the border between chunk (0, 16, 0) and its west neighbor.
    let position = Point3::new(0, 20, 5);
    let invalidated = engine_state
        .set_block(position, Block::new(BlockType::GLASS))
        .unwrap();
    assert_eq!(invalidated[0], ChunkCoord::new(0, 16, 0));
    assert!(invalidated.contains(&ChunkCoord::new(-1, 16, 0)));
    assert_eq!(engine_state.get_block(position).kind(), BlockType::GLASS);

    settle(&mut engine_state);
    assert_meshes_current(&engine_state, policy);
    engine_state.shutdown().unwrap();
}

#[test]
fn test_viewer_walk_keeps_render_distance() {
    let policy = BoundaryPolicy::Hidden;
    let mut engine_state = EngineState::new(config(policy)).unwrap();
    engine_state.load_around_viewer().unwrap();

    // Move before the first load settles; stale responses must be dropped.
    for x in 1..=3 {
        engine_state
            .update_viewer(ChunkCoord::new(x, 16, 0))
            .unwrap();
        engine_state.process_completed_tasks().unwrap();
    }
    settle(&mut engine_state);

    let viewer = engine_state.viewer();
    let loaded = engine_state.world().loaded_coords();
    assert_eq!(loaded.len(), 27);
    assert!(loaded.iter().all(|c| c.chebyshev_distance(&viewer) <= 1));
    assert!(engine_state
        .mesh_store()
        .iter()
        .all(|mesh| mesh.coords.chebyshev_distance(&viewer) <= 1));
    assert_meshes_current(&engine_state, policy);
    engine_state.shutdown().unwrap();
}

#[test]
fn test_drain_shutdown_finishes_queued_work() {
    let config = EngineConfig {
        shutdown_mode: ShutdownMode::Drain,
        ..config(BoundaryPolicy::Hidden)
    };
    let mut engine_state = EngineState::new(config).unwrap();
    assert_eq!(engine_state.load_around_viewer().unwrap(), 27);

    let stats = engine_state.shutdown().unwrap();
    let generated: usize = stats
        .iter()
        .filter(|s| s.name.starts_with("chunk-gen"))
        .map(|s| s.processed)
        .sum();
    assert_eq!(generated, 27);
    assert!(stats.iter().all(|s| s.discarded == 0));
}

#[test]
fn test_config_file_round_trip() {
    let path = std::env::temp_dir().join(format!("voxel-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "render_distance": 2, "boundary_policy": "exposed" }"#).unwrap();

    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.render_distance, 2);
    assert_eq!(config.boundary_policy, BoundaryPolicy::Exposed);
    std::fs::remove_file(&path).unwrap();

    std::fs::write(&path, r#"{ "world_height": 0 }"#).unwrap();
    assert!(matches!(EngineConfig::load(&path), Err(EngineError::Config(_))));
    std::fs::remove_file(&path).unwrap();
}
