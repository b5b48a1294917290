//! Error types for the mesh pipeline

use thiserror::Error;

use super::{task_management::message::Topic, voxels::chunk::ChunkCoord};

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Chunk {0} is not loaded")]
    ChunkNotLoaded(ChunkCoord),

    #[error("Position {0:?} is outside the world height range")]
    OutOfWorld([i32; 3]),

    #[error("Worker error: {0}")]
    Worker(String),
}

/// Failures of the dispatcher channel
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no worker subscribed to {0}")]
    NoSubscriber(Topic),

    #[error("channel for {0} disconnected")]
    Disconnected(Topic),
}
