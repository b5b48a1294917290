//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which generates chunk data on
//! a worker thread. Requests are scheduled as the viewer moves through the
//! world; the generated chunk travels back to the main thread, which inserts it
//! into the `World` and schedules its mesh.

use log::trace;

use crate::engine_state::{
    task_management::{
        message::{Message, Topic},
        task::{Submission, Task},
    },
    voxels::chunk::{chunk_creation::ChunkGenerator, ChunkCoord},
};

/// A task that generates chunk data asynchronously.
pub struct ChunkGenerationTask {
    /// The generator, owned by this worker
    generator: ChunkGenerator,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `generator` - The generator this worker uses for every chunk
    pub fn new(generator: ChunkGenerator) -> Self {
        ChunkGenerationTask { generator }
    }
}

impl Task for ChunkGenerationTask {
    type Request = ();

    fn request_topic(&self) -> Topic {
        Topic::ChunkGenRequest
    }

    fn unpack(&self, message: Message) -> Result<Submission<()>, Message> {
        match message {
            Message::ChunkGenRequest { coords, urgent } => Ok(Submission {
                coords,
                request: (),
                urgent,
            }),
            other => Err(other),
        }
    }

    /// Generates the chunk at `coords` and returns it as a response.
    fn process(&mut self, coords: ChunkCoord, _request: ()) -> Message {
        let chunk = self.generator.generate(coords);
        trace!("Generated {} with {} solid blocks", coords, chunk.solid_count());
        Message::ChunkGenResponse(Box::new(chunk))
    }
}
