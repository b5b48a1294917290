//! # Messages
//!
//! The typed messages that travel between the main thread and the workers.
//! Every message has a `Topic`; the dispatcher routes on the topic alone.
//! Payloads are owned values that move through the channel: a generated chunk
//! is boxed, a mesh request carries `Arc` snapshots, a mesh result owns its
//! quads.

use std::fmt;

use crate::engine_state::{
    rendering::tasks::chunk_mesh_generation_task::{MeshRequest, MeshResult},
    voxels::chunk::{Chunk, ChunkCoord},
};

/// The named message kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Main → worker: generate the chunk at some coordinates
    ChunkGenRequest,
    /// Worker → main: a generated chunk
    ChunkGenResponse,
    /// Main → worker: mesh a chunk snapshot
    MeshGenRequest,
    /// Worker → main: a finished mesh
    MeshGenResponse,
    /// Main → every worker: the viewer entered another chunk
    PlayerMovedChunks,
    /// Main → every worker: shut down
    Exit,
}

impl Topic {
    /// The wire name of the topic.
    pub fn name(self) -> &'static str {
        match self {
            Topic::ChunkGenRequest => "CHUNK_GEN_REQUEST",
            Topic::ChunkGenResponse => "CHUNK_GEN_RESPONSE",
            Topic::MeshGenRequest => "MESH_GEN_REQUEST",
            Topic::MeshGenResponse => "MESH_GEN_RESPONSE",
            Topic::PlayerMovedChunks => "EVENT_PLAYER_MOVED_CHUNKS",
            Topic::Exit => "EXIT",
        }
    }

    /// Requests go to exactly one subscriber.
    pub fn is_request(self) -> bool {
        matches!(self, Topic::ChunkGenRequest | Topic::MeshGenRequest)
    }

    /// Events go to every subscriber.
    pub fn is_event(self) -> bool {
        matches!(self, Topic::PlayerMovedChunks | Topic::Exit)
    }

    /// Responses flow back to the main thread.
    pub fn is_response(self) -> bool {
        matches!(self, Topic::ChunkGenResponse | Topic::MeshGenResponse)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A message on the dispatcher channel.
pub enum Message {
    /// Generate the chunk at `coords`. `urgent` requests skip the distance order.
    ChunkGenRequest { coords: ChunkCoord, urgent: bool },
    /// A freshly generated chunk.
    ChunkGenResponse(Box<Chunk>),
    /// Mesh the snapshot in `request`. `urgent` requests skip the distance order.
    MeshGenRequest { request: MeshRequest, urgent: bool },
    /// A finished mesh.
    MeshGenResponse(MeshResult),
    /// The viewer is now in this chunk.
    PlayerMovedChunks(ChunkCoord),
    /// Stop the receiving worker.
    Exit,
}

impl Message {
    pub fn topic(&self) -> Topic {
        match self {
            Message::ChunkGenRequest { .. } => Topic::ChunkGenRequest,
            Message::ChunkGenResponse(_) => Topic::ChunkGenResponse,
            Message::MeshGenRequest { .. } => Topic::MeshGenRequest,
            Message::MeshGenResponse(_) => Topic::MeshGenResponse,
            Message::PlayerMovedChunks(_) => Topic::PlayerMovedChunks,
            Message::Exit => Topic::Exit,
        }
    }

    /// The chunk a message is about, if any.
    pub fn coords(&self) -> Option<ChunkCoord> {
        match self {
            Message::ChunkGenRequest { coords, .. } => Some(*coords),
            Message::ChunkGenResponse(chunk) => Some(chunk.position()),
            Message::MeshGenRequest { request, .. } => Some(request.coords()),
            Message::MeshGenResponse(result) => Some(result.coords()),
            Message::PlayerMovedChunks(_) | Message::Exit => None,
        }
    }

    /// A copy of an event message for broadcasting. `None` for every other
    /// topic, whose payloads are owned by a single receiver.
    pub fn duplicate_event(&self) -> Option<Message> {
        match self {
            Message::PlayerMovedChunks(coords) => Some(Message::PlayerMovedChunks(*coords)),
            Message::Exit => Some(Message::Exit),
            _ => None,
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.coords() {
            Some(coords) => write!(f, "{}({})", self.topic(), coords),
            None => match self {
                Message::PlayerMovedChunks(coords) => write!(f, "{}({})", self.topic(), coords),
                _ => write!(f, "{}", self.topic()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_classes_are_disjoint() {
        let topics = [
            Topic::ChunkGenRequest,
            Topic::ChunkGenResponse,
            Topic::MeshGenRequest,
            Topic::MeshGenResponse,
            Topic::PlayerMovedChunks,
            Topic::Exit,
        ];
        for topic in topics {
            let classes = [topic.is_request(), topic.is_event(), topic.is_response()];
            assert_eq!(classes.iter().filter(|c| **c).count(), 1, "{topic}");
        }
    }

    #[test]
    fn test_only_events_duplicate() {
        let coords = ChunkCoord::new(1, 16, 2);
        assert!(Message::PlayerMovedChunks(coords).duplicate_event().is_some());
        assert!(Message::Exit.duplicate_event().is_some());
        let request = Message::ChunkGenRequest { coords, urgent: false };
        assert!(request.duplicate_event().is_none());
        assert_eq!(request.coords(), Some(coords));
        assert_eq!(format!("{:?}", request), "CHUNK_GEN_REQUEST((1, 16, 2))");
    }
}
