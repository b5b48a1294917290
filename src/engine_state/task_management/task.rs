//! # Task System Core Trait
//!
//! This module defines the seam between the generic worker loop and the kind
//! of work it performs.
//!
//! ## Task Lifecycle
//! 1. The main thread publishes a request message through the `Dispatcher`
//! 2. The worker subscribed to the request topic receives it and `unpack`s it
//!    into a `Submission`
//! 3. The submission waits in the worker's `PriorityScheduler`
//! 4. When dequeued, `process` runs on the worker thread and returns the
//!    response message
//! 5. The worker publishes the response back to the main thread
//!
//! ## Thread Safety
//! - A `Task` is moved onto its worker thread and never shared
//! - Requests must be `Send` to cross the channel; chunk data inside them is
//!   only reachable through immutable `Arc` snapshots

use super::message::{Message, Topic};
use crate::engine_state::voxels::chunk::ChunkCoord;

/// A request taken out of a message, ready to be queued.
#[derive(Debug)]
pub struct Submission<R> {
    /// The chunk the request is about; the scheduler's dedup key
    pub coords: ChunkCoord,
    /// The payload handed to `Task::process`
    pub request: R,
    /// Whether the request takes the scheduler's fast lane
    pub urgent: bool,
}

/// A kind of per-chunk work a worker loop can perform.
///
/// # Implementation Guidelines
/// - `process` must not block on other threads; it runs to completion once
///   started
/// - All state the task needs lives in `self` or in the request
pub trait Task: Send + 'static {
    /// The queued payload.
    type Request: Send + 'static;

    /// The topic this task consumes.
    fn request_topic(&self) -> Topic;

    /// Converts a request message into a submission.
    ///
    /// # Returns
    /// `Err(message)` if the message is not this task's request; the worker
    /// treats that as a malformed message.
    fn unpack(&self, message: Message) -> Result<Submission<Self::Request>, Message>;

    /// Performs the work for one chunk and returns the response message.
    fn process(&mut self, coords: ChunkCoord, request: Self::Request) -> Message;
}
