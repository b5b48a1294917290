//! # Worker Loop
//!
//! A worker owns one `Task`, one `PriorityScheduler` and the receiving end of
//! its dispatcher channel. The scheduler is local to the worker thread, so no
//! lock guards queue mutation; the channel serializes every producer.
//!
//! ## State Machine
//! `Idle → Processing → Idle`, and `Idle → Terminated` on `EXIT` or when the
//! dispatcher hangs up.
//!
//! Each iteration:
//! 1. If the queue is empty, block until one message arrives
//! 2. Drain every message already waiting, without blocking, so the queue
//!    order reflects the latest viewer position before work is committed
//! 3. Process exactly one request and publish its response
//!
//! A request is never interrupted once dequeued. What happens to requests still
//! queued at shutdown is decided by `ShutdownMode`.

use std::sync::{
    atomic::{AtomicU8, Ordering},
    mpsc::{Receiver, Sender, TryRecvError},
    Arc,
};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use web_time::Instant;

use super::{
    message::Message,
    scheduler::{DuplicatePolicy, PriorityScheduler},
    task::Task,
};
use crate::engine_state::voxels::chunk::ChunkCoord;

/// What a worker does with queued requests when told to exit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownMode {
    /// Discard queued requests; only the request in progress completes.
    #[default]
    Immediate,
    /// Process every queued request before terminating.
    Drain,
}

/// Observable state of a worker loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    Idle = 0,
    Processing = 1,
    Terminated = 2,
}

/// Shared view of a worker's state, readable from any thread.
#[derive(Clone, Debug, Default)]
pub struct WorkerStatus(Arc<AtomicU8>);

impl WorkerStatus {
    pub fn get(&self) -> WorkerState {
        match self.0.load(Ordering::Acquire) {
            0 => WorkerState::Idle,
            1 => WorkerState::Processing,
            _ => WorkerState::Terminated,
        }
    }

    fn set(&self, state: WorkerState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Per-worker scheduling settings.
#[derive(Copy, Clone, Debug)]
pub struct WorkerSettings {
    /// Viewer chunk the scheduler starts measuring from
    pub viewer: ChunkCoord,
    pub duplicate_policy: DuplicatePolicy,
    pub shutdown_mode: ShutdownMode,
}

/// Counters reported by a worker when it terminates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Name of the worker thread
    pub name: String,
    /// Requests processed to completion
    pub processed: usize,
    /// Requests dropped by the dedup guard
    pub deduplicated: usize,
    /// Requests still queued at an immediate shutdown
    pub discarded: usize,
}

enum Control {
    Continue,
    Exit,
}

/// A worker loop around one task.
pub struct Worker<T: Task> {
    task: T,
    scheduler: PriorityScheduler<T::Request>,
    inbox: Receiver<Message>,
    outbox: Sender<Message>,
    shutdown_mode: ShutdownMode,
    status: WorkerStatus,
    stats: WorkerStats,
}

impl<T: Task> Worker<T> {
    /// Creates a worker reading `inbox` and publishing responses to `outbox`.
    pub fn new(
        name: impl Into<String>,
        task: T,
        inbox: Receiver<Message>,
        outbox: Sender<Message>,
        settings: WorkerSettings,
    ) -> Self {
        Worker {
            task,
            scheduler: PriorityScheduler::new(settings.viewer, settings.duplicate_policy),
            inbox,
            outbox,
            shutdown_mode: settings.shutdown_mode,
            status: WorkerStatus::default(),
            stats: WorkerStats {
                name: name.into(),
                ..Default::default()
            },
        }
    }

    /// A handle that keeps reporting the state after the worker moves to
    /// its thread.
    pub fn status(&self) -> WorkerStatus {
        self.status.clone()
    }

    /// Runs the loop until the worker terminates.
    pub fn run(mut self) -> WorkerStats {
        info!("Worker {} started", self.stats.name);

        loop {
            if self.scheduler.is_empty() {
                self.status.set(WorkerState::Idle);
                let message = match self.inbox.recv() {
                    Ok(message) => message,
                    Err(_) => break,
                };
                if let Control::Exit = self.handle(message) {
                    break;
                }
            }

            if let Control::Exit = self.drain_inbox() {
                break;
            }

            self.process_one();
        }

        self.terminate()
    }

    /// Handles every message already waiting in the inbox.
    fn drain_inbox(&mut self) -> Control {
        loop {
            match self.inbox.try_recv() {
                Ok(message) => {
                    if let Control::Exit = self.handle(message) {
                        return Control::Exit;
                    }
                }
                Err(TryRecvError::Empty) => return Control::Continue,
                Err(TryRecvError::Disconnected) => return Control::Exit,
            }
        }
    }

    fn handle(&mut self, message: Message) -> Control {
        match message {
            Message::Exit => return Control::Exit,
            Message::PlayerMovedChunks(viewer) => {
                self.scheduler.reprioritize(viewer);
            }
            message => {
                let topic = message.topic();
                if topic != self.task.request_topic() {
                    panic!("worker {} received malformed message on {topic}", self.stats.name);
                }
                let submission = match self.task.unpack(message) {
                    Ok(submission) => submission,
                    Err(message) => panic!(
                        "worker {} cannot unpack {:?}",
                        self.stats.name, message
                    ),
                };
                if submission.urgent {
                    self.scheduler.enqueue_front(submission.coords, submission.request);
                } else if !self.scheduler.enqueue(submission.coords, submission.request) {
                    self.stats.deduplicated += 1;
                }
            }
        }
        Control::Continue
    }

    /// Processes the next queued request, if any.
    fn process_one(&mut self) -> bool {
        let Some((coords, request)) = self.scheduler.dequeue_one() else {
            return false;
        };

        self.status.set(WorkerState::Processing);
        let start = Instant::now();
        let response = self.task.process(coords, request);
        debug!(
            "Worker {} finished {} in {:?}",
            self.stats.name,
            coords,
            start.elapsed()
        );
        self.stats.processed += 1;

        if self.outbox.send(response).is_err() {
            warn!("Worker {}: response for {} has no receiver", self.stats.name, coords);
        }
        self.status.set(WorkerState::Idle);
        true
    }

    fn terminate(mut self) -> WorkerStats {
        match self.shutdown_mode {
            ShutdownMode::Drain => while self.process_one() {},
            ShutdownMode::Immediate => {
                self.stats.discarded = self.scheduler.len();
            }
        }
        self.status.set(WorkerState::Terminated);
        info!(
            "Worker {} terminated: {} processed, {} deduplicated, {} discarded",
            self.stats.name, self.stats.processed, self.stats.deduplicated, self.stats.discarded
        );
        self.stats
    }
}
