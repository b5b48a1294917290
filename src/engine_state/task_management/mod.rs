//! # Task Management System
//!
//! This module connects the main thread, which owns all voxel data, to the
//! worker threads that generate chunks and meshes.
//!
//! ## Architecture Overview
//!
//! - `Dispatcher`: the explicit message context created once at startup. It
//!   owns one bounded channel per worker and the shared response channel
//! - `Worker`: a loop around one `Task` with its own `PriorityScheduler`
//! - `Message` / `Topic`: the typed messages and their routing names
//!
//! ## Routing
//! - Request topics go to exactly one subscriber, chosen from the chunk
//!   coordinates. The same coordinates always reach the same worker, so each
//!   worker's dedup guard sees every request for its chunks
//! - Event topics (`EVENT_PLAYER_MOVED_CHUNKS`, `EXIT`) go to every subscriber
//! - Response topics loop back to the main thread's inbox
//!
//! ## Backpressure
//! Worker channels are bounded by the configured capacity. A send to a full
//! channel sleeps for the retry interval and tries again until the worker
//! accepts it; nothing is dropped. Responses use an unbounded channel so a
//! worker never waits on the main thread, which rules out a send/send
//! deadlock between the two sides.
//!
//! ## Ordering
//! Messages from one sender to one worker keep their order. Interleaving across
//! senders is unspecified.

pub mod message;
pub mod scheduler;
pub mod task;
pub mod worker;

use std::{
    sync::mpsc::{channel, sync_channel, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError},
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, info, warn};
use message::{Message, Topic};
use task::Task;
use worker::{Worker, WorkerSettings, WorkerState, WorkerStats, WorkerStatus};

use super::error::{DispatchError, EngineError};

/// A communication channel between the main thread and one subscriber.
///
/// # Fields
/// - `name`: name of the subscriber, also its thread name
/// - `topics`: the topics routed to this subscriber
/// - `sender`: bounded sender feeding the subscriber's inbox
/// - `messages_sent`: number of messages accepted by the channel
/// - `worker`: handle of the worker thread, if the subscriber is a spawned worker
/// - `status`: live state of that worker
#[derive(Debug)]
pub struct TaskChannel {
    name: String,
    topics: Vec<Topic>,
    sender: SyncSender<Message>,
    messages_sent: usize,
    worker: Option<JoinHandle<WorkerStats>>,
    status: Option<WorkerStatus>,
}

impl TaskChannel {
    fn subscribes(&self, topic: Topic) -> bool {
        self.topics.contains(&topic)
    }
}

/// Routes messages between the main thread and the workers.
pub struct Dispatcher {
    channels: Vec<TaskChannel>,
    response_sender: Sender<Message>,
    inbox: Receiver<Message>,
    capacity: usize,
    retry_interval: Duration,
}

impl Dispatcher {
    /// Creates a dispatcher without subscribers.
    ///
    /// # Arguments
    /// * `capacity` - High-water mark of every worker channel
    /// * `retry_interval` - Sleep between attempts to send to a full channel
    pub fn new(capacity: usize, retry_interval: Duration) -> Self {
        let (response_sender, inbox) = channel();
        Dispatcher {
            channels: Vec::new(),
            response_sender,
            inbox,
            capacity,
            retry_interval,
        }
    }

    /// Spawns a worker thread running `task`.
    ///
    /// The worker subscribes to the task's request topic and to both event
    /// topics.
    ///
    /// # Errors
    /// Returns `EngineError::Io` if the thread cannot be spawned.
    pub fn spawn_worker<T: Task>(
        &mut self,
        name: &str,
        task: T,
        settings: WorkerSettings,
    ) -> Result<(), EngineError> {
        let topics = vec![task.request_topic(), Topic::PlayerMovedChunks, Topic::Exit];
        let (sender, inbox) = sync_channel(self.capacity);
        let worker = Worker::new(name, task, inbox, self.response_sender.clone(), settings);
        let status = worker.status();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker.run())?;

        info!("Spawned worker {} for {:?}", name, topics);
        self.channels.push(TaskChannel {
            name: name.to_string(),
            topics,
            sender,
            messages_sent: 0,
            worker: Some(handle),
            status: Some(status),
        });
        Ok(())
    }

    /// Subscribes an external receiver to `topics`.
    ///
    /// # Returns
    /// The receiving end of the new bounded channel.
    pub fn subscribe(&mut self, name: &str, topics: &[Topic]) -> Receiver<Message> {
        let (sender, receiver) = sync_channel(self.capacity);
        self.channels.push(TaskChannel {
            name: name.to_string(),
            topics: topics.to_vec(),
            sender,
            messages_sent: 0,
            worker: None,
            status: None,
        });
        receiver
    }

    /// A sender feeding the main thread's inbox, as handed to workers.
    pub fn responder(&self) -> Sender<Message> {
        self.response_sender.clone()
    }

    /// Number of subscribers of `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.channels.iter().filter(|c| c.subscribes(topic)).count()
    }

    /// Messages accepted so far by each subscriber's channel, by name.
    pub fn sent_counts(&self) -> Vec<(&str, usize)> {
        self.channels
            .iter()
            .map(|c| (c.name.as_str(), c.messages_sent))
            .collect()
    }

    /// Current state of each spawned worker, by name.
    pub fn worker_states(&self) -> Vec<(&str, WorkerState)> {
        self.channels
            .iter()
            .filter_map(|c| c.status.as_ref().map(|s| (c.name.as_str(), s.get())))
            .collect()
    }

    /// Publishes a message according to its topic.
    ///
    /// # Errors
    /// - `NoSubscriber` if a request has nobody to handle it
    /// - `Disconnected` if the chosen subscriber has hung up
    pub fn publish(&mut self, message: Message) -> Result<(), DispatchError> {
        let topic = message.topic();

        if topic.is_response() {
            return self
                .response_sender
                .send(message)
                .map_err(|_| DispatchError::Disconnected(topic));
        }

        let subscribers: Vec<usize> = (0..self.channels.len())
            .filter(|i| self.channels[*i].subscribes(topic))
            .collect();

        if topic.is_event() {
            for index in subscribers {
                if let Some(copy) = message.duplicate_event() {
                    self.send_with_retry(index, copy)?;
                }
            }
            return Ok(());
        }

        if subscribers.is_empty() {
            return Err(DispatchError::NoSubscriber(topic));
        }
        let key = message.coords().map(|c| c.shard_key()).unwrap_or_default();
        let index = subscribers[(key % subscribers.len() as u64) as usize];
        self.send_with_retry(index, message)
    }

    /// Sends to one channel, sleeping and retrying while it is full.
    fn send_with_retry(&mut self, index: usize, message: Message) -> Result<(), DispatchError> {
        let topic = message.topic();
        let retry_interval = self.retry_interval;
        let channel = &mut self.channels[index];
        let mut message = message;
        let mut attempts = 0usize;

        loop {
            match channel.sender.try_send(message) {
                Ok(()) => {
                    channel.messages_sent += 1;
                    if attempts > 0 {
                        debug!("{} accepted {} after {} retries", channel.name, topic, attempts);
                    }
                    return Ok(());
                }
                Err(TrySendError::Full(returned)) => {
                    message = returned;
                    attempts += 1;
                    thread::sleep(retry_interval);
                }
                Err(TrySendError::Disconnected(_)) => {
                    warn!("{} hung up while sending {}", channel.name, topic);
                    return Err(DispatchError::Disconnected(topic));
                }
            }
        }
    }

    /// Takes one response without blocking.
    pub fn try_receive(&self) -> Option<Message> {
        self.inbox.try_recv().ok()
    }

    /// Waits up to `timeout` for one response.
    pub fn receive_timeout(&self, timeout: Duration) -> Option<Message> {
        match self.inbox.recv_timeout(timeout) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Broadcasts `EXIT`, then joins every worker thread.
    ///
    /// # Errors
    /// Returns `EngineError::Worker` naming the first worker that panicked.
    pub fn shutdown(mut self) -> Result<Vec<WorkerStats>, EngineError> {
        for index in 0..self.channels.len() {
            if self.channels[index].subscribes(Topic::Exit) {
                // A worker that already hung up needs no exit message.
                let _ = self.send_with_retry(index, Message::Exit);
            }
        }

        let mut stats = Vec::new();
        let mut failure = None;
        for channel in self.channels.drain(..) {
            let TaskChannel { name, sender, worker, .. } = channel;
            drop(sender);
            if let Some(handle) = worker {
                match handle.join() {
                    Ok(worker_stats) => stats.push(worker_stats),
                    Err(_) => {
                        warn!("Worker {} panicked", name);
                        failure.get_or_insert(name);
                    }
                }
            }
        }

        match failure {
            Some(name) => Err(EngineError::Worker(format!("worker {name} panicked"))),
            None => Ok(stats),
        }
    }
}
