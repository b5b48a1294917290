//! # Priority Scheduler
//!
//! A deduplicating priority queue that decides which chunk a worker handles
//! next. Entries are ordered by squared distance to the last known viewer
//! chunk, nearest first, with FIFO order between equal distances.
//!
//! ## Structure
//! - `heap`: a binary heap of `PriorityEntry` (coordinates, priority, sequence)
//! - `pending`: coordinates currently queued, mapped to their payload. This is
//!   the dedup guard: at most one entry per coordinate exists at any time
//! - `fast_lane`: a FIFO of coordinates promoted by edits, always served before
//!   the heap
//!
//! ## Reprioritization
//! `BinaryHeap` has no decrease-key, so a viewer move recomputes every priority
//! and rebuilds the heap in O(n log n). Viewer moves happen once per chunk
//! crossing, not per frame.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use log::trace;
use serde::{Deserialize, Serialize};

use crate::engine_state::voxels::chunk::ChunkCoord;

/// What `enqueue` does with coordinates that are already queued.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Drop the new request and trust the queued one.
    #[default]
    KeepExisting,
    /// Keep the queue position and replace the payload ("latest wins").
    ReplaceData,
}

/// A queued coordinate and its scheduling key.
#[derive(Copy, Clone, Debug)]
pub struct PriorityEntry {
    /// The chunk this entry refers to
    pub coords: ChunkCoord,
    /// Squared distance to the viewer, in chunks
    pub priority: i64,
    /// Insertion order, used to break priority ties
    sequence: u64,
}

impl PartialEq for PriorityEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PriorityEntry {}

impl Ord for PriorityEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: the smallest priority, then the oldest
        // sequence, has to compare greatest.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for PriorityEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Deduplicating, viewer-distance ordered queue of chunk work.
pub struct PriorityScheduler<T> {
    viewer: ChunkCoord,
    heap: BinaryHeap<PriorityEntry>,
    fast_lane: VecDeque<ChunkCoord>,
    pending: HashMap<ChunkCoord, T>,
    next_sequence: u64,
    duplicate_policy: DuplicatePolicy,
}

impl<T> PriorityScheduler<T> {
    /// Creates an empty scheduler measuring distances from `viewer`.
    pub fn new(viewer: ChunkCoord, duplicate_policy: DuplicatePolicy) -> Self {
        PriorityScheduler {
            viewer,
            heap: BinaryHeap::new(),
            fast_lane: VecDeque::new(),
            pending: HashMap::new(),
            next_sequence: 0,
            duplicate_policy,
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    /// Queues `data` for `coords` by distance to the viewer.
    ///
    /// # Returns
    /// `true` if a new entry was created. Returns `false` when the coordinates
    /// were already queued; depending on the duplicate policy the payload was
    /// then either dropped or replaced in place.
    pub fn enqueue(&mut self, coords: ChunkCoord, data: T) -> bool {
        if let Some(existing) = self.pending.get_mut(&coords) {
            match self.duplicate_policy {
                DuplicatePolicy::KeepExisting => {
                    trace!("Dropping duplicate request for {}", coords);
                }
                DuplicatePolicy::ReplaceData => {
                    trace!("Replacing queued request for {}", coords);
                    *existing = data;
                }
            }
            return false;
        }

        let sequence = self.next_sequence();
        self.heap.push(PriorityEntry {
            coords,
            priority: coords.distance_squared(&self.viewer),
            sequence,
        });
        self.pending.insert(coords, data);
        true
    }

    /// Queues `data` for `coords` ahead of all distance-ordered work.
    ///
    /// Fast-lane entries are served FIFO among themselves. If the coordinates
    /// are already queued, the entry moves to the fast lane (or keeps its
    /// fast-lane position) and its payload is replaced by `data`.
    pub fn enqueue_front(&mut self, coords: ChunkCoord, data: T) {
        let already_fast = self.fast_lane.contains(&coords);
        if self.pending.insert(coords, data).is_some() && !already_fast {
            self.heap.retain(|entry| entry.coords != coords);
        }
        if !already_fast {
            self.fast_lane.push_back(coords);
        }
    }

    /// Recomputes every queued priority against `viewer` and rebuilds the heap.
    pub fn reprioritize(&mut self, viewer: ChunkCoord) {
        self.viewer = viewer;
        let mut entries = std::mem::take(&mut self.heap).into_vec();
        for entry in entries.iter_mut() {
            entry.priority = entry.coords.distance_squared(&viewer);
        }
        self.heap = BinaryHeap::from(entries);
        trace!("Reprioritized {} entries around {}", self.heap.len(), viewer);
    }

    /// Removes and returns the next entry: fast lane first, then the nearest.
    pub fn dequeue_one(&mut self) -> Option<(ChunkCoord, T)> {
        let coords = match self.fast_lane.pop_front() {
            Some(coords) => coords,
            None => self.heap.pop()?.coords,
        };
        let data = self
            .pending
            .remove(&coords)
            .expect("queued coordinates always have a pending payload");
        Some((coords, data))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn contains(&self, coords: &ChunkCoord) -> bool {
        self.pending.contains_key(coords)
    }

    /// The stored priority of a distance-ordered entry. `None` for fast-lane
    /// entries and coordinates that are not queued.
    pub fn priority_of(&self, coords: &ChunkCoord) -> Option<i64> {
        self.heap
            .iter()
            .find(|entry| entry.coords == *coords)
            .map(|entry| entry.priority)
    }

    /// The distance-ordered entries, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &PriorityEntry> {
        self.heap.iter()
    }

    pub fn viewer(&self) -> ChunkCoord {
        self.viewer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(x: i32, z: i32) -> ChunkCoord {
        ChunkCoord::new(x, 0, z)
    }

    fn drain<T>(scheduler: &mut PriorityScheduler<T>) -> Vec<(ChunkCoord, T)> {
        std::iter::from_fn(|| scheduler.dequeue_one()).collect()
    }

    #[test]
    fn test_dequeues_nearest_first() {
        let mut scheduler = PriorityScheduler::new(coord(0, 0), DuplicatePolicy::KeepExisting);
        scheduler.enqueue(coord(3, 0), "far");
        scheduler.enqueue(coord(0, 1), "near");
        scheduler.enqueue(coord(2, 0), "middle");

        let order: Vec<&str> = drain(&mut scheduler).into_iter().map(|(_, d)| d).collect();
        assert_eq!(order, vec!["near", "middle", "far"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_equal_priorities_are_fifo() {
        let mut scheduler = PriorityScheduler::new(coord(0, 0), DuplicatePolicy::KeepExisting);
        let ring = [coord(1, 0), coord(0, 1), coord(-1, 0), coord(0, -1)];
        for c in ring {
            scheduler.enqueue(c, ());
        }
        let order: Vec<ChunkCoord> = drain(&mut scheduler).into_iter().map(|(c, _)| c).collect();
        assert_eq!(order, ring.to_vec());
    }

    #[test]
    fn test_duplicate_is_dropped() {
        let mut scheduler = PriorityScheduler::new(coord(0, 0), DuplicatePolicy::KeepExisting);
        assert!(scheduler.enqueue(coord(1, 1), 1));
        assert!(!scheduler.enqueue(coord(1, 1), 2));
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.entries().count(), 1);
        assert_eq!(drain(&mut scheduler), vec![(coord(1, 1), 1)]);
    }

    #[test]
    fn test_duplicate_replaces_data_when_configured() {
        let mut scheduler = PriorityScheduler::new(coord(0, 0), DuplicatePolicy::ReplaceData);
        scheduler.enqueue(coord(1, 1), 1);
        scheduler.enqueue(coord(2, 2), 5);
        assert!(!scheduler.enqueue(coord(1, 1), 2));
        assert_eq!(scheduler.len(), 2);
        assert_eq!(drain(&mut scheduler), vec![(coord(1, 1), 2), (coord(2, 2), 5)]);
    }

    #[test]
    fn test_fast_lane_preempts_distance() {
        let mut scheduler = PriorityScheduler::new(coord(0, 0), DuplicatePolicy::KeepExisting);
        scheduler.enqueue(coord(0, 0), "viewer");
        scheduler.enqueue_front(coord(9, 9), "edit-a");
        scheduler.enqueue_front(coord(8, 8), "edit-b");

        let order: Vec<&str> = drain(&mut scheduler).into_iter().map(|(_, d)| d).collect();
        assert_eq!(order, vec!["edit-a", "edit-b", "viewer"]);
    }

    #[test]
    fn test_promotion_moves_entry_and_takes_latest_data() {
        let mut scheduler = PriorityScheduler::new(coord(0, 0), DuplicatePolicy::KeepExisting);
        scheduler.enqueue(coord(0, 1), "near");
        scheduler.enqueue(coord(5, 5), "stale");
        scheduler.enqueue_front(coord(5, 5), "fresh");

        assert_eq!(scheduler.len(), 2);
        assert_eq!(scheduler.entries().count(), 1);
        assert_eq!(scheduler.priority_of(&coord(5, 5)), None);

        // Promoting again keeps one fast-lane entry.
        scheduler.enqueue_front(coord(5, 5), "fresher");
        assert_eq!(scheduler.len(), 2);

        assert_eq!(
            drain(&mut scheduler),
            vec![(coord(5, 5), "fresher"), (coord(0, 1), "near")]
        );
    }

    #[test]
    fn test_reprioritize_recomputes_every_entry() {
        let mut scheduler = PriorityScheduler::new(coord(0, 0), DuplicatePolicy::KeepExisting);
        for x in -3..=3 {
            for z in -3..=3 {
                scheduler.enqueue(coord(x, z), ());
            }
        }

        let viewer = ChunkCoord::new(3, 16, -2);
        scheduler.reprioritize(viewer);
        assert_eq!(scheduler.viewer(), viewer);
        for entry in scheduler.entries() {
            assert_eq!(entry.priority, entry.coords.distance_squared(&viewer));
        }

        let order: Vec<ChunkCoord> = drain(&mut scheduler).into_iter().map(|(c, _)| c).collect();
        assert_eq!(order[0], coord(3, -2));
        for pair in order.windows(2) {
            assert!(pair[0].distance_squared(&viewer) <= pair[1].distance_squared(&viewer));
        }
    }

    #[test]
    fn test_requeue_after_dequeue_is_accepted() {
        let mut scheduler = PriorityScheduler::new(coord(0, 0), DuplicatePolicy::KeepExisting);
        scheduler.enqueue(coord(1, 0), ());
        assert!(scheduler.dequeue_one().is_some());
        assert!(scheduler.enqueue(coord(1, 0), ()));
        assert!(scheduler.contains(&coord(1, 0)));
    }
}
