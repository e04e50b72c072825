//! Time-ordered task queue
//!
//! Periodic ticks and one-shot general releases share one heap, drained by
//! the match clock. Clearing the heap is how a reset cancels everything.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::core::types::{FactionId, GeneralId, Millis, ProvinceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    EconomyTick,
    AiTick,
    /// Return a marching general to Idle
    ReleaseGeneral {
        general: GeneralId,
        faction: FactionId,
        from: ProvinceId,
        to: ProvinceId,
    },
}

impl TaskKind {
    pub fn is_periodic(&self) -> bool {
        matches!(self, TaskKind::EconomyTick | TaskKind::AiTick)
    }
}

/// A task due at a point in match time
///
/// Ties on `due` run in scheduling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub due: Millis,
    pub seq: u64,
    pub kind: TaskKind,
}

impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<ScheduledTask>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Millis, kind: TaskKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(ScheduledTask { due, seq, kind }));
    }

    /// Remove and return the earliest task due at or before `now`
    pub fn pop_due(&mut self, now: Millis) -> Option<ScheduledTask> {
        match self.queue.peek() {
            Some(Reverse(task)) if task.due <= now => self.queue.pop().map(|Reverse(t)| t),
            _ => None,
        }
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.queue.peek().map(|Reverse(t)| t.due)
    }

    /// Drop every pending task, periodic or not
    pub fn clear(&mut self) {
        self.queue.clear();
        self.next_seq = 0;
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pending one-shot callbacks
    pub fn pending_callbacks(&self) -> usize {
        self.queue.iter().filter(|Reverse(t)| !t.kind.is_periodic()).count()
    }
}
