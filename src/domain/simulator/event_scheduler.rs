use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::domain::simulator::event::Event;

/// Heap entry. `seq` is the insertion counter and keeps equal timestamps FIFO.
#[derive(Debug)]
struct ScheduledEvent {
    seq: u64,
    event: Event,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, the earliest event must come out first.
        other.event.time.total_cmp(&self.event.time).then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Time ordered event queue of one simulation run.
#[derive(Debug, Default)]
pub struct EventScheduler {
    queue: BinaryHeap<ScheduledEvent>,
    next_seq: u64,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(ScheduledEvent { seq, event });
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Drains the queue in event order. `None` ends the simulation.
impl Iterator for EventScheduler {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        self.queue.pop().map(|scheduled| scheduled.event)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.len(), Some(self.queue.len()))
    }
}
