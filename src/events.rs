use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventKind {
    Arrival,
    EntryComplete,
    ExitStart,
    ExitComplete,
}

#[derive(Clone, Debug)]
pub struct ScheduledEvent {
    pub time: f64,
    pub kind: EventKind,
    pub vehicle_id: u64,
    seq: u64,
}

impl ScheduledEvent {
    pub fn new(time: f64, kind: EventKind, vehicle_id: u64, seq: u64) -> Self {
        Self {
            time,
            kind,
            vehicle_id,
            seq,
        }
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

/// Min-heap of pending events. Events at the same instant pop in the order
/// they were scheduled.
#[derive(Debug, Default)]
pub struct EventClock {
    events: BinaryHeap<Reverse<ScheduledEvent>>,
    next_seq: u64,
}

impl EventClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, time: f64, kind: EventKind, vehicle_id: u64) {
        let event = ScheduledEvent::new(time, kind, vehicle_id, self.next_seq);
        self.next_seq += 1;
        self.events.push(Reverse(event));
    }

    pub fn pop(&mut self) -> Option<ScheduledEvent> {
        self.events.pop().map(|Reverse(event)| event)
    }

    pub fn peek_time(&self) -> Option<f64> {
        self.events.peek().map(|Reverse(event)| event.time)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
