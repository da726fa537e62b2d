use ordered_float::OrderedFloat;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::error::{Error, Result};
use crate::teller::TellerId;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventKind {
    CustomerArrival,
    ServiceComplete { teller_id: TellerId },
    FacilityOpen,
    FacilityClose,
}

#[derive(Clone, Copy, Debug)]
pub struct ScheduledEvent {
    pub time: f64,
    pub sequence: u64,
    pub kind: EventKind,
}

impl ScheduledEvent {
    pub fn new(time: f64, sequence: u64, kind: EventKind) -> Self {
        Self {
            time,
            sequence,
            kind,
        }
    }

    pub fn handle(&self) -> EventHandle {
        EventHandle {
            time: self.time,
            sequence: self.sequence,
        }
    }
}

/// Events order by time, then by the sequence number they were scheduled with.
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        OrderedFloat(self.time)
            .cmp(&OrderedFloat(other.time))
            .then_with(|| self.sequence.cmp(&other.sequence))
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

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventHandle {
    pub time: f64,
    pub sequence: u64,
}

/// Pending events in chronological order. Sequence numbers are never reused.
#[derive(Debug, Default)]
pub struct Timeline {
    events: BinaryHeap<Reverse<ScheduledEvent>>,
    next_sequence: u64,
    now: f64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, time: f64, kind: EventKind) -> Result<EventHandle> {
        if !time.is_finite() || time < self.now {
            return Err(Error::InvalidTime {
                time,
                now: self.now,
            });
        }

        let event = ScheduledEvent::new(time, self.next_sequence, kind);
        self.next_sequence += 1;
        self.events.push(Reverse(event));
        Ok(event.handle())
    }

    pub fn pop(&mut self) -> Option<ScheduledEvent> {
        let Reverse(event) = self.events.pop()?;
        self.now = event.time;
        Some(event)
    }

    pub fn peek(&self) -> Option<&ScheduledEvent> {
        self.events.peek().map(|Reverse(event)| event)
    }

    /// Time of the most recently popped event.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
