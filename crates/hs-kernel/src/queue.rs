//! `EventQueue`: the time-ordered queue of triggered events.
//!
//! # Ordering
//!
//! Entries are keyed by `(time, seq)` where `seq` is a monotonic counter
//! assigned when the event is scheduled.  Popping always yields the earliest
//! time; among events at the same time, the one scheduled first comes first.
//! Process interleaving is therefore a pure function of the schedule order.
//!
//! # Performance note
//!
//! `BTreeMap` gives O(log n) insert and O(log n) pop where n is the number of
//! pending events.  A hub day keeps at most a few hundred pending at once.

use std::collections::BTreeMap;

use hs_core::{EventId, SimTime};

/// A priority queue mapping `(time, insertion sequence)` → event.
#[derive(Default)]
pub struct EventQueue {
    inner: BTreeMap<(SimTime, u64), EventId>,
    /// Next insertion sequence number.
    seq:   u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to fire at `at`.
    ///
    /// An event may be inserted several times only if the caller does so on
    /// purpose; the scheduler never does (an event is queued when triggered,
    /// and triggering happens at most once).
    pub fn schedule(&mut self, at: SimTime, event: EventId) {
        self.inner.insert((at, self.seq), event);
        self.seq += 1;
    }

    /// Remove and return the earliest entry, breaking ties by insertion order.
    pub fn pop_next(&mut self) -> Option<(SimTime, EventId)> {
        self.inner.pop_first().map(|((at, _), event)| (at, event))
    }

    /// The time of the earliest queued entry, or `None` if empty.
    pub fn peek_time(&self) -> Option<SimTime> {
        self.inner.keys().next().map(|(at, _)| *at)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Total number of entries ever scheduled (the next sequence number).
    pub fn scheduled_total(&self) -> u64 {
        self.seq
    }
}
