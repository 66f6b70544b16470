//! Event records held in the scheduler's event table.
//!
//! An event moves through three states, each at most once:
//!
//! ```text
//! Pending ──trigger──▶ Triggered(outcome) ──popped by the run loop──▶ Processed(outcome)
//! ```
//!
//! Triggering stores the outcome and queues the event; processing runs its
//! continuations in registration order.  A second trigger is ignored, which
//! keeps resolution idempotent.

use hs_core::{EventId, ProcessId, ResourceId, SimResult, SimTime};

/// What an event resolves with: success, or the error that failed it.
pub type Outcome = SimResult<()>;

/// The source of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Fires at an absolute virtual time.
    Timeout { at: SimTime },
    /// First activation of a freshly spawned process.
    Start(ProcessId),
    /// Completion of a process; this is how a process is awaited.
    Completion(ProcessId),
    /// A slot of a resource granted to a requester.
    Grant(ResourceId),
    /// An item handed out by a filtered store.
    StoreGet,
    /// Join-all over the listed events.
    AllOf(Vec<EventId>),
    /// First-of over the listed events.
    AnyOf(Vec<EventId>),
    /// Re-delivery of an already processed event to a late subscriber.
    Relay(EventId),
    /// A manually resolved event.
    Plain,
}

/// Public view of an event's lifecycle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Pending,
    Triggered,
    Processed,
}

#[derive(Debug, Clone)]
pub(crate) enum EventState {
    Pending,
    Triggered(Outcome),
    Processed(Outcome),
}

/// A continuation registered on an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Callback {
    /// Resume `pid`, which suspended on `event`.
    Resume { pid: ProcessId, event: EventId },
    /// Re-evaluate the composite condition with this id.
    Condition(EventId),
}

#[derive(Debug)]
pub(crate) struct EventSlot {
    pub(crate) kind:      EventKind,
    pub(crate) state:     EventState,
    pub(crate) callbacks: Vec<Callback>,
}

impl EventSlot {
    pub(crate) fn new(kind: EventKind) -> Self {
        Self { kind, state: EventState::Pending, callbacks: Vec::new() }
    }

    pub(crate) fn status(&self) -> EventStatus {
        match self.state {
            EventState::Pending       => EventStatus::Pending,
            EventState::Triggered(_)  => EventStatus::Triggered,
            EventState::Processed(_)  => EventStatus::Processed,
        }
    }

    pub(crate) fn outcome(&self) -> Option<&Outcome> {
        match &self.state {
            EventState::Pending => None,
            EventState::Triggered(o) | EventState::Processed(o) => Some(o),
        }
    }

    /// The outcome, only once continuations have run.
    pub(crate) fn processed_outcome(&self) -> Option<&Outcome> {
        match &self.state {
            EventState::Processed(o) => Some(o),
            _ => None,
        }
    }
}

/// An event just taken off the queue, ready to have its continuations run.
#[derive(Debug)]
pub(crate) struct Fired {
    pub(crate) event:         EventId,
    pub(crate) at:            SimTime,
    /// Set when the event is the completion of this process.
    pub(crate) completion_of: Option<ProcessId>,
    pub(crate) outcome:       Outcome,
    pub(crate) callbacks:     Vec<Callback>,
}
