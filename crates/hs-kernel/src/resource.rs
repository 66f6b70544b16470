//! `Resource`: a capacity-bounded mutual-exclusion pool with a FIFO queue.
//!
//! One type serves every role (operators, pilots, drones, chargers); only the
//! name and capacity differ.  The pool never resolves events itself: it
//! reports which request events became grants and the [`Scheduler`] triggers
//! them at the current instant, so a release hands its slot to the head of
//! the queue with zero elapsed time.
//!
//! # Invariants
//!
//! - `held() <= capacity()` at all times.
//! - Requests are granted in arrival order; a later request is never granted
//!   while an earlier one is still queued.
//! - A process holds or awaits at most one slot of a given pool.
//!
//! [`Scheduler`]: crate::Scheduler

use std::collections::VecDeque;

use hs_core::{EventId, ProcessId, ResourceId, SimError, SimResult};

/// A capacity-bounded pool of identical slots.
#[derive(Debug)]
pub struct Resource {
    id:       ResourceId,
    name:     String,
    capacity: usize,
    /// Current holders with the grant event each received.
    users:    Vec<(ProcessId, EventId)>,
    /// Waiting requesters, oldest first.
    queue:    VecDeque<(ProcessId, EventId)>,
}

impl Resource {
    pub(crate) fn new(id: ResourceId, name: impl Into<String>, capacity: usize) -> Self {
        Self {
            id,
            name: name.into(),
            capacity,
            users: Vec::with_capacity(capacity),
            queue: VecDeque::new(),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently granted.
    pub fn held(&self) -> usize {
        self.users.len()
    }

    /// Number of requests waiting for a slot.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// `true` if `pid` currently holds a slot.
    pub fn is_held_by(&self, pid: ProcessId) -> bool {
        self.users.iter().any(|(p, _)| *p == pid)
    }

    /// Processes waiting for a slot, in grant order.
    pub fn waiting(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.queue.iter().map(|(p, _)| *p)
    }

    /// Record a request by `pid` answered through `grant`.
    ///
    /// Returns `true` when the slot is granted immediately.
    pub(crate) fn request(&mut self, pid: ProcessId, grant: EventId) -> SimResult<bool> {
        if self.is_held_by(pid) || self.queue.iter().any(|(p, _)| *p == pid) {
            return Err(SimError::AlreadyHeld {
                resource: self.name.clone(),
                process:  pid.to_string(),
            });
        }
        if self.users.len() < self.capacity {
            self.users.push((pid, grant));
            Ok(true)
        } else {
            self.queue.push_back((pid, grant));
            Ok(false)
        }
    }

    /// Give back the slot held by `pid`.
    ///
    /// Returns the grant events of the requests that moved from the queue into
    /// the freed slot.
    pub(crate) fn release(&mut self, pid: ProcessId) -> SimResult<Vec<EventId>> {
        let Some(pos) = self.users.iter().position(|(p, _)| *p == pid) else {
            return Err(SimError::NotHeld {
                resource: self.name.clone(),
                process:  pid.to_string(),
            });
        };
        self.users.remove(pos);
        Ok(self.fill())
    }

    /// Drop every slot and queued request belonging to `pid`.
    ///
    /// Returns how many held slots were released plus the grants that
    /// followed.
    pub(crate) fn withdraw(&mut self, pid: ProcessId) -> (usize, Vec<EventId>) {
        self.queue.retain(|(p, _)| *p != pid);
        let before = self.users.len();
        self.users.retain(|(p, _)| *p != pid);
        let released = before - self.users.len();
        let granted = if released > 0 { self.fill() } else { Vec::new() };
        (released, granted)
    }

    /// Move queued requests into free slots, oldest first.
    fn fill(&mut self) -> Vec<EventId> {
        let mut granted = Vec::new();
        while self.users.len() < self.capacity {
            let Some((pid, grant)) = self.queue.pop_front() else { break };
            self.users.push((pid, grant));
            granted.push(grant);
        }
        granted
    }
}
