//! The `Scheduler`: virtual clock, event table, event queue and resources.
//!
//! The scheduler knows nothing about process bodies or the world they act
//! on; [`Environment`][crate::Environment] owns those and drives the loop.
//! Everything here is synchronous: triggering an event only stores its
//! outcome and queues it, and continuations run later when the run loop pops
//! it.

use log::{debug, trace};

use hs_core::{EventId, ProcessId, ResourceId, SimError, SimResult, SimTime};

use crate::event::{Callback, EventKind, EventSlot, EventState, EventStatus, Fired, Outcome};
use crate::{EventQueue, Resource};

/// Clock, pending events and the resource pools of one run.
#[derive(Default)]
pub struct Scheduler {
    now:       SimTime,
    queue:     EventQueue,
    events:    Vec<EventSlot>,
    resources: Vec<Resource>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Clock ─────────────────────────────────────────────────────────────

    /// Current virtual time.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Time of the next queued event, or `None` if nothing is pending.
    #[inline]
    pub fn peek(&self) -> Option<SimTime> {
        self.queue.peek_time()
    }

    /// Number of triggered events waiting to be processed.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn advance_to(&mut self, at: SimTime) {
        if at > self.now {
            self.now = at;
        }
    }

    // ── Events ────────────────────────────────────────────────────────────

    pub(crate) fn new_event(&mut self, kind: EventKind) -> EventId {
        let id = EventId(self.events.len() as u64);
        self.events.push(EventSlot::new(kind));
        id
    }

    /// A pending event resolved only by an explicit [`succeed`](Self::succeed)
    /// or [`fail`](Self::fail).
    pub fn event(&mut self) -> EventId {
        self.new_event(EventKind::Plain)
    }

    /// An event that fires `delay` minutes from now.  `delay = 0` is legal
    /// and fires at the current instant, after everything already queued
    /// for it.
    pub fn timeout(&mut self, delay: u64) -> EventId {
        let at = self.now + delay;
        let id = self.new_event(EventKind::Timeout { at });
        self.events[id.index()].state = EventState::Triggered(Ok(()));
        self.queue.schedule(at, id);
        id
    }

    /// Resolve `event` successfully at the current instant.
    ///
    /// Returns `false` if the event was already resolved; the earlier
    /// resolution stands.
    pub fn succeed(&mut self, event: EventId) -> SimResult<bool> {
        self.trigger(event, Ok(()))
    }

    /// Resolve `event` with `error` at the current instant.
    pub fn fail(&mut self, event: EventId, error: SimError) -> SimResult<bool> {
        self.trigger(event, Err(error))
    }

    pub(crate) fn trigger(&mut self, event: EventId, outcome: Outcome) -> SimResult<bool> {
        let now = self.now;
        let slot = self.slot_mut(event)?;
        if !matches!(slot.state, EventState::Pending) {
            return Ok(false);
        }
        slot.state = EventState::Triggered(outcome);
        self.queue.schedule(now, event);
        Ok(true)
    }

    /// Lifecycle position of `event`.
    pub fn status(&self, event: EventId) -> Option<EventStatus> {
        self.events.get(event.index()).map(EventSlot::status)
    }

    /// The resolution of `event` once it has been triggered.
    pub fn outcome(&self, event: EventId) -> Option<&Outcome> {
        self.events.get(event.index()).and_then(EventSlot::outcome)
    }

    pub fn kind(&self, event: EventId) -> Option<&EventKind> {
        self.events.get(event.index()).map(|s| &s.kind)
    }

    pub(crate) fn exists(&self, event: EventId) -> bool {
        event.index() < self.events.len()
    }

    fn slot_mut(&mut self, event: EventId) -> SimResult<&mut EventSlot> {
        self.events
            .get_mut(event.index())
            .ok_or(SimError::UnknownEvent(event))
    }

    /// Register `callback` on `event`.
    ///
    /// If `event` was already processed its continuations have run, so a
    /// relay event carrying the same outcome is queued at the current instant
    /// and the callback is registered there instead.
    pub(crate) fn subscribe(&mut self, event: EventId, callback: Callback) -> SimResult<()> {
        let processed = match &self.slot_mut(event)?.state {
            EventState::Processed(outcome) => Some(outcome.clone()),
            _ => None,
        };
        match processed {
            Some(outcome) => {
                let relay = self.new_event(EventKind::Relay(event));
                self.events[relay.index()].callbacks.push(callback);
                self.trigger(relay, outcome)?;
            }
            None => self.events[event.index()].callbacks.push(callback),
        }
        Ok(())
    }

    /// Pop the next triggered event, advance the clock to it and mark it
    /// processed.  Its continuations are returned for the caller to run.
    pub(crate) fn pop(&mut self) -> Option<Fired> {
        loop {
            let (at, event) = self.queue.pop_next()?;
            debug_assert!(at >= self.now, "event queue went back in time");
            self.advance_to(at);

            let slot = &mut self.events[event.index()];
            let outcome = match std::mem::replace(&mut slot.state, EventState::Pending) {
                EventState::Triggered(outcome) => outcome,
                other => {
                    // Only triggered events are queued; anything else is stale.
                    slot.state = other;
                    continue;
                }
            };
            slot.state = EventState::Processed(outcome.clone());
            let callbacks = std::mem::take(&mut slot.callbacks);
            let completion_of = match slot.kind {
                EventKind::Completion(pid) => Some(pid),
                _ => None,
            };
            trace!("{at}: processing {event} ({:?}, {} continuations)", slot.kind, callbacks.len());

            return Some(Fired { event, at, completion_of, outcome, callbacks });
        }
    }

    // ── Composite conditions ──────────────────────────────────────────────

    /// An event that succeeds once every member has succeeded, or fails as
    /// soon as any member fails.  An empty list succeeds immediately.
    ///
    /// Members keep running after a failure; nothing is cancelled.
    pub fn all_of(&mut self, events: Vec<EventId>) -> SimResult<EventId> {
        self.condition(events, EventKind::AllOf)
    }

    /// An event that resolves with the outcome of whichever member resolves
    /// first.  An empty list succeeds immediately.
    ///
    /// The losing members are not cancelled: they run to completion and their
    /// side effects stand.
    pub fn any_of(&mut self, events: Vec<EventId>) -> SimResult<EventId> {
        self.condition(events, EventKind::AnyOf)
    }

    fn condition(
        &mut self,
        members: Vec<EventId>,
        make:    fn(Vec<EventId>) -> EventKind,
    ) -> SimResult<EventId> {
        if let Some(missing) = members.iter().find(|e| !self.exists(**e)) {
            return Err(SimError::UnknownEvent(*missing));
        }

        let id = self.new_event(make(members.clone()));
        for member in &members {
            let slot = &mut self.events[member.index()];
            if !matches!(slot.state, EventState::Processed(_)) {
                slot.callbacks.push(Callback::Condition(id));
            }
        }
        self.evaluate_condition(id)?;
        Ok(id)
    }

    /// Resolve the condition `id` if its members now decide it.
    pub(crate) fn evaluate_condition(&mut self, id: EventId) -> SimResult<()> {
        let slot = &self.events[id.index()];
        if !matches!(slot.state, EventState::Pending) {
            return Ok(());
        }

        let decision: Option<Outcome> = match &slot.kind {
            EventKind::AllOf(members) => {
                let mut all_done = true;
                let mut failure = None;
                for m in members {
                    match self.events[m.index()].processed_outcome() {
                        Some(Err(e)) => {
                            failure = Some(e.clone());
                            break;
                        }
                        Some(Ok(())) => {}
                        None => all_done = false,
                    }
                }
                match failure {
                    Some(e)            => Some(Err(e)),
                    None if all_done   => Some(Ok(())),
                    None               => None,
                }
            }
            EventKind::AnyOf(members) if members.is_empty() => Some(Ok(())),
            EventKind::AnyOf(members) => members
                .iter()
                .find_map(|m| self.events[m.index()].processed_outcome().cloned()),
            _ => None,
        };

        if let Some(outcome) = decision {
            self.trigger(id, outcome)?;
        }
        Ok(())
    }

    // ── Resources ─────────────────────────────────────────────────────────

    /// Register a pool of `capacity` identical slots under `name`.
    pub fn add_resource(&mut self, name: impl Into<String>, capacity: usize) -> ResourceId {
        let id = ResourceId(self.resources.len() as u32);
        self.resources.push(Resource::new(id, name, capacity));
        id
    }

    pub fn resource(&self, id: ResourceId) -> SimResult<&Resource> {
        self.resources
            .get(id.index())
            .ok_or(SimError::UnknownResource(id))
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    fn resource_mut(&mut self, id: ResourceId) -> SimResult<&mut Resource> {
        self.resources
            .get_mut(id.index())
            .ok_or(SimError::UnknownResource(id))
    }

    /// Ask for one slot of `res` on behalf of `pid`.
    ///
    /// The returned grant event is resolved now if a slot is free, otherwise
    /// when the request reaches the head of the queue and a slot frees up.
    pub fn request(&mut self, res: ResourceId, pid: ProcessId) -> SimResult<EventId> {
        self.resource(res)?;
        let grant = self.new_event(EventKind::Grant(res));
        let granted_now = self.resource_mut(res)?.request(pid, grant)?;
        if granted_now {
            self.trigger(grant, Ok(()))?;
        } else {
            debug!("{}: {pid} queued for {}", self.now, self.resources[res.index()].name());
        }
        Ok(grant)
    }

    /// Return the slot of `res` held by `pid`, handing it to the next waiter.
    pub fn release(&mut self, res: ResourceId, pid: ProcessId) -> SimResult<()> {
        let granted = self.resource_mut(res)?.release(pid)?;
        for grant in granted {
            debug!("{}: {} handed over ({grant})", self.now, self.resources[res.index()].name());
            self.trigger(grant, Ok(()))?;
        }
        Ok(())
    }

    /// Release every slot `pid` holds and drop its queued requests.
    pub(crate) fn withdraw(&mut self, pid: ProcessId) -> SimResult<()> {
        for i in 0..self.resources.len() {
            let (released, granted) = self.resources[i].withdraw(pid);
            if released > 0 {
                debug!("{}: released {released} slot(s) of {} left by {pid}", self.now, self.resources[i].name());
            }
            for grant in granted {
                self.trigger(grant, Ok(()))?;
            }
        }
        Ok(())
    }
}
