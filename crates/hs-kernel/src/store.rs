//! `Store<T>`: a capacity-bounded collection with predicate-based retrieval.
//!
//! # Matching model
//!
//! `get(filter)` registers a pending getter.  Whenever the store changes (an
//! item is put, or an item is mutated in place through
//! [`Store::modify`]/[`Store::modify_all`]), the pending getters are scanned
//! in arrival order; each takes the first item its filter accepts.  A
//! satisfied getter's item is parked under its event id until the waiting
//! process collects it with [`Store::take`].
//!
//! Parked items still occupy capacity: `put` counts them, so returning one
//! through [`Store::cancel`] can never overfill the store.
//!
//! Because every change triggers a full FIFO rescan, a getter never starves
//! while an item it accepts is present.
//!
//! # Liveness caveat
//!
//! A getter whose filter can never be satisfied stays queued forever; the
//! store does not detect this.  A getter abandoned by a failed process keeps
//! its place too: withdraw it with [`Store::cancel`] if the item must not be
//! parked for nobody.

use std::collections::VecDeque;

#[cfg(not(feature = "fx-hash"))]
use std::collections::HashMap;
#[cfg(feature = "fx-hash")]
use rustc_hash::FxHashMap as HashMap;

use log::trace;

use hs_core::{EventId, SimError, SimResult};

use crate::event::EventKind;
use crate::Scheduler;

type Filter<T> = Box<dyn Fn(&T) -> bool>;

struct Getter<T> {
    event:  EventId,
    filter: Filter<T>,
}

/// A bounded multiset of `T` with filtered, queued retrieval.
pub struct Store<T> {
    name:     String,
    capacity: usize,
    items:    Vec<T>,
    getters:  VecDeque<Getter<T>>,
    parked:   HashMap<EventId, T>,
}

impl<T> Store<T> {
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name:     name.into(),
            capacity,
            items:    Vec::with_capacity(capacity),
            getters:  VecDeque::new(),
            parked:   HashMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Items currently available, in insertion order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of getters still waiting for a match.
    pub fn pending_gets(&self) -> usize {
        self.getters.len()
    }

    /// Items handed out but not yet collected with [`take`](Self::take).
    pub fn parked(&self) -> impl Iterator<Item = &T> {
        self.parked.values()
    }

    /// Add `item`.  Rejected synchronously when stored plus parked items
    /// already fill the capacity.
    pub fn put(&mut self, sched: &mut Scheduler, item: T) -> SimResult<()> {
        if self.items.len() + self.parked.len() >= self.capacity {
            return Err(SimError::CapacityExceeded {
                store:    self.name.clone(),
                capacity: self.capacity,
            });
        }
        self.items.push(item);
        self.dispatch(sched)
    }

    /// Ask for the first item `filter` accepts.
    ///
    /// The returned event resolves at the current instant if such an item is
    /// present, otherwise as soon as one appears.  Collect the item with
    /// [`take`](Self::take) once the event has fired.
    pub fn get<F>(&mut self, sched: &mut Scheduler, filter: F) -> SimResult<EventId>
    where
        F: Fn(&T) -> bool + 'static,
    {
        let event = sched.new_event(EventKind::StoreGet);
        self.getters.push_back(Getter { event, filter: Box::new(filter) });
        self.dispatch(sched)?;
        Ok(event)
    }

    /// Collect the item handed out through `event`.
    pub fn take(&mut self, event: EventId) -> Option<T> {
        self.parked.remove(&event)
    }

    /// Withdraw the getter behind `event`.
    ///
    /// If it was already satisfied the parked item goes back into the store
    /// (and may satisfy another getter); otherwise the getter is dropped.
    pub fn cancel(&mut self, sched: &mut Scheduler, event: EventId) -> SimResult<()> {
        if let Some(item) = self.parked.remove(&event) {
            self.items.push(item);
            return self.dispatch(sched);
        }
        self.getters.retain(|g| g.event != event);
        Ok(())
    }

    /// Mutate the first item `select` accepts in place, then re-evaluate the
    /// pending getters.  Returns `None` if no item matched.
    pub fn modify<S, M, R>(&mut self, sched: &mut Scheduler, select: S, mutate: M) -> SimResult<Option<R>>
    where
        S: Fn(&T) -> bool,
        M: FnOnce(&mut T) -> R,
    {
        let Some(item) = self.items.iter_mut().find(|i| select(i)) else {
            return Ok(None);
        };
        let out = mutate(item);
        self.dispatch(sched)?;
        Ok(Some(out))
    }

    /// Apply `mutate` to every stored item, then re-evaluate once.
    pub fn modify_all<M>(&mut self, sched: &mut Scheduler, mut mutate: M) -> SimResult<()>
    where
        M: FnMut(&mut T),
    {
        self.items.iter_mut().for_each(&mut mutate);
        self.dispatch(sched)
    }

    /// Re-scan pending getters in arrival order and hand out matches.
    fn dispatch(&mut self, sched: &mut Scheduler) -> SimResult<()> {
        let mut i = 0;
        while i < self.getters.len() {
            let found = self.items.iter().position(|item| (self.getters[i].filter)(item));
            match found {
                Some(pos) => {
                    if let Some(getter) = self.getters.remove(i) {
                        let item = self.items.remove(pos);
                        self.parked.insert(getter.event, item);
                        trace!("{}: {} hands an item to {}", sched.now(), self.name, getter.event);
                        sched.succeed(getter.event)?;
                    }
                }
                None => i += 1,
            }
        }
        Ok(())
    }
}
