//! Cooperative processes.
//!
//! A process is an explicit, resumable state machine.  Each call to
//! [`Process::resume`] runs the body up to its next suspension point and
//! returns [`Step::Wait`] naming the event to suspend on, or [`Step::Done`].
//! The body is resumed exactly once per awaited event, when that event has
//! been processed, and receives the event's outcome.
//!
//! # Suspension points
//!
//! A process may only suspend on events the kernel hands out:
//!
//! | Source                      | Obtained from                              |
//! |-----------------------------|--------------------------------------------|
//! | Timeout                     | [`ProcessContext::timeout`]                |
//! | Resource grant              | [`ProcessContext::request`]                |
//! | Filtered-store item         | [`Store::get`][crate::Store::get]          |
//! | Child process completion    | [`ProcessContext::spawn`] → `handle.event` |
//! | Join-all / first-of         | [`ProcessContext::all_of`] / [`ProcessContext::any_of`] |
//!
//! # Failure
//!
//! Returning `Err` from `resume` fails the process: its completion event is
//! resolved with that error, and every slot it still holds is released.  A
//! failed awaited event arrives as `Err` in `input`, so `input?` propagates
//! it to the waiter.
//!
//! # Example
//!
//! ```rust,ignore
//! enum Stage { Start, Granted, Done }
//!
//! struct UseDrone { drone: ResourceId, stage: Stage }
//!
//! impl Process<Hub> for UseDrone {
//!     fn resume(&mut self, ctx: &mut ProcessContext<'_, Hub>, input: SimResult<()>) -> SimResult<Step> {
//!         input?;
//!         match self.stage {
//!             Stage::Start   => { self.stage = Stage::Granted; Ok(Step::Wait(ctx.request(self.drone)?)) }
//!             Stage::Granted => { self.stage = Stage::Done;    Ok(Step::Wait(ctx.timeout(5))) }
//!             Stage::Done    => { ctx.release(self.drone)?;    Ok(Step::Done) }
//!         }
//!     }
//! }
//! ```

use hs_core::{EventId, ProcessId, ResourceId, SimError, SimResult, SimTime};

use crate::event::{Callback, EventKind};
use crate::Scheduler;

// ── Trait ─────────────────────────────────────────────────────────────────────

/// What a process body asks the kernel to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Suspend until `EventId` is processed.
    Wait(EventId),
    /// Finish successfully.
    Done,
}

/// A cooperative unit of work over world state `W`.
pub trait Process<W> {
    /// Run until the next suspension point.
    ///
    /// `input` is `Ok(())` on the first activation, otherwise the outcome of
    /// the event the process last waited on.
    fn resume(&mut self, ctx: &mut ProcessContext<'_, W>, input: SimResult<()>) -> SimResult<Step>;
}

// ── State ─────────────────────────────────────────────────────────────────────

/// Where a process is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessState {
    /// Spawned, first activation queued.
    Runnable,
    /// Suspended on this event.
    Waiting(EventId),
    /// Finished, successfully or with the error that failed it.
    Done(SimResult<()>),
}

/// A spawned process and the event that resolves when it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessHandle {
    pub pid:   ProcessId,
    pub event: EventId,
}

/// A recorded process failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessFailure {
    pub pid:     ProcessId,
    pub process: String,
    pub at:      SimTime,
    pub error:   SimError,
}

// ── Process table ─────────────────────────────────────────────────────────────

pub(crate) struct ProcessSlot<W> {
    pub(crate) name:       String,
    pub(crate) body:       Option<Box<dyn Process<W>>>,
    pub(crate) completion: EventId,
    pub(crate) state:      ProcessState,
    /// The event whose processing resumes this process next.
    pub(crate) resume_on:  Option<EventId>,
}

pub(crate) struct ProcessTable<W> {
    pub(crate) slots: Vec<ProcessSlot<W>>,
}

impl<W> ProcessTable<W> {
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Register `body` and queue its first activation at the current instant.
    pub(crate) fn spawn(
        &mut self,
        sched: &mut Scheduler,
        name:  String,
        body:  Box<dyn Process<W>>,
    ) -> SimResult<ProcessHandle> {
        let pid = ProcessId(self.slots.len() as u32);
        let completion = sched.new_event(EventKind::Completion(pid));
        let start = sched.new_event(EventKind::Start(pid));
        sched.subscribe(start, Callback::Resume { pid, event: start })?;
        sched.trigger(start, Ok(()))?;

        log::debug!("{}: spawned {pid} '{name}'", sched.now());
        self.slots.push(ProcessSlot {
            name,
            body: Some(body),
            completion,
            state: ProcessState::Runnable,
            resume_on: Some(start),
        });
        Ok(ProcessHandle { pid, event: completion })
    }
}

// ── Context ───────────────────────────────────────────────────────────────────

/// Everything a process body may touch while it runs.
///
/// `sched` and `world` are separate fields so a body can borrow both at once,
/// e.g. `ctx.world.batteries.get(ctx.sched, filter)`.
pub struct ProcessContext<'a, W> {
    pub sched: &'a mut Scheduler,
    pub world: &'a mut W,
    pub(crate) table: &'a mut ProcessTable<W>,
    pub(crate) pid:   ProcessId,
}

impl<W> ProcessContext<'_, W> {
    /// The running process.
    #[inline]
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.sched.now()
    }

    /// An event that fires `delay` minutes from now.
    pub fn timeout(&mut self, delay: u64) -> EventId {
        self.sched.timeout(delay)
    }

    /// Request one slot of `res` for this process.
    pub fn request(&mut self, res: ResourceId) -> SimResult<EventId> {
        self.sched.request(res, self.pid)
    }

    /// Release the slot of `res` this process holds.
    pub fn release(&mut self, res: ResourceId) -> SimResult<()> {
        self.sched.release(res, self.pid)
    }

    pub fn all_of(&mut self, events: Vec<EventId>) -> SimResult<EventId> {
        self.sched.all_of(events)
    }

    pub fn any_of(&mut self, events: Vec<EventId>) -> SimResult<EventId> {
        self.sched.any_of(events)
    }

    /// Start a child process.  Wait on `handle.event` to join it.
    pub fn spawn<P>(&mut self, name: impl Into<String>, body: P) -> SimResult<ProcessHandle>
    where
        P: Process<W> + 'static,
    {
        self.table.spawn(self.sched, name.into(), Box::new(body))
    }
}
