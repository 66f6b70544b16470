//! The `Environment` and its run loop.

use log::{trace, warn};

use hs_core::{EventId, ProcessId, ResourceId, SimError, SimResult, SimTime};

use crate::event::{Callback, EventStatus, Fired};
use crate::process::{ProcessSlot, ProcessTable};
use crate::{EnvObserver, Process, ProcessContext, ProcessFailure, ProcessHandle, ProcessState, Scheduler, Step};

// ── FailurePolicy ─────────────────────────────────────────────────────────────

/// What the run loop does with a process failure nothing is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record it and keep running the rest of the simulation.
    #[default]
    Isolate,
    /// Stop: `step`/`run` return [`SimError::ProcessFailed`].
    Abort,
}

// ── Environment ───────────────────────────────────────────────────────────────

/// The simulation runner: scheduler, process table and world state `W`.
///
/// Each iteration of the loop pops the earliest triggered event, advances
/// the clock to it and runs its continuations in registration order.
/// Continuations resume suspended processes or re-evaluate composite
/// conditions; either may trigger further events, which are queued behind
/// everything already pending for the same instant.
pub struct Environment<W> {
    sched:    Scheduler,
    table:    ProcessTable<W>,
    world:    W,
    policy:   FailurePolicy,
    failures: Vec<ProcessFailure>,
}

impl<W> Environment<W> {
    pub fn new(world: W) -> Self {
        Self {
            sched:    Scheduler::new(),
            table:    ProcessTable::new(),
            world,
            policy:   FailurePolicy::default(),
            failures: Vec::new(),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn now(&self) -> SimTime {
        self.sched.now()
    }

    /// Time of the next pending event.
    #[inline]
    pub fn peek(&self) -> Option<SimTime> {
        self.sched.peek()
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.sched
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.sched
    }

    /// Borrow the scheduler and the world at the same time, e.g. to fill a
    /// store before the run starts.
    pub fn parts_mut(&mut self) -> (&mut Scheduler, &mut W) {
        (&mut self.sched, &mut self.world)
    }

    pub fn into_world(self) -> W {
        self.world
    }

    pub fn add_resource(&mut self, name: impl Into<String>, capacity: usize) -> ResourceId {
        self.sched.add_resource(name, capacity)
    }

    pub fn process_state(&self, pid: ProcessId) -> Option<&ProcessState> {
        self.table.slots.get(pid.index()).map(|s| &s.state)
    }

    pub fn process_name(&self, pid: ProcessId) -> Option<&str> {
        self.table.slots.get(pid.index()).map(|s| s.name.as_str())
    }

    /// Number of processes ever spawned.
    pub fn process_count(&self) -> usize {
        self.table.slots.len()
    }

    /// Every process failure recorded so far, in order of occurrence.
    pub fn failures(&self) -> &[ProcessFailure] {
        &self.failures
    }

    // ── Spawning ──────────────────────────────────────────────────────────

    /// Start a top-level process.  Its first activation happens at the
    /// current instant, once the loop reaches it.
    pub fn spawn<P>(&mut self, name: impl Into<String>, body: P) -> SimResult<ProcessHandle>
    where
        P: Process<W> + 'static,
    {
        self.table.spawn(&mut self.sched, name.into(), Box::new(body))
    }

    // ── Run loop ──────────────────────────────────────────────────────────

    /// Process exactly one event.
    ///
    /// Returns `Ok(false)` when nothing is left to process.  With
    /// [`FailurePolicy::Abort`], a failed process completion that no
    /// continuation will deliver is returned as [`SimError::ProcessFailed`].
    /// A condition that already resolved (the losing side of an `any_of`,
    /// or an `all_of` that failed earlier) does not count as a waiter.
    pub fn step(&mut self) -> SimResult<bool> {
        let Some(fired) = self.sched.pop() else {
            return Ok(false);
        };
        let Fired { event, at, completion_of, outcome, callbacks } = fired;

        if self.policy == FailurePolicy::Abort && !callbacks.iter().any(|c| self.delivers(c)) {
            if let (Some(pid), Err(error)) = (completion_of, &outcome) {
                let process = self.table.slots[pid.index()].name.clone();
                return Err(SimError::ProcessFailed { process, at, source: Box::new(error.clone()) });
            }
        }

        for callback in callbacks {
            match callback {
                Callback::Resume { pid, event: awaited } => {
                    self.resume(pid, awaited, outcome.clone())?;
                }
                Callback::Condition(cond) => {
                    trace!("{at}: {event} re-evaluates condition {cond}");
                    self.sched.evaluate_condition(cond)?;
                }
            }
        }
        Ok(true)
    }

    /// `true` if running `callback` hands the outcome to someone: a process
    /// still suspended on that event, or a condition not yet resolved.
    fn delivers(&self, callback: &Callback) -> bool {
        match *callback {
            Callback::Resume { pid, event } => self
                .table
                .slots
                .get(pid.index())
                .is_some_and(|slot| slot.resume_on == Some(event)),
            Callback::Condition(cond) => self.sched.status(cond) == Some(EventStatus::Pending),
        }
    }

    /// Run until the queue is empty or the next event lies beyond `until`.
    ///
    /// Every event at or before `until` is processed; the clock then rests at
    /// `until` (or at the last event time if the queue drained earlier).
    pub fn run(&mut self, until: Option<SimTime>) -> SimResult<()> {
        self.run_observed(until, &mut crate::NoopObserver)
    }

    /// Like [`run`](Self::run) but reports progress to `observer`.
    ///
    /// `on_run_end` is called even when the run stops on an error, so data
    /// gathered up to that point can still be exported.
    pub fn run_observed<O: EnvObserver<W>>(
        &mut self,
        until:    Option<SimTime>,
        observer: &mut O,
    ) -> SimResult<()> {
        let result = self.run_loop(until, observer);
        if let (Ok(()), Some(until)) = (&result, until) {
            self.sched.advance_to(until);
        }
        observer.on_run_end(self.sched.now(), &self.world);
        result
    }

    fn run_loop<O: EnvObserver<W>>(&mut self, until: Option<SimTime>, observer: &mut O) -> SimResult<()> {
        loop {
            match self.sched.peek() {
                None => return Ok(()),
                Some(next) if until.is_some_and(|u| next > u) => return Ok(()),
                Some(_) => {}
            }

            let seen = self.failures.len();
            let stepped = self.step();
            for failure in &self.failures[seen..] {
                observer.on_failure(failure);
            }
            stepped?;
            observer.on_step(self.sched.now(), &self.sched, &self.world);
        }
    }

    // ── Process activation ────────────────────────────────────────────────

    fn resume(&mut self, pid: ProcessId, awaited: EventId, input: SimResult<()>) -> SimResult<()> {
        let Some(slot) = self.table.slots.get_mut(pid.index()) else {
            return Ok(());
        };
        // A process resumes once per awaited event; anything else is stale.
        if slot.resume_on != Some(awaited) {
            return Ok(());
        }
        slot.resume_on = None;
        let Some(mut body) = slot.body.take() else {
            return Ok(());
        };

        let step = {
            let mut ctx = ProcessContext {
                sched: &mut self.sched,
                world: &mut self.world,
                table: &mut self.table,
                pid,
            };
            body.resume(&mut ctx, input)
        };

        match step {
            Ok(Step::Wait(next)) if self.sched.status(next).is_some() => {
                let slot = &mut self.table.slots[pid.index()];
                slot.body = Some(body);
                slot.state = ProcessState::Waiting(next);
                slot.resume_on = Some(next);
                self.sched.subscribe(next, Callback::Resume { pid, event: next })
            }
            Ok(Step::Wait(next)) => self.finish(pid, Err(SimError::UnknownEvent(next))),
            Ok(Step::Done) => self.finish(pid, Ok(())),
            Err(error) => self.finish(pid, Err(error)),
        }
    }

    /// Settle a finished process: free its slots and resolve its completion.
    fn finish(&mut self, pid: ProcessId, result: SimResult<()>) -> SimResult<()> {
        self.sched.withdraw(pid)?;

        let now = self.sched.now();
        let ProcessSlot { name, completion, state, .. } = &mut self.table.slots[pid.index()];
        *state = ProcessState::Done(result.clone());
        let completion = *completion;

        match result {
            Ok(()) => {
                log::debug!("{now}: {pid} '{name}' finished");
                self.sched.succeed(completion)?;
            }
            Err(error) => {
                warn!("{now}: {pid} '{name}' failed: {error}");
                self.failures.push(ProcessFailure {
                    pid,
                    process: name.clone(),
                    at:      now,
                    error:   error.clone(),
                });
                self.sched.fail(completion, error)?;
            }
        }
        Ok(())
    }
}
