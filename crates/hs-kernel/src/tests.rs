//! Unit and scenario tests for hs-kernel.

use hs_core::{EventId, ProcessId, ResourceId, SimError, SimResult, SimTime};

use crate::{
    EnvObserver, Environment, EventKind, EventQueue, EventStatus, FailurePolicy, Process, ProcessContext,
    ProcessFailure, ProcessState, Scheduler, Step, Store,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// World for script-driven tests: a time-stamped trace plus a resource probe.
#[derive(Default)]
struct Trace {
    marks:    Vec<(u64, &'static str)>,
    max_held: usize,
}

#[derive(Clone, Copy)]
enum Act {
    Hold(u64),
    Acquire(ResourceId),
    Release(ResourceId),
    Mark(&'static str),
    Probe(ResourceId),
    Fail(&'static str),
}

/// Runs a fixed list of actions; `Hold` and `Acquire` suspend.
struct Script {
    acts: Vec<Act>,
    pc:   usize,
}

fn script(acts: Vec<Act>) -> Script {
    Script { acts, pc: 0 }
}

impl Process<Trace> for Script {
    fn resume(&mut self, ctx: &mut ProcessContext<'_, Trace>, input: SimResult<()>) -> SimResult<Step> {
        input?;
        while let Some(&act) = self.acts.get(self.pc) {
            self.pc += 1;
            match act {
                Act::Hold(delay)  => return Ok(Step::Wait(ctx.timeout(delay))),
                Act::Acquire(res) => return Ok(Step::Wait(ctx.request(res)?)),
                Act::Release(res) => ctx.release(res)?,
                Act::Mark(label)  => {
                    let now = ctx.now().0;
                    ctx.world.marks.push((now, label));
                }
                Act::Probe(res) => {
                    let held = ctx.sched.resource(res)?.held();
                    ctx.world.max_held = ctx.world.max_held.max(held);
                }
                Act::Fail(what) => return Err(SimError::invariant("script", what)),
            }
        }
        Ok(Step::Done)
    }
}

/// Waits on a composite of timeouts and, optionally, a child that fails.
struct Join {
    any:           bool,
    delays:        Vec<u64>,
    failing_child: Option<u64>,
    started:       bool,
}

fn join(any: bool, delays: Vec<u64>, failing_child: Option<u64>) -> Join {
    Join { any, delays, failing_child, started: false }
}

impl Process<Trace> for Join {
    fn resume(&mut self, ctx: &mut ProcessContext<'_, Trace>, input: SimResult<()>) -> SimResult<Step> {
        if !self.started {
            self.started = true;
            let mut members: Vec<EventId> = self.delays.iter().map(|d| ctx.timeout(*d)).collect();
            if let Some(delay) = self.failing_child {
                let child = ctx.spawn("child", script(vec![Act::Hold(delay), Act::Fail("child")]))?;
                members.push(child.event);
            }
            let cond = if self.any { ctx.any_of(members)? } else { ctx.all_of(members)? };
            return Ok(Step::Wait(cond));
        }
        let now = ctx.now().0;
        ctx.world.marks.push((now, if input.is_ok() { "joined" } else { "join failed" }));
        Ok(Step::Done)
    }
}

/// Spawns a child, then waits on it `delay` minutes later.
struct LateJoin {
    child: Option<EventId>,
    delay: u64,
    stage: u8,
}

impl Process<Trace> for LateJoin {
    fn resume(&mut self, ctx: &mut ProcessContext<'_, Trace>, input: SimResult<()>) -> SimResult<Step> {
        input?;
        self.stage += 1;
        match self.stage {
            1 => {
                let child = ctx.spawn("child", script(vec![Act::Hold(1), Act::Mark("child done")]))?;
                self.child = Some(child.event);
                Ok(Step::Wait(ctx.timeout(self.delay)))
            }
            2 => Ok(Step::Wait(self.child.ok_or(SimError::UnknownEvent(EventId::INVALID))?)),
            _ => {
                let now = ctx.now().0;
                ctx.world.marks.push((now, "joined child"));
                Ok(Step::Done)
            }
        }
    }
}

/// Spawns a failing child and propagates its failure.
struct Parent {
    child: Option<EventId>,
}

impl Process<Trace> for Parent {
    fn resume(&mut self, ctx: &mut ProcessContext<'_, Trace>, input: SimResult<()>) -> SimResult<Step> {
        input?;
        match self.child {
            None => {
                let child = ctx.spawn("child", script(vec![Act::Hold(2), Act::Fail("child")]))?;
                self.child = Some(child.event);
                Ok(Step::Wait(child.event))
            }
            Some(_) => Ok(Step::Done),
        }
    }
}

fn env() -> Environment<Trace> {
    Environment::new(Trace::default())
}

// ── EventQueue ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod queue_tests {
    use super::*;

    #[test]
    fn pops_in_time_then_insertion_order() {
        let mut q = EventQueue::new();
        q.schedule(SimTime(5), EventId(0));
        q.schedule(SimTime(3), EventId(1));
        q.schedule(SimTime(5), EventId(2));
        q.schedule(SimTime(3), EventId(3));

        assert_eq!(q.peek_time(), Some(SimTime(3)));
        let order: Vec<_> = std::iter::from_fn(|| q.pop_next()).map(|(_, e)| e.0).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
        assert!(q.is_empty());
        assert_eq!(q.scheduled_total(), 4);
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scheduler_tests {
    use super::*;

    #[test]
    fn timeout_is_triggered_and_processed_in_order() {
        let mut s = Scheduler::new();
        let late = s.timeout(4);
        let now = s.timeout(0);
        assert_eq!(s.status(late), Some(EventStatus::Triggered));

        let first = s.pop().unwrap();
        assert_eq!(first.event, now);
        assert_eq!(s.now(), SimTime::ZERO);
        let second = s.pop().unwrap();
        assert_eq!(second.event, late);
        assert_eq!(s.now(), SimTime(4));
        assert_eq!(s.status(late), Some(EventStatus::Processed));
        assert!(s.pop().is_none());
    }

    #[test]
    fn events_report_their_source() {
        let mut s = Scheduler::new();
        let t = s.timeout(6);
        let e = s.event();
        let both = s.all_of(vec![t, e]).unwrap();

        assert_eq!(s.kind(t), Some(&EventKind::Timeout { at: SimTime(6) }));
        assert_eq!(s.kind(e), Some(&EventKind::Plain));
        assert_eq!(s.kind(both), Some(&EventKind::AllOf(vec![t, e])));
        assert_eq!(s.kind(EventId(99)), None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut s = Scheduler::new();
        let e = s.event();
        assert_eq!(s.status(e), Some(EventStatus::Pending));
        assert!(s.succeed(e).unwrap());
        assert!(!s.fail(e, SimError::Config("late".into())).unwrap());
        assert_eq!(s.outcome(e), Some(&Ok(())));
        assert_eq!(s.pending(), 1);
    }

    #[test]
    fn unknown_event_is_rejected() {
        let mut s = Scheduler::new();
        assert_eq!(s.succeed(EventId(7)), Err(SimError::UnknownEvent(EventId(7))));
        assert_eq!(s.all_of(vec![EventId(3)]), Err(SimError::UnknownEvent(EventId(3))));
    }

    #[test]
    fn empty_conditions_succeed_immediately() {
        let mut s = Scheduler::new();
        let all = s.all_of(Vec::new()).unwrap();
        let any = s.any_of(Vec::new()).unwrap();
        assert_eq!(s.outcome(all), Some(&Ok(())));
        assert_eq!(s.outcome(any), Some(&Ok(())));
    }

    #[test]
    fn double_request_is_already_held() {
        let mut s = Scheduler::new();
        let r = s.add_resource("pilot", 1);
        s.request(r, ProcessId(0)).unwrap();
        assert!(matches!(s.request(r, ProcessId(0)), Err(SimError::AlreadyHeld { .. })));

        // A queued request counts too.
        s.request(r, ProcessId(1)).unwrap();
        assert!(matches!(s.request(r, ProcessId(1)), Err(SimError::AlreadyHeld { .. })));
    }

    #[test]
    fn release_without_holding_is_not_held() {
        let mut s = Scheduler::new();
        let r = s.add_resource("drone", 2);
        assert!(matches!(s.release(r, ProcessId(4)), Err(SimError::NotHeld { .. })));
        assert!(matches!(
            s.release(ResourceId(9), ProcessId(4)),
            Err(SimError::UnknownResource(ResourceId(9)))
        ));
    }

    #[test]
    fn release_hands_slot_to_queue_head() {
        let mut s = Scheduler::new();
        let r = s.add_resource("charger", 1);
        let g0 = s.request(r, ProcessId(0)).unwrap();
        let g1 = s.request(r, ProcessId(1)).unwrap();
        let g2 = s.request(r, ProcessId(2)).unwrap();
        assert_eq!(s.status(g0), Some(EventStatus::Triggered));
        assert_eq!(s.status(g1), Some(EventStatus::Pending));
        assert_eq!(s.resource(r).unwrap().queue_len(), 2);

        s.release(r, ProcessId(0)).unwrap();
        assert_eq!(s.status(g1), Some(EventStatus::Triggered));
        assert_eq!(s.status(g2), Some(EventStatus::Pending));
        assert!(s.resource(r).unwrap().is_held_by(ProcessId(1)));
        assert_eq!(s.resource(r).unwrap().waiting().collect::<Vec<_>>(), vec![ProcessId(2)]);
    }
}

// ── Resources through processes ───────────────────────────────────────────────

#[cfg(test)]
mod resource_tests {
    use super::*;

    #[test]
    fn release_grants_next_requester_at_same_instant() {
        let mut env = env();
        let r = env.add_resource("operator", 1);
        env.spawn("a", script(vec![
            Act::Acquire(r), Act::Mark("a granted"), Act::Hold(5), Act::Release(r), Act::Mark("a released"),
        ])).unwrap();
        env.spawn("b", script(vec![
            Act::Hold(1), Act::Acquire(r), Act::Mark("b granted"), Act::Hold(2), Act::Release(r),
        ])).unwrap();
        env.run(None).unwrap();

        assert_eq!(env.world().marks, vec![(0, "a granted"), (5, "a released"), (5, "b granted")]);
        assert_eq!(env.now(), SimTime(7));
        assert_eq!(env.scheduler().resource(r).unwrap().held(), 0);
    }

    #[test]
    fn waiters_are_granted_in_arrival_order() {
        let mut env = env();
        let r = env.add_resource("pilot", 1);
        env.spawn("holder", script(vec![Act::Acquire(r), Act::Hold(10), Act::Release(r)])).unwrap();
        for (delay, label) in [(3, "third"), (1, "first"), (2, "second")] {
            env.spawn(label, script(vec![
                Act::Hold(delay), Act::Acquire(r), Act::Mark(label), Act::Hold(1), Act::Release(r),
            ])).unwrap();
        }
        env.run(None).unwrap();

        assert_eq!(env.world().marks, vec![(10, "first"), (11, "second"), (12, "third")]);
    }

    #[test]
    fn held_never_exceeds_capacity() {
        let mut env = env();
        let r = env.add_resource("drone", 2);
        for _ in 0..6 {
            env.spawn("user", script(vec![
                Act::Acquire(r), Act::Probe(r), Act::Hold(3), Act::Probe(r), Act::Release(r),
            ])).unwrap();
        }
        env.run(None).unwrap();

        assert_eq!(env.world().max_held, 2);
        assert_eq!(env.now(), SimTime(9));
    }

    #[test]
    fn failed_holder_releases_its_slot() {
        let mut env = env();
        let r = env.add_resource("charger", 1);
        let a = env.spawn("a", script(vec![Act::Acquire(r), Act::Hold(2), Act::Fail("boom")])).unwrap();
        env.spawn("b", script(vec![Act::Hold(1), Act::Acquire(r), Act::Mark("b granted"), Act::Release(r)]))
            .unwrap();
        env.run(None).unwrap();

        assert_eq!(env.world().marks, vec![(2, "b granted")]);
        assert_eq!(env.failures().len(), 1);
        assert_eq!(env.failures()[0].pid, a.pid);
        assert_eq!(env.failures()[0].at, SimTime(2));
        assert!(matches!(env.process_state(a.pid), Some(ProcessState::Done(Err(_)))));
    }

    #[test]
    fn finishing_while_holding_frees_the_slot() {
        let mut env = env();
        let r = env.add_resource("operator", 1);
        env.spawn("forgetful", script(vec![Act::Acquire(r), Act::Hold(4)])).unwrap();
        env.spawn("next", script(vec![Act::Hold(1), Act::Acquire(r), Act::Mark("granted")])).unwrap();
        env.run(None).unwrap();

        assert_eq!(env.world().marks, vec![(4, "granted")]);
        assert!(env.failures().is_empty());
    }

    #[test]
    fn release_without_holding_fails_the_process() {
        let mut env = env();
        let r = env.add_resource("pilot", 1);
        let p = env.spawn("confused", script(vec![Act::Release(r)])).unwrap();
        env.run(None).unwrap();

        assert!(matches!(
            env.process_state(p.pid),
            Some(ProcessState::Done(Err(SimError::NotHeld { .. })))
        ));
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod store_tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Item {
        id:      u32,
        charged: bool,
    }

    struct Shelf {
        store: Store<Item>,
        got:   Vec<(u64, Item)>,
    }

    fn shelf(capacity: usize) -> Environment<Shelf> {
        Environment::new(Shelf { store: Store::new("shelf", capacity), got: Vec::new() })
    }

    struct Fetch {
        want: fn(&Item) -> bool,
        get:  Option<EventId>,
    }

    fn fetch(want: fn(&Item) -> bool) -> Fetch {
        Fetch { want, get: None }
    }

    impl Process<Shelf> for Fetch {
        fn resume(&mut self, ctx: &mut ProcessContext<'_, Shelf>, input: SimResult<()>) -> SimResult<Step> {
            input?;
            match self.get {
                None => {
                    let ev = ctx.world.store.get(ctx.sched, self.want)?;
                    self.get = Some(ev);
                    Ok(Step::Wait(ev))
                }
                Some(ev) => {
                    let item = ctx.world.store.take(ev).ok_or(SimError::UnknownEvent(ev))?;
                    let now = ctx.now().0;
                    ctx.world.got.push((now, item));
                    Ok(Step::Done)
                }
            }
        }
    }

    fn put(env: &mut Environment<Shelf>, item: Item) -> SimResult<()> {
        let (sched, world) = env.parts_mut();
        world.store.put(sched, item)
    }

    #[test]
    fn pending_get_resolves_at_put_time() {
        let mut env = shelf(5);
        put(&mut env, Item { id: 1, charged: false }).unwrap();
        env.spawn("fetch", fetch(|i| i.charged)).unwrap();

        env.run(Some(SimTime(3))).unwrap();
        assert!(env.world().got.is_empty());
        assert_eq!(env.world().store.pending_gets(), 1);

        put(&mut env, Item { id: 2, charged: true }).unwrap();
        env.run(None).unwrap();

        assert_eq!(env.world().got, vec![(3, Item { id: 2, charged: true })]);
        assert_eq!(env.world().store.items(), &[Item { id: 1, charged: false }]);
    }

    #[test]
    fn present_item_is_handed_out_immediately() {
        let mut env = shelf(5);
        put(&mut env, Item { id: 4, charged: true }).unwrap();
        env.spawn("fetch", fetch(|i| i.id == 4)).unwrap();
        env.run(None).unwrap();

        assert_eq!(env.world().got, vec![(0, Item { id: 4, charged: true })]);
        assert!(env.world().store.is_empty());
    }

    #[test]
    fn in_place_change_re_evaluates_getters() {
        let mut env = shelf(5);
        put(&mut env, Item { id: 1, charged: false }).unwrap();
        env.spawn("fetch", fetch(|i| i.charged)).unwrap();
        env.run(Some(SimTime(6))).unwrap();
        assert!(env.world().got.is_empty());

        let (sched, world) = env.parts_mut();
        let hit = world.store.modify(sched, |i| i.id == 1, |i| i.charged = true).unwrap();
        assert_eq!(hit, Some(()));
        env.run(None).unwrap();

        assert_eq!(env.world().got, vec![(6, Item { id: 1, charged: true })]);
    }

    #[test]
    fn getters_are_served_in_arrival_order() {
        let mut env = shelf(5);
        env.spawn("first", fetch(|_| true)).unwrap();
        env.spawn("second", fetch(|_| true)).unwrap();
        env.run(None).unwrap();
        assert_eq!(env.world().store.pending_gets(), 2);

        put(&mut env, Item { id: 1, charged: true }).unwrap();
        env.run(None).unwrap();
        assert_eq!(env.world().got.len(), 1);
        assert_eq!(env.world().store.pending_gets(), 1);
    }

    #[test]
    fn later_getter_is_not_blocked_by_unmatched_earlier_one() {
        let mut env = shelf(5);
        env.spawn("charged", fetch(|i| i.charged)).unwrap();
        env.spawn("any", fetch(|_| true)).unwrap();
        env.run(None).unwrap();

        put(&mut env, Item { id: 9, charged: false }).unwrap();
        env.run(None).unwrap();
        assert_eq!(env.world().got, vec![(0, Item { id: 9, charged: false })]);
        assert_eq!(env.world().store.pending_gets(), 1);
    }

    #[test]
    fn full_store_rejects_put() {
        let mut env = shelf(1);
        put(&mut env, Item { id: 1, charged: false }).unwrap();
        let err = put(&mut env, Item { id: 2, charged: false }).unwrap_err();
        assert_eq!(err, SimError::CapacityExceeded { store: "shelf".into(), capacity: 1 });
        assert_eq!(env.world().store.len(), 1);
    }

    #[test]
    fn cancel_returns_parked_item_to_the_store() {
        let mut s = Scheduler::new();
        let mut store: Store<Item> = Store::new("shelf", 2);
        store.put(&mut s, Item { id: 1, charged: true }).unwrap();

        let ev = store.get(&mut s, |i| i.charged).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.parked().count(), 1);

        store.cancel(&mut s, ev).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.take(ev), None);

        let pending = store.get(&mut s, |i| i.id == 5).unwrap();
        assert_eq!(store.pending_gets(), 1);
        store.cancel(&mut s, pending).unwrap();
        assert_eq!(store.pending_gets(), 0);
    }

    #[test]
    fn parked_item_keeps_its_slot_until_taken() {
        let mut s = Scheduler::new();
        let mut store: Store<Item> = Store::new("shelf", 1);
        store.put(&mut s, Item { id: 1, charged: true }).unwrap();
        let ev = store.get(&mut s, |_| true).unwrap();
        assert!(store.is_empty());

        let err = store.put(&mut s, Item { id: 2, charged: true }).unwrap_err();
        assert_eq!(err, SimError::CapacityExceeded { store: "shelf".into(), capacity: 1 });

        store.cancel(&mut s, ev).unwrap();
        assert_eq!(store.items(), &[Item { id: 1, charged: true }]);
        assert!(store.len() <= store.capacity());

        // Once collected, the slot is free again.
        let ev = store.get(&mut s, |_| true).unwrap();
        assert!(store.take(ev).is_some());
        store.put(&mut s, Item { id: 2, charged: true }).unwrap();
        assert_eq!(store.len(), 1);
    }
}

// ── Composite conditions ──────────────────────────────────────────────────────

#[cfg(test)]
mod condition_tests {
    use super::*;

    #[test]
    fn all_of_waits_for_the_last_member() {
        let mut env = env();
        env.spawn("join", join(false, vec![3, 7, 5], None)).unwrap();
        env.run(None).unwrap();
        assert_eq!(env.world().marks, vec![(7, "joined")]);
    }

    #[test]
    fn any_of_resolves_with_the_first_member() {
        let mut env = env();
        env.spawn("join", join(true, vec![8, 3], None)).unwrap();
        env.run(None).unwrap();
        assert_eq!(env.world().marks, vec![(3, "joined")]);
        // The slower timeout still fires; nothing is cancelled.
        assert_eq!(env.now(), SimTime(8));
    }

    #[test]
    fn empty_lists_resolve_at_once() {
        let mut env = env();
        env.spawn("all", join(false, Vec::new(), None)).unwrap();
        env.spawn("any", join(true, Vec::new(), None)).unwrap();
        env.run(None).unwrap();
        assert_eq!(env.world().marks, vec![(0, "joined"), (0, "joined")]);
    }

    #[test]
    fn all_of_fails_as_soon_as_a_member_fails() {
        let mut env = env();
        env.spawn("join", join(false, vec![10], Some(4))).unwrap();
        env.run(None).unwrap();
        assert_eq!(env.world().marks, vec![(4, "join failed")]);
        assert_eq!(env.failures().len(), 1);
    }

    #[test]
    fn any_of_takes_a_failure_that_comes_first() {
        let mut env = env();
        env.spawn("join", join(true, vec![6], Some(2))).unwrap();
        env.run(None).unwrap();
        assert_eq!(env.world().marks, vec![(2, "join failed")]);
    }

    #[test]
    fn any_of_ignores_a_failure_that_comes_later() {
        let mut env = env();
        env.spawn("join", join(true, vec![1], Some(5))).unwrap();
        env.run(None).unwrap();
        assert_eq!(env.world().marks, vec![(1, "joined")]);
    }

    #[test]
    fn waiting_on_a_finished_process_resumes_now() {
        let mut env = env();
        env.spawn("late", LateJoin { child: None, delay: 3, stage: 0 }).unwrap();
        env.run(None).unwrap();
        assert_eq!(env.world().marks, vec![(1, "child done"), (3, "joined child")]);
    }
}

// ── Run loop ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod env_tests {
    use super::*;

    #[test]
    fn run_until_is_inclusive_and_parks_the_clock() {
        let mut env = env();
        env.spawn("late", script(vec![Act::Hold(10), Act::Mark("late")])).unwrap();

        env.run(Some(SimTime(5))).unwrap();
        assert_eq!(env.now(), SimTime(5));
        assert!(env.world().marks.is_empty());
        assert_eq!(env.peek(), Some(SimTime(10)));

        env.run(Some(SimTime(10))).unwrap();
        assert_eq!(env.world().marks, vec![(10, "late")]);
        assert_eq!(env.now(), SimTime(10));
    }

    #[test]
    fn step_processes_one_event_at_a_time() {
        let mut env = env();
        let p = env.spawn("p", script(vec![Act::Hold(2), Act::Mark("done")])).unwrap();
        assert_eq!(env.process_state(p.pid), Some(&ProcessState::Runnable));

        assert!(env.step().unwrap()); // start
        assert_eq!(env.process_state(p.pid), Some(&ProcessState::Waiting(EventId(2))));
        assert!(env.step().unwrap()); // timeout
        assert!(env.step().unwrap()); // completion
        assert!(!env.step().unwrap());

        assert_eq!(env.now(), SimTime(2));
        assert_eq!(env.process_state(p.pid), Some(&ProcessState::Done(Ok(()))));
        assert_eq!(env.process_name(p.pid), Some("p"));
    }

    #[test]
    fn abort_policy_stops_on_unobserved_failure() {
        let mut env = env().with_failure_policy(FailurePolicy::Abort);
        env.spawn("a", script(vec![Act::Hold(2), Act::Fail("boom")])).unwrap();
        env.spawn("b", script(vec![Act::Hold(9), Act::Mark("b")])).unwrap();

        match env.run(None) {
            Err(SimError::ProcessFailed { process, at, .. }) => {
                assert_eq!(process, "a");
                assert_eq!(at, SimTime(2));
            }
            other => panic!("expected ProcessFailed, got {other:?}"),
        }
        assert!(env.world().marks.is_empty());
    }

    #[test]
    fn abort_reports_the_outermost_unobserved_failure() {
        let mut env = env().with_failure_policy(FailurePolicy::Abort);
        env.spawn("parent", Parent { child: None }).unwrap();
        let err = env.run(None).unwrap_err();
        assert!(matches!(err, SimError::ProcessFailed { ref process, .. } if process == "parent"));
    }

    #[test]
    fn abort_on_failure_of_a_losing_any_of_member() {
        let mut env = env().with_failure_policy(FailurePolicy::Abort);
        env.spawn("join", join(true, vec![1], Some(5))).unwrap();

        match env.run(None) {
            Err(SimError::ProcessFailed { process, at, .. }) => {
                assert_eq!(process, "child");
                assert_eq!(at, SimTime(5));
            }
            other => panic!("expected ProcessFailed, got {other:?}"),
        }
        assert_eq!(env.world().marks, vec![(1, "joined")]);
    }

    #[test]
    fn failure_delivered_through_all_of_does_not_abort() {
        let mut env = env().with_failure_policy(FailurePolicy::Abort);
        env.spawn("join", join(false, vec![9], Some(2))).unwrap();

        env.run(None).unwrap();
        assert_eq!(env.world().marks, vec![(2, "join failed")]);
        assert_eq!(env.failures().len(), 1);
        assert_eq!(env.now(), SimTime(9));
    }

    #[test]
    fn isolate_policy_records_and_continues() {
        let mut env = env();
        env.spawn("parent", Parent { child: None }).unwrap();
        env.spawn("b", script(vec![Act::Hold(9), Act::Mark("b")])).unwrap();
        env.run(None).unwrap();

        let names: Vec<_> = env.failures().iter().map(|f| f.process.as_str()).collect();
        assert_eq!(names, vec!["child", "parent"]);
        assert_eq!(env.world().marks, vec![(9, "b")]);
    }

    #[test]
    fn observer_sees_failures_and_run_end() {
        #[derive(Default)]
        struct Counter {
            steps:    usize,
            failures: usize,
            ended_at: Option<SimTime>,
        }
        impl EnvObserver<Trace> for Counter {
            fn on_step(&mut self, _now: SimTime, _sched: &Scheduler, _world: &Trace) {
                self.steps += 1;
            }
            fn on_failure(&mut self, _failure: &ProcessFailure) {
                self.failures += 1;
            }
            fn on_run_end(&mut self, now: SimTime, _world: &Trace) {
                self.ended_at = Some(now);
            }
        }

        let mut env = env();
        env.spawn("a", script(vec![Act::Hold(1), Act::Fail("boom")])).unwrap();
        let mut obs = Counter::default();
        env.run_observed(Some(SimTime(20)), &mut obs).unwrap();

        assert_eq!(obs.failures, 1);
        assert_eq!(obs.steps, 3);
        assert_eq!(obs.ended_at, Some(SimTime(20)));
    }
}
