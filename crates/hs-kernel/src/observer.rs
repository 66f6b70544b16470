//! Run observer trait for progress reporting and data collection.

use hs_core::SimTime;

use crate::{ProcessFailure, Scheduler};

/// Callbacks invoked by [`Environment::run_observed`][crate::Environment::run_observed].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: failure logger
///
/// ```rust,ignore
/// struct FailureCounter(usize);
///
/// impl<W> EnvObserver<W> for FailureCounter {
///     fn on_failure(&mut self, failure: &ProcessFailure) {
///         self.0 += 1;
///         eprintln!("{} failed at {}: {}", failure.process, failure.at, failure.error);
///     }
/// }
/// ```
pub trait EnvObserver<W> {
    /// Called after every processed event, with read-only access to the
    /// scheduler (clock, resources) and the world.
    fn on_step(&mut self, _now: SimTime, _sched: &Scheduler, _world: &W) {}

    /// Called once for each process failure, as it is recorded.
    fn on_failure(&mut self, _failure: &ProcessFailure) {}

    /// Called once when the run stops, whether it finished or errored.
    fn on_run_end(&mut self, _now: SimTime, _world: &W) {}
}

/// An [`EnvObserver`] that does nothing.
pub struct NoopObserver;

impl<W> EnvObserver<W> for NoopObserver {}
