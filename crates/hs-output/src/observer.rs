//! `MonitorObserver<M>` bridges `EnvObserver<Hub>` to a `MonitorWriter`.

use log::warn;

use hs_core::SimTime;
use hs_hub::Hub;
use hs_kernel::{EnvObserver, ProcessFailure};

use crate::writer::{export, MonitorWriter};
use crate::OutputError;

/// An [`EnvObserver`] that exports the hub monitor through any
/// [`MonitorWriter`] backend when the run ends.
///
/// Errors from the writer are stored internally because observer methods
/// have no return value.  After `run_observed` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct MonitorObserver<M: MonitorWriter> {
    writer:     M,
    failures:   u64,
    last_error: Option<OutputError>,
}

impl<M: MonitorWriter> MonitorObserver<M> {
    pub fn new(writer: M) -> Self {
        Self { writer, failures: 0, last_error: None }
    }

    /// Process failures seen during the run.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Take the stored write error (if any) after the run returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> M {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<M: MonitorWriter> EnvObserver<Hub> for MonitorObserver<M> {
    fn on_failure(&mut self, failure: &ProcessFailure) {
        self.failures += 1;
        warn!("{}: {} failed: {}", failure.at, failure.process, failure.error);
    }

    fn on_run_end(&mut self, now: SimTime, hub: &Hub) {
        let result = export(&mut self.writer, &hub.monitor, now, self.failures);
        self.store_err(result);
    }
}
