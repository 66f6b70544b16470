//! Framework error type.
//!
//! `SimError` is the one error that travels through the kernel: it is the
//! failure value of an event, so it must be `Clone` (every waiter of a failed
//! event receives its own copy).  Domain crates define their own error enums
//! and convert them into `SimError` via `From` impls.

use thiserror::Error;

use crate::{EventId, ResourceId, SimTime};

/// The top-level error type for every `hs-*` crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// A state machine was asked to make a transition its state forbids.
    #[error("invariant violated by {entity}: {invariant}")]
    Invariant { entity: String, invariant: String },

    #[error("store {store} is full (capacity {capacity})")]
    CapacityExceeded { store: String, capacity: usize },

    #[error("process {process} already holds or awaits resource {resource}")]
    AlreadyHeld { resource: String, process: String },

    #[error("process {process} released resource {resource} without holding it")]
    NotHeld { resource: String, process: String },

    #[error("event {0} does not exist")]
    UnknownEvent(EventId),

    #[error("resource {0} does not exist")]
    UnknownResource(ResourceId),

    /// A process failed and nothing was waiting to observe the failure.
    #[error("process {process} failed at {at}: {source}")]
    ProcessFailed {
        process: String,
        at:      SimTime,
        source:  Box<SimError>,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl SimError {
    /// Shorthand for an [`SimError::Invariant`] naming the offending entity.
    pub fn invariant(entity: impl ToString, invariant: impl Into<String>) -> Self {
        SimError::Invariant { entity: entity.to_string(), invariant: invariant.into() }
    }
}

/// Shorthand result type for all `hs-*` crates.
pub type SimResult<T> = Result<T, SimError>;
