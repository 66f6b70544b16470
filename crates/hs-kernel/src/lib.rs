//! `hs-kernel`: discrete-event simulation kernel for the hubsim framework.
//!
//! # Event loop
//!
//! ```text
//! loop:
//!   ① Pop:     take the triggered event with the smallest (time, seq) key
//!               and advance the clock to its time.
//!   ② Process: mark it processed and run its continuations in order:
//!                 Resume(pid)     → call the process body with the outcome
//!                 Condition(cond) → re-evaluate an all_of / any_of
//!   ③ Settle:  a body that returns Step::Wait(e) subscribes to e; one that
//!               returns Done or Err frees its resource slots and resolves
//!               its completion event.
//! ```
//!
//! Anything triggered during ② is queued at the current time behind events
//! already pending for it, so zero-delay hand-offs keep a stable order.
//!
//! # Building blocks
//!
//! | Type            | Role                                                   |
//! |-----------------|--------------------------------------------------------|
//! | [`Scheduler`]   | Clock, event table, queue, resource pools.             |
//! | [`Environment`] | Owns the scheduler, processes and world; runs them.    |
//! | [`Process`]     | A resumable state machine over world state `W`.        |
//! | [`Resource`]    | Capacity-bounded FIFO pool of identical slots.         |
//! | [`Store`]       | Bounded item store with filtered, queued gets.         |
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                  |
//! |-----------|---------------------------------------------------------|
//! | `fx-hash` | Uses FxHash for the store's parked-item map.            |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use hs_kernel::{Environment, Process, ProcessContext, Step};
//!
//! let mut env = Environment::new(world);
//! env.spawn("generator", OrderGenerator::new(config))?;
//! env.run(Some(SimTime(720)))?;
//! ```

pub mod env;
pub mod event;
pub mod observer;
pub mod process;
pub mod queue;
pub mod resource;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod tests;

pub use env::{Environment, FailurePolicy};
pub use event::{EventKind, EventStatus, Outcome};
pub use observer::{EnvObserver, NoopObserver};
pub use process::{Process, ProcessContext, ProcessFailure, ProcessHandle, ProcessState, Step};
pub use queue::EventQueue;
pub use resource::Resource;
pub use scheduler::Scheduler;
pub use store::Store;
