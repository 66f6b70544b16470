//! `hs-core`: foundational types for the `hubsim` discrete-event framework.
//!
//! This crate is a dependency of every other `hs-*` crate.  It intentionally
//! has no `hs-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `EventId`, `ProcessId`, `ResourceId`, `BatteryId`, `OrderId` |
//! | [`time`]        | `SimTime` (virtual minutes)                               |
//! | [`rng`]         | `SimRng` (the single seeded random source of a run)       |
//! | [`config`]      | `HubConfig`, `Interval`                                   |
//! | [`error`]       | `SimError`, `SimResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                                   |
//! |---------|--------------------------------------------------------------------------|
//! | `serde` | `Serialize`/`Deserialize` on all public types; needed to load `HubConfig` from a file |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{HubConfig, Interval};
pub use error::{SimError, SimResult};
pub use ids::{BatteryId, EventId, OrderId, ProcessId, ResourceId};
pub use rng::SimRng;
pub use time::SimTime;
