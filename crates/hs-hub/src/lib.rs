//! `hs-hub`: a drone delivery hub modelled on the `hs-kernel` simulator.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                       |
//! |---------------|----------------------------------------------------------------|
//! | [`battery`]   | `Battery`, `BatteryStatus` state machine                       |
//! | [`order`]     | `Order`, `OrderStatus` forward-only pipeline record            |
//! | [`monitor`]   | `Monitor`, `BatterySample`, run statistics                     |
//! | [`hub`]       | `Hub` world state, `Role` resource pools                       |
//! | [`lifecycle`] | `ChargeBattery`, `Deployment`, `BatteryMonitor` processes      |
//! | [`pipeline`]  | `OrderGenerator`, `OrderPipeline` processes, `place_order`     |
//! | [`builder`]   | `HubBuilder`, `run_day`                                        |
//! | [`error`]     | `HubError`, `HubResult<T>`                                     |
//!
//! # Design notes
//!
//! Every battery lives in one [`hs_kernel::Store`] except while it is out on
//! a flight.  Flights ask the store for a battery with
//! `status == DeploymentQueue && charged`; charging changes a stored
//! battery's status in place, and the store re-runs pending requests when it
//! does, so a flight waiting for power resumes the instant a charge ends.
//!
//! State-machine violations are `HubError`s.  They convert into
//! `SimError::Invariant` and fail the process that attempted them.

pub mod battery;
pub mod builder;
pub mod error;
pub mod hub;
pub mod lifecycle;
pub mod monitor;
pub mod order;
pub mod pipeline;


pub use battery::{Battery, BatteryStatus};
pub use builder::{run_day, HubBuilder};
pub use error::{HubError, HubResult};
pub use hub::{Hub, Role};
pub use lifecycle::{BatteryMonitor, ChargeBattery, Deployment};
pub use monitor::{BatterySample, Monitor};
pub use order::{Order, OrderStatus};
pub use pipeline::{place_order, OrderGenerator, OrderPipeline};
