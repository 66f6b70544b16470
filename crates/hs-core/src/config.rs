//! Hub run configuration.
//!
//! `HubConfig` is read once, when the hub is built, and never changes during
//! a run.  Its `Default` reproduces the reference hub: one 12-hour operating
//! day with a handful of drones, pilots and chargers.
//!
//! All durations are whole virtual minutes.  Duration ranges are
//! [`Interval`]s sampled uniformly with both ends inclusive.

use crate::{SimError, SimResult};

// ── Interval ──────────────────────────────────────────────────────────────────

/// An inclusive `[min, max]` range of minutes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    pub min: u64,
    pub max: u64,
}

impl Interval {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// A degenerate interval that always yields `minutes`.
    pub const fn fixed(minutes: u64) -> Self {
        Self { min: minutes, max: minutes }
    }
}

// ── HubConfig ─────────────────────────────────────────────────────────────────

/// Top-level hub configuration.
///
/// Typically built with `HubConfig::default()` and tweaked field by field, or
/// loaded from JSON by the application (requires the `serde` feature).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HubConfig {
    /// Time an operator spends picking and packing one order.
    pub pick_pack_interval: Interval,

    /// Time a drone is out on one delivery; also the battery discharge time.
    pub flight_interval: Interval,

    /// Time one battery occupies a charger.
    pub charge_interval: Interval,

    /// Period between two scans of the battery store.
    pub battery_queue_interval: Interval,

    /// Time between two incoming orders.
    pub order_creation_interval: Interval,

    /// Length of the operating day (the default run bound).
    pub operating_minutes: u64,

    pub num_pilots:                u32,
    pub num_delivery_specialists:  u32,
    pub num_drones:                u32,
    pub num_chargers:              u32,
    pub num_batteries:             u32,

    /// Slot count of the battery store; must be at least `num_batteries`.
    pub battery_store_capacity:    usize,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Ignore `seed` and draw one from the operating system.
    pub randomize: bool,

    /// Stop the run on the first process failure nothing was waiting on.
    pub abort_on_failure: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            pick_pack_interval:       Interval::new(5, 25),
            flight_interval:          Interval::new(5, 10),
            charge_interval:          Interval::new(30, 60),
            battery_queue_interval:   Interval::new(5, 10),
            order_creation_interval:  Interval::new(10, 45),
            operating_minutes:        12 * 60,
            num_pilots:               2,
            num_delivery_specialists: 1,
            num_drones:               3,
            num_chargers:             4,
            num_batteries:            10,
            battery_store_capacity:   15,
            seed:                     42,
            randomize:                false,
            abort_on_failure:         true,
        }
    }
}

impl HubConfig {
    /// Check that every capacity is positive and every interval is ordered.
    pub fn validate(&self) -> SimResult<()> {
        let intervals = [
            ("pick_pack_interval",      self.pick_pack_interval),
            ("flight_interval",         self.flight_interval),
            ("charge_interval",         self.charge_interval),
            ("battery_queue_interval",  self.battery_queue_interval),
            ("order_creation_interval", self.order_creation_interval),
        ];
        for (name, iv) in intervals {
            if iv.min > iv.max {
                return Err(SimError::Config(format!(
                    "{name}: min {} is greater than max {}",
                    iv.min, iv.max
                )));
            }
        }
        // A zero scan or order period would spin forever at a single instant.
        if self.battery_queue_interval.max == 0 || self.order_creation_interval.max == 0 {
            return Err(SimError::Config(
                "battery_queue_interval and order_creation_interval must allow a positive period".into(),
            ));
        }

        let capacities = [
            ("num_pilots",               self.num_pilots),
            ("num_delivery_specialists", self.num_delivery_specialists),
            ("num_drones",               self.num_drones),
            ("num_chargers",             self.num_chargers),
        ];
        for (name, n) in capacities {
            if n == 0 {
                return Err(SimError::Config(format!("{name} must be positive")));
            }
        }

        if self.battery_store_capacity < self.num_batteries as usize {
            return Err(SimError::Config(format!(
                "battery_store_capacity {} cannot hold {} batteries",
                self.battery_store_capacity, self.num_batteries
            )));
        }
        Ok(())
    }
}
