//! `Monitor`: counters and timeseries gathered during a run.
//!
//! Domain processes only ever append here.  Exporters read it after (or
//! during) a run; nothing in the simulation reads it back.

use hs_core::SimTime;

use crate::{BatteryStatus, Order};

/// Battery counts per status, taken at one battery-store scan.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatterySample {
    pub at:     SimTime,
    /// Indexed by [`BatteryStatus::index`].
    pub counts: [usize; 5],
}

impl BatterySample {
    pub fn count(&self, status: BatteryStatus) -> usize {
        self.counts[status.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Monitor {
    /// Creation-to-completion time of each delivered order.
    pub wait_times:           Vec<u64>,
    /// Completion time of each delivered order.
    pub delivery_times:       Vec<SimTime>,
    pub orders_delivered:     u64,
    pub batteries_charged:    u64,
    pub batteries_discharged: u64,
    /// When each discharge finished.
    pub discharge_times:      Vec<SimTime>,
    pub battery_samples:      Vec<BatterySample>,
    /// Every order created, indexed by `OrderId`.
    pub orders:               Vec<Order>,
}

impl Monitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mean creation-to-completion time, or `None` before the first delivery.
    pub fn mean_wait_time(&self) -> Option<f64> {
        if self.wait_times.is_empty() {
            return None;
        }
        Some(self.wait_times.iter().sum::<u64>() as f64 / self.wait_times.len() as f64)
    }

    pub fn max_wait_time(&self) -> Option<u64> {
        self.wait_times.iter().copied().max()
    }

    /// Orders created but not yet delivered.
    pub fn orders_in_flight(&self) -> usize {
        self.orders.iter().filter(|o| !o.is_completed()).count()
    }
}
