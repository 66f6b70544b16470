//! Plain data row types written by output backends.
//!
//! Times and durations are whole minutes.  `None` marks a stage the order has
//! not reached; backends write it as an empty field or SQL `NULL`.

use hs_core::SimTime;
use hs_hub::{BatterySample, BatteryStatus, Monitor, Order};

/// One order and its stage timings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub order_id:                u32,
    pub status:                  &'static str,
    pub creation_time:           u64,
    pub start_time:              Option<u64>,
    pub pickpack_start_time:     Option<u64>,
    pub pickpack_duration:       Option<u64>,
    pub pickpack_queue_duration: Option<u64>,
    pub prep_start_time:         Option<u64>,
    pub prep_duration:           Option<u64>,
    pub prep_queue_duration:     Option<u64>,
    pub flight_start_time:       Option<u64>,
    pub flight_duration:         Option<u64>,
    pub flight_queue_duration:   Option<u64>,
    pub completion_time:         Option<u64>,
    pub total_duration:          Option<u64>,
}

impl OrderRow {
    pub const HEADER: [&'static str; 15] = [
        "order_id", "status", "creation_time", "start_time",
        "pickpack_start_time", "pickpack_duration", "pickpack_queue_duration",
        "prep_start_time", "prep_duration", "prep_queue_duration",
        "flight_start_time", "flight_duration", "flight_queue_duration",
        "completion_time", "total_duration",
    ];
}

impl From<&Order> for OrderRow {
    fn from(o: &Order) -> Self {
        let t = |time: Option<SimTime>| time.map(|t| t.0);
        Self {
            order_id:                o.id.0,
            status:                  o.status().as_str(),
            creation_time:           o.creation_time.0,
            start_time:              t(o.start_time),
            pickpack_start_time:     t(o.pickpack_start_time),
            pickpack_duration:       o.pickpack_duration,
            pickpack_queue_duration: o.pickpack_queue_duration,
            prep_start_time:         t(o.prep_start_time),
            prep_duration:           o.prep_duration,
            prep_queue_duration:     o.prep_queue_duration,
            flight_start_time:       t(o.flight_start_time),
            flight_duration:         o.flight_duration,
            flight_queue_duration:   o.flight_queue_duration,
            completion_time:         t(o.completion_time),
            total_duration:          o.total_duration,
        }
    }
}

/// Battery counts per status at one store scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatterySampleRow {
    pub time:   u64,
    /// Indexed by `BatteryStatus::index`.
    pub counts: [u64; 5],
}

impl BatterySampleRow {
    /// `time` followed by one column per status name.
    pub fn header() -> Vec<&'static str> {
        std::iter::once("time")
            .chain(BatteryStatus::ALL.iter().map(|s| s.as_str()))
            .collect()
    }
}

impl From<&BatterySample> for BatterySampleRow {
    fn from(s: &BatterySample) -> Self {
        Self { time: s.at.0, counts: s.counts.map(|c| c as u64) }
    }
}

/// Whole-run totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryRow {
    pub end_time:             u64,
    pub orders_created:       u64,
    pub orders_delivered:     u64,
    pub batteries_charged:    u64,
    pub batteries_discharged: u64,
    pub process_failures:     u64,
    pub mean_wait_time:       Option<f64>,
    pub max_wait_time:        Option<u64>,
}

impl SummaryRow {
    pub const HEADER: [&'static str; 8] = [
        "end_time", "orders_created", "orders_delivered", "batteries_charged",
        "batteries_discharged", "process_failures", "mean_wait_time", "max_wait_time",
    ];

    pub fn new(monitor: &Monitor, end_time: SimTime, process_failures: u64) -> Self {
        Self {
            end_time:             end_time.0,
            orders_created:       monitor.orders.len() as u64,
            orders_delivered:     monitor.orders_delivered,
            batteries_charged:    monitor.batteries_charged,
            batteries_discharged: monitor.batteries_discharged,
            process_failures,
            mean_wait_time:       monitor.mean_wait_time(),
            max_wait_time:        monitor.max_wait_time(),
        }
    }
}
