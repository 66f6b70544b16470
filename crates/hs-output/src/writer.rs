//! The `MonitorWriter` trait implemented by all backend writers.

use hs_core::SimTime;
use hs_hub::Monitor;

use crate::{BatterySampleRow, OrderRow, OutputResult, SummaryRow};

/// Trait implemented by the CSV and SQLite writers.
pub trait MonitorWriter {
    /// Write a batch of order rows.
    fn write_orders(&mut self, rows: &[OrderRow]) -> OutputResult<()>;

    /// Write a batch of battery census rows.
    fn write_battery_samples(&mut self, rows: &[BatterySampleRow]) -> OutputResult<()>;

    /// Write the single run summary row.
    fn write_summary(&mut self, row: &SummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}

/// Write every table of `monitor` through `writer`, then finish it.
pub fn export<M: MonitorWriter>(
    writer:   &mut M,
    monitor:  &Monitor,
    end_time: SimTime,
    failures: u64,
) -> OutputResult<()> {
    let orders: Vec<OrderRow> = monitor.orders.iter().map(OrderRow::from).collect();
    writer.write_orders(&orders)?;

    let samples: Vec<BatterySampleRow> = monitor.battery_samples.iter().map(BatterySampleRow::from).collect();
    writer.write_battery_samples(&samples)?;

    writer.write_summary(&SummaryRow::new(monitor, end_time, failures))?;
    writer.finish()
}
