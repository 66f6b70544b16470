//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `orders.csv`
//! - `battery_samples.csv`
//! - `summary.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::MonitorWriter;
use crate::{BatterySampleRow, OrderRow, OutputResult, SummaryRow};

/// Writes a run monitor to three CSV files.
pub struct CsvWriter {
    orders:   Writer<File>,
    samples:  Writer<File>,
    summary:  Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the three CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut orders = Writer::from_path(dir.join("orders.csv"))?;
        orders.write_record(OrderRow::HEADER)?;

        let mut samples = Writer::from_path(dir.join("battery_samples.csv"))?;
        samples.write_record(BatterySampleRow::header())?;

        let mut summary = Writer::from_path(dir.join("summary.csv"))?;
        summary.write_record(SummaryRow::HEADER)?;

        Ok(Self { orders, samples, summary, finished: false })
    }
}

/// Empty field for a stage not reached.
fn opt(v: Option<u64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

impl MonitorWriter for CsvWriter {
    fn write_orders(&mut self, rows: &[OrderRow]) -> OutputResult<()> {
        for row in rows {
            self.orders.write_record(&[
                row.order_id.to_string(),
                row.status.to_string(),
                row.creation_time.to_string(),
                opt(row.start_time),
                opt(row.pickpack_start_time),
                opt(row.pickpack_duration),
                opt(row.pickpack_queue_duration),
                opt(row.prep_start_time),
                opt(row.prep_duration),
                opt(row.prep_queue_duration),
                opt(row.flight_start_time),
                opt(row.flight_duration),
                opt(row.flight_queue_duration),
                opt(row.completion_time),
                opt(row.total_duration),
            ])?;
        }
        Ok(())
    }

    fn write_battery_samples(&mut self, rows: &[BatterySampleRow]) -> OutputResult<()> {
        for row in rows {
            let record: Vec<String> = std::iter::once(row.time)
                .chain(row.counts)
                .map(|v| v.to_string())
                .collect();
            self.samples.write_record(&record)?;
        }
        Ok(())
    }

    fn write_summary(&mut self, row: &SummaryRow) -> OutputResult<()> {
        self.summary.write_record(&[
            row.end_time.to_string(),
            row.orders_created.to_string(),
            row.orders_delivered.to_string(),
            row.batteries_charged.to_string(),
            row.batteries_discharged.to_string(),
            row.process_failures.to_string(),
            row.mean_wait_time.map(|m| format!("{m:.3}")).unwrap_or_default(),
            opt(row.max_wait_time),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.orders.flush()?;
        self.samples.flush()?;
        self.summary.flush()?;
        Ok(())
    }
}
