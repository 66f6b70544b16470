//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `orders`, `battery_samples` and `summary`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::MonitorWriter;
use crate::{BatterySampleRow, OrderRow, OutputResult, SummaryRow};

/// Writes a run monitor to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS orders (
                 order_id                INTEGER PRIMARY KEY,
                 status                  TEXT    NOT NULL,
                 creation_time           INTEGER NOT NULL,
                 start_time              INTEGER,
                 pickpack_start_time     INTEGER,
                 pickpack_duration       INTEGER,
                 pickpack_queue_duration INTEGER,
                 prep_start_time         INTEGER,
                 prep_duration           INTEGER,
                 prep_queue_duration     INTEGER,
                 flight_start_time       INTEGER,
                 flight_duration         INTEGER,
                 flight_queue_duration   INTEGER,
                 completion_time         INTEGER,
                 total_duration          INTEGER
             );
             CREATE TABLE IF NOT EXISTS battery_samples (
                 time              INTEGER NOT NULL,
                 charging_queue    INTEGER NOT NULL,
                 charging_active   INTEGER NOT NULL,
                 charging_inactive INTEGER NOT NULL,
                 deployment_queue  INTEGER NOT NULL,
                 deployed          INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS summary (
                 end_time             INTEGER NOT NULL,
                 orders_created       INTEGER NOT NULL,
                 orders_delivered     INTEGER NOT NULL,
                 batteries_charged    INTEGER NOT NULL,
                 batteries_discharged INTEGER NOT NULL,
                 process_failures     INTEGER NOT NULL,
                 mean_wait_time       REAL,
                 max_wait_time        INTEGER
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl MonitorWriter for SqliteWriter {
    fn write_orders(&mut self, rows: &[OrderRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO orders \
                 (order_id, status, creation_time, start_time, \
                  pickpack_start_time, pickpack_duration, pickpack_queue_duration, \
                  prep_start_time, prep_duration, prep_queue_duration, \
                  flight_start_time, flight_duration, flight_queue_duration, \
                  completion_time, total_duration) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.order_id,
                    row.status,
                    row.creation_time,
                    row.start_time,
                    row.pickpack_start_time,
                    row.pickpack_duration,
                    row.pickpack_queue_duration,
                    row.prep_start_time,
                    row.prep_duration,
                    row.prep_queue_duration,
                    row.flight_start_time,
                    row.flight_duration,
                    row.flight_queue_duration,
                    row.completion_time,
                    row.total_duration,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_battery_samples(&mut self, rows: &[BatterySampleRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO battery_samples \
                 (time, charging_queue, charging_active, charging_inactive, deployment_queue, deployed) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in rows {
                let [cq, ca, ci, dq, d] = row.counts;
                stmt.execute(rusqlite::params![row.time, cq, ca, ci, dq, d])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_summary(&mut self, row: &SummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO summary \
             (end_time, orders_created, orders_delivered, batteries_charged, \
              batteries_discharged, process_failures, mean_wait_time, max_wait_time) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                row.end_time,
                row.orders_created,
                row.orders_delivered,
                row.batteries_charged,
                row.batteries_discharged,
                row.process_failures,
                row.mean_wait_time,
                row.max_wait_time,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
