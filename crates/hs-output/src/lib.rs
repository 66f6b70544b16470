//! `hs-output`: monitor export for the hubsim framework.
//!
//! Two backends are provided, the second behind a Cargo feature:
//!
//! | Feature   | Backend     | Files created                                        |
//! |-----------|-------------|------------------------------------------------------|
//! | *(none)*  | CSV         | `orders.csv`, `battery_samples.csv`, `summary.csv`   |
//! | `sqlite`  | SQLite      | `output.db`                                          |
//!
//! Both implement [`MonitorWriter`] and are driven by [`MonitorObserver`],
//! which implements `hs_kernel::EnvObserver<Hub>`, or called directly with
//! [`export`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use hs_output::{CsvWriter, MonitorObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output")).unwrap();
//! let mut obs = MonitorObserver::new(writer);
//! env.run_observed(Some(until), &mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::MonitorObserver;
pub use row::{BatterySampleRow, OrderRow, SummaryRow};
pub use writer::{export, MonitorWriter};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
