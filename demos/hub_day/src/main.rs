//! hub_day: one operating day of a drone delivery hub.
//!
//! Runs the default hub (or a JSON config given as the first argument),
//! writes the monitor to `output/hub_day/` as CSV, then repeats the day
//! over a handful of seeds in parallel to show the spread in wait times.
//!
//! Set `RUST_LOG=debug` (or `trace`) for per-order and per-event logs.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;
use rayon::prelude::*;

use hs_core::{HubConfig, SimResult, SimRng, SimTime};
use hs_hub::{HubBuilder, run_day};
use hs_output::{CsvWriter, MonitorObserver};

// ── Constants ─────────────────────────────────────────────────────────────────

const OUTPUT_DIR:   &str = "output/hub_day";
const REPLICATIONS: u64  = 16;

// ── Config ────────────────────────────────────────────────────────────────────

fn load_config() -> Result<HubConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(HubConfig::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config: HubConfig = serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    info!("loaded config from {path}");
    Ok(config)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    println!("=== hub_day: drone delivery hub ===");
    println!(
        "Operators: {}  |  Pilots: {}  |  Drones: {}  |  Chargers: {}  |  Batteries: {}",
        config.num_delivery_specialists,
        config.num_pilots,
        config.num_drones,
        config.num_chargers,
        config.num_batteries,
    );
    println!("Day length: {} min  |  Seed: {}", config.operating_minutes, config.seed);
    println!();

    // 1. Single observed run with CSV export.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let mut obs = MonitorObserver::new(CsvWriter::new(Path::new(OUTPUT_DIR))?);
    let until = SimTime(config.operating_minutes);
    let mut env = HubBuilder::new(config.clone()).build()?;

    let t0 = Instant::now();
    let outcome = env.run_observed(Some(until), &mut obs);
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }
    outcome?;

    let monitor = &env.world().monitor;
    println!("Simulation complete in {:.3} s (clock at {})", elapsed.as_secs_f64(), env.now());
    println!("  orders created      : {}", monitor.orders.len());
    println!("  orders delivered    : {}", monitor.orders_delivered);
    println!("  orders in progress  : {}", monitor.orders_in_flight());
    println!("  batteries charged   : {}", monitor.batteries_charged);
    println!("  batteries discharged: {}", monitor.batteries_discharged);
    match (monitor.mean_wait_time(), monitor.max_wait_time()) {
        (Some(mean), Some(max)) => println!("  wait time           : mean {mean:.1} min, max {max} min"),
        _ => println!("  wait time           : no deliveries"),
    }
    println!("  process failures    : {}", obs.failures());
    println!("CSV written to {OUTPUT_DIR}/");
    println!();

    // 2. Seed replications, one day per rayon task.
    let mut root = SimRng::new(config.seed);
    let seeds: Vec<u64> = (0..REPLICATIONS).map(|i| root.child(i).seed()).collect();
    let results: Vec<(u64, u64, Option<f64>)> = seeds
        .into_par_iter()
        .map(|seed| -> SimResult<(u64, u64, Option<f64>)> {
            let (env, outcome) = run_day(HubConfig { seed, randomize: false, ..config.clone() })?;
            outcome?;
            let monitor = &env.world().monitor;
            Ok((seed, monitor.orders_delivered, monitor.mean_wait_time()))
        })
        .collect::<SimResult<_>>()?;

    println!("{:<22} {:<10} {:<10}", "Seed", "Delivered", "Mean wait");
    println!("{}", "-".repeat(44));
    for (seed, delivered, mean) in results {
        let mean = mean.map(|m| format!("{m:.1}")).unwrap_or_else(|| "-".into());
        println!("{seed:<22} {delivered:<10} {mean:<10}");
    }

    Ok(())
}
