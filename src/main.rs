//! ADS-B Tracker
//!
//! Demodulates raw receiver samples (or replays a recorded message file),
//! decodes ADS-B extended squitters and tracks every aircraft heard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use adsb_tracker::adsb::RawMessage;
use adsb_tracker::aircraft::{AircraftDatabase, CsvAircraftDatabase, EmptyDatabase};
use adsb_tracker::aircraft_tracker::AircraftTracker;
use adsb_tracker::config::Config;
use adsb_tracker::decoder::ReplayRunner;
use adsb_tracker::device::{DeviceStats, MessageDriver};
use adsb_tracker::sdr::spawn_capture;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("===========================================");
    info!("   ADS-B Tracker");
    info!("===========================================");

    info!("Configuration:");
    match &config.replay_file {
        Some(path) => info!("  Replay file: {} (realtime: {})", path.display(), config.replay_realtime),
        None => info!("  Sample source: {}", config.sample_source),
    }
    if let Some(path) = &config.aircraft_db {
        info!("  Aircraft database: {}", path.display());
    }
    info!("  Queue capacity: {}", config.queue_capacity);
    info!("  Stats interval: {}s", config.stats_interval_secs);

    let database: Box<dyn AircraftDatabase> = match &config.aircraft_db {
        Some(path) => Box::new(
            CsvAircraftDatabase::open(path)
                .with_context(|| format!("Failed to load aircraft database {}", path.display()))?,
        ),
        None => Box::new(EmptyDatabase),
    };

    let (tx, rx) = crossbeam_channel::bounded::<RawMessage>(config.queue_capacity);
    let running = Arc::new(AtomicBool::new(true));
    let stats = Arc::new(DeviceStats::new());

    let producer = match &config.replay_file {
        Some(path) => ReplayRunner::new(path, config.replay_realtime).spawn(tx, running.clone(), stats.clone())?,
        None => spawn_capture(config.sample_source.clone(), tx, running.clone(), stats.clone())?,
    };

    let driver = MessageDriver::new(rx, AircraftTracker::new(database), stats.clone(), running.clone())
        .with_stats_interval(Duration::from_secs(config.stats_interval_secs))
        .with_snapshots(config.snapshot_json);

    info!("Press Ctrl+C to stop.");
    let mut driver_handle = tokio::task::spawn_blocking(move || driver.run());

    let summary = tokio::select! {
        result = &mut driver_handle => {
            // Producer finished first; its thread has already flagged the stop
            if producer.join().is_err() {
                warn!("Producer thread panicked");
            }
            result.context("Driver task failed")??
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
            running.store(false, Ordering::SeqCst);
            driver_handle.await.context("Driver task failed")??
        }
    };

    info!("Shutdown complete. {} | {}", stats, summary);
    Ok(())
}
