//! Message driver - drains the raw message queue into the tracker

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{info, trace};

use crate::adsb::{parse_message, RawMessage};
use crate::aircraft_tracker::{AircraftSnapshot, AircraftTracker, TrackerStats};

use super::state::DeviceStats;

const RECV_TIMEOUT: Duration = Duration::from_millis(500);

/// Message time between two purges of silent aircraft
const PURGE_INTERVAL_NS: u64 = 1_000_000_000;

/// Parses queued frames and feeds the aircraft tracker
pub struct MessageDriver {
    rx: Receiver<RawMessage>,
    tracker: AircraftTracker,
    stats: Arc<DeviceStats>,
    running: Arc<AtomicBool>,
    stats_interval: Duration,
    snapshot_json: bool,
    last_purge_ns: u64,
}

impl MessageDriver {
    pub fn new(
        rx: Receiver<RawMessage>,
        tracker: AircraftTracker,
        stats: Arc<DeviceStats>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            rx,
            tracker,
            stats,
            running,
            stats_interval: Duration::from_secs(10),
            snapshot_json: false,
            last_purge_ns: 0,
        }
    }

    pub fn with_stats_interval(mut self, interval: Duration) -> Self {
        self.stats_interval = interval;
        self
    }

    /// Write a JSON line per updated aircraft
    pub fn with_snapshots(mut self, enabled: bool) -> Self {
        self.snapshot_json = enabled;
        self
    }

    /// Run until the queue closes or a stop is requested, writing
    /// snapshots to stdout
    pub fn run(self) -> Result<TrackerStats> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with(&mut out)
    }

    pub fn run_with<W: Write>(mut self, out: &mut W) -> Result<TrackerStats> {
        info!("Starting message driver");
        let mut last_stats_log = Instant::now();

        loop {
            match self.rx.recv_timeout(RECV_TIMEOUT) {
                Ok(raw) => self.handle(&raw, out)?,
                Err(RecvTimeoutError::Timeout) => {
                    if !self.running.load(Ordering::SeqCst) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    info!("Raw message channel closed");
                    break;
                }
            }

            if last_stats_log.elapsed() >= self.stats_interval {
                info!("[Stats] {}", self.stats);
                info!("[Tracker] {}", self.tracker.stats_summary());
                last_stats_log = Instant::now();
            }
        }

        let summary = self.tracker.stats_summary();
        info!("Driver stopped. {} | {}", self.stats, summary);
        Ok(summary)
    }

    /// Parse one frame and apply it to the tracker
    pub fn handle<W: Write>(&mut self, raw: &RawMessage, out: &mut W) -> Result<()> {
        let Some(message) = parse_message(raw) else {
            self.stats.record_ignored();
            trace!("Ignoring frame with type code {}: {}", raw.type_code(), raw.bytes());
            return Ok(());
        };
        self.stats.record_decoded();

        let state = self.tracker.update_with_message(&message);
        if self.snapshot_json {
            serde_json::to_writer(&mut *out, &AircraftSnapshot::of(state))
                .context("Failed to write snapshot")?;
            writeln!(out).context("Failed to write snapshot")?;
        }

        let now_ns = message.timestamp_ns();
        if now_ns.saturating_sub(self.last_purge_ns) >= PURGE_INTERVAL_NS {
            self.tracker.purge();
            self.last_purge_ns = now_ns;
        }
        Ok(())
    }

    pub fn tracker(&self) -> &AircraftTracker {
        &self.tracker
    }
}
