//! Replay runner - feeds recorded raw messages into the queue
//!
//! Two recording formats are understood:
//! - binary: records of an `i64` big-endian timestamp in nanoseconds
//!   followed by the 14 frame bytes
//! - text: one `*<28 hex digits>;` line per frame, stamped on arrival

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use tracing::{debug, error, info, warn};

use crate::adsb::RawMessage;
use crate::device::DeviceStats;
use crate::error::Error;
use crate::sdr::samples::read_full;

/// Length of one binary record
pub const RECORD_LENGTH: usize = 8 + RawMessage::LENGTH;

/// Longest single sleep while pacing, so a stop request is noticed
const MAX_SLEEP: Duration = Duration::from_millis(100);

/// Reader of binary message records
pub struct RecordReader<R> {
    reader: R,
    index: u64,
    skipped: u64,
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            index: 0,
            skipped: 0,
        }
    }

    /// Number of records dropped for a bad CRC
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Next CRC-valid message, `None` at end of file
    pub fn next_message(&mut self) -> crate::Result<Option<RawMessage>> {
        loop {
            let mut record = [0u8; RECORD_LENGTH];
            let read = read_full(&mut self.reader, &mut record)?;
            if read == 0 {
                return Ok(None);
            }

            let index = self.index;
            self.index += 1;
            if read < RECORD_LENGTH {
                return Err(Error::InvalidRecord {
                    index,
                    reason: format!("truncated to {} bytes", read),
                });
            }

            let mut timestamp = [0u8; 8];
            timestamp.copy_from_slice(&record[..8]);
            let timestamp_ns = i64::from_be_bytes(timestamp);
            if timestamp_ns < 0 {
                return Err(Error::InvalidRecord {
                    index,
                    reason: format!("negative timestamp {}", timestamp_ns),
                });
            }

            match RawMessage::of(timestamp_ns as u64, &record[8..]) {
                Some(message) => return Ok(Some(message)),
                None => {
                    self.skipped += 1;
                    debug!("Skipping record #{} with bad CRC: {}", index, hex::encode_upper(&record[8..]));
                }
            }
        }
    }
}

/// Parse a text recording line: `*<hex_bytes>;`
/// Returns the frame bytes if the line holds a 14-byte frame
pub fn parse_hex_line(line: &str) -> Option<Vec<u8>> {
    let line = line.trim();

    let hex_str = line.strip_prefix('*')?;
    let end_idx = hex_str.find(';')?;
    let hex_str = &hex_str[..end_idx];

    if hex_str.len() != RawMessage::LENGTH * 2 {
        return None;
    }

    hex::decode(hex_str).ok()
}

/// Replays a recording file into the raw message queue
pub struct ReplayRunner {
    path: PathBuf,
    realtime: bool,
}

impl ReplayRunner {
    pub fn new(path: impl Into<PathBuf>, realtime: bool) -> Self {
        Self {
            path: path.into(),
            realtime,
        }
    }

    fn is_text(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("txt" | "log")
        )
    }

    /// Start replaying on a dedicated thread
    pub fn spawn(
        self,
        tx: Sender<RawMessage>,
        running: Arc<AtomicBool>,
        stats: Arc<DeviceStats>,
    ) -> Result<JoinHandle<()>> {
        info!(
            "Replaying {} ({})",
            self.path.display(),
            if self.realtime { "realtime" } else { "as fast as possible" }
        );

        thread::Builder::new()
            .name("replay".to_string())
            .spawn(move || {
                if let Err(e) = self.run(&tx, &running, &stats) {
                    error!("Replay error: {:#}", e);
                }
                running.store(false, Ordering::SeqCst);
            })
            .context("Failed to spawn replay thread")
    }

    fn run(&self, tx: &Sender<RawMessage>, running: &AtomicBool, stats: &DeviceStats) -> Result<()> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open recording {}", self.path.display()))?;
        let start = Instant::now();

        if Self::is_text(&self.path) {
            let mut parse_errors = 0u64;
            for line in BufReader::new(file).lines() {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let line = line.context("Failed to read recording")?;
                let Some(bytes) = parse_hex_line(&line) else {
                    if line.starts_with('*') {
                        parse_errors += 1;
                        debug!("Failed to parse line: {}", line);
                    }
                    continue;
                };
                let timestamp_ns = start.elapsed().as_nanos() as u64;
                let Some(message) = RawMessage::of(timestamp_ns, &bytes) else {
                    parse_errors += 1;
                    continue;
                };
                if !self.send(message, tx, stats) {
                    break;
                }
            }
            info!("Replay finished. Parse errors: {}", parse_errors);
        } else {
            let mut reader = RecordReader::new(BufReader::new(file));
            while running.load(Ordering::SeqCst) {
                let Some(message) = reader.next_message().context("Failed to read recording")? else {
                    break;
                };
                if self.realtime {
                    pace(start, message.timestamp_ns(), running);
                }
                if !self.send(message, tx, stats) {
                    break;
                }
            }
            info!("Replay finished. Skipped records: {}", reader.skipped());
        }
        Ok(())
    }

    /// Blocking send; false once the driver has gone away
    fn send(&self, message: RawMessage, tx: &Sender<RawMessage>, stats: &DeviceStats) -> bool {
        stats.record_frame();
        if tx.send(message).is_err() {
            warn!("Channel closed, stopping replay");
            return false;
        }
        true
    }
}

/// Sleep until `timestamp_ns` after `start`, waking regularly to check `running`
fn pace(start: Instant, timestamp_ns: u64, running: &AtomicBool) {
    let target = Duration::from_nanos(timestamp_ns);
    while running.load(Ordering::SeqCst) {
        let elapsed = start.elapsed();
        if elapsed >= target {
            break;
        }
        thread::sleep((target - elapsed).min(MAX_SLEEP));
    }
}
