//! Pipeline state tracking

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

/// Counters shared between the producer thread and the driver
#[derive(Debug)]
pub struct DeviceStats {
    pub frames_received: AtomicU64,
    pub frames_dropped: AtomicU64,
    pub preambles_detected: AtomicU64,
    pub crc_errors: AtomicU64,
    pub messages_decoded: AtomicU64,
    pub messages_ignored: AtomicU64,
    started_at: DateTime<Utc>,
}

impl Default for DeviceStats {
    fn default() -> Self {
        Self {
            frames_received: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
            preambles_detected: AtomicU64::new(0),
            crc_errors: AtomicU64::new(0),
            messages_decoded: AtomicU64::new(0),
            messages_ignored: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }
}

impl DeviceStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decoded(&self) {
        self.messages_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ignored(&self) {
        self.messages_ignored.fetch_add(1, Ordering::Relaxed);
    }

    /// Publish the demodulator counters
    pub fn set_detector(&self, preambles_detected: u64, crc_errors: u64) {
        self.preambles_detected.store(preambles_detected, Ordering::Relaxed);
        self.crc_errors.store(crc_errors, Ordering::Relaxed);
    }

    pub fn get_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    pub fn get_dropped(&self) -> u64 {
        self.frames_dropped.load(Ordering::Relaxed)
    }

    pub fn get_decoded(&self) -> u64 {
        self.messages_decoded.load(Ordering::Relaxed)
    }

    pub fn get_ignored(&self) -> u64 {
        self.messages_ignored.load(Ordering::Relaxed)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn uptime(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}

impl fmt::Display for DeviceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frames: {} (dropped {}) | Preambles: {} | CRC errors: {} | Decoded: {} | Ignored: {} | Uptime: {}s",
            self.get_received(),
            self.get_dropped(),
            self.preambles_detected.load(Ordering::Relaxed),
            self.crc_errors.load(Ordering::Relaxed),
            self.get_decoded(),
            self.get_ignored(),
            self.uptime().num_seconds()
        )
    }
}
