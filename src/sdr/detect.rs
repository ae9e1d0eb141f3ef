//! Mode S preamble detection and frame extraction
//!
//! Works on the power stream, one value per 0.1 µs. The preamble has
//! pulses at 0, 1, 3.5 and 4.5 µs, i.e. power offsets 0, 10, 35 and 45.
//! Data follows at 8 µs, one bit per µs in pulse position modulation:
//! a pulse in the first half encodes 1, in the second half 0.

use std::io::{self, Read};

use tracing::trace;

use crate::adsb::RawMessage;

use super::power::{PowerComputer, PowerSource};
use super::window::{PowerWindow, DEFAULT_BATCH_SIZE};

/// Window long enough for the preamble and a 112-bit frame
pub const WINDOW_SIZE: usize = 1200;

/// Duration of one power value
const NS_PER_POWER: u64 = 100;

const PULSES: [usize; 4] = [0, 10, 35, 45];
const VALLEYS: [usize; 6] = [5, 15, 20, 25, 30, 40];
const DATA_START: usize = 80;
const BIT_PERIOD: usize = 10;
const HALF_BIT: usize = 5;

#[derive(Debug, Default, Clone)]
pub struct DetectorStats {
    pub preambles_detected: u64,
    pub frames_decoded: u64,
    pub crc_errors: u64,
}

/// Extracts CRC-valid extended squitters from a power stream
pub struct Demodulator<S> {
    window: PowerWindow<S>,
    pub stats: DetectorStats,
}

impl<R: Read> Demodulator<PowerComputer<R>> {
    /// Demodulator reading raw samples from `reader`
    pub fn new(reader: R) -> io::Result<Self> {
        Self::with_source(PowerComputer::new(reader, DEFAULT_BATCH_SIZE))
    }
}

impl<S: PowerSource> Demodulator<S> {
    pub fn with_source(source: S) -> io::Result<Self> {
        Ok(Self {
            window: PowerWindow::new(source, WINDOW_SIZE)?,
            stats: DetectorStats::default(),
        })
    }

    /// Next valid frame, or `None` once the stream is exhausted
    pub fn next_message(&mut self) -> io::Result<Option<RawMessage>> {
        while self.window.is_full() {
            if !self.preamble_peak() {
                self.window.advance()?;
                continue;
            }

            self.stats.preambles_detected += 1;
            // Centre the window on the pulse peaks
            self.window.advance()?;
            if !self.window.is_full() {
                break;
            }

            let bytes = self.frame_bytes();
            if RawMessage::size(bytes[0]) != RawMessage::LENGTH {
                self.stats.crc_errors += 1;
                continue;
            }

            let timestamp_ns = self.window.position() * NS_PER_POWER;
            match RawMessage::of(timestamp_ns, &bytes) {
                Some(message) => {
                    self.stats.frames_decoded += 1;
                    trace!(
                        "Frame at {} ns: DF={} hex={}",
                        timestamp_ns,
                        message.downlink_format(),
                        hex::encode_upper(bytes)
                    );
                    self.window.advance_by(WINDOW_SIZE as u64)?;
                    return Ok(Some(message));
                }
                None => self.stats.crc_errors += 1,
            }
        }
        Ok(None)
    }

    fn sum_at(&self, offsets: &[usize], shift: usize) -> u64 {
        offsets
            .iter()
            .map(|&offset| self.window.get(offset + shift) as u64)
            .sum()
    }

    /// Whether the preamble pulses peak at the next position
    fn preamble_peak(&self) -> bool {
        let previous = self.sum_at(&PULSES, 0);
        let current = self.sum_at(&PULSES, 1);
        let next = self.sum_at(&PULSES, 2);
        let valleys = self.sum_at(&VALLEYS, 0);

        current >= 2 * valleys && current > previous && current > next
    }

    fn frame_bytes(&self) -> [u8; RawMessage::LENGTH] {
        let mut bytes = [0u8; RawMessage::LENGTH];
        for bit in 0..RawMessage::LENGTH * 8 {
            let first_half = self.window.get(DATA_START + bit * BIT_PERIOD);
            let second_half = self.window.get(DATA_START + HALF_BIT + bit * BIT_PERIOD);
            if first_half >= second_half {
                bytes[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        bytes
    }
}
