//! Signal power computation
//!
//! Converts the sample stream into a power stream at half the sample rate.
//! Each power value is computed from the 8 most recent samples, which
//! correlate the in-phase and quadrature components of the carrier.

use std::io::{self, Read};

use super::samples::SampleDecoder;

const HISTORY: usize = 8;

/// Source of power batches feeding the sliding window
pub trait PowerSource {
    /// Number of values requested by each call to [`PowerSource::read_batch`]
    fn batch_size(&self) -> usize;

    /// Fill `batch` with the next power values, returning how many were
    /// written. Fewer than a full batch means the source is exhausted.
    fn read_batch(&mut self, batch: &mut [u32]) -> io::Result<usize>;
}

/// Computes signal power from a raw sample stream
pub struct PowerComputer<R> {
    decoder: SampleDecoder<R>,
    batch_size: usize,
    samples: Vec<i16>,
    history: [i32; HISTORY],
    /// Absolute index of the next sample
    sample_index: u64,
}

impl<R: Read> PowerComputer<R> {
    /// # Panics
    /// If `batch_size` is zero or not a multiple of 8.
    pub fn new(reader: R, batch_size: usize) -> Self {
        assert!(
            batch_size > 0 && batch_size % 8 == 0,
            "batch size must be a positive multiple of 8, got {}",
            batch_size
        );
        Self {
            decoder: SampleDecoder::new(reader, batch_size * 2),
            batch_size,
            samples: vec![0; batch_size * 2],
            history: [0; HISTORY],
            sample_index: 0,
        }
    }

    #[inline]
    fn push_sample(&mut self, sample: i16) {
        self.history[(self.sample_index % HISTORY as u64) as usize] = sample as i32;
        self.sample_index += 1;
    }

    #[inline]
    fn power(&self) -> u32 {
        let s = &self.history;
        let i = s[1] - s[3] + s[5] - s[7];
        let q = s[0] - s[2] + s[4] - s[6];
        (i * i + q * q) as u32
    }
}

impl<R: Read> PowerSource for PowerComputer<R> {
    fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// # Panics
    /// If `batch` is not exactly one batch long.
    fn read_batch(&mut self, batch: &mut [u32]) -> io::Result<usize> {
        assert_eq!(batch.len(), self.batch_size, "power batch has wrong length");

        let mut samples = std::mem::take(&mut self.samples);
        let read = self.decoder.read_batch(&mut samples);
        let count = match read {
            Ok(n) => n / 2,
            Err(e) => {
                self.samples = samples;
                return Err(e);
            }
        };

        for (power, pair) in batch.iter_mut().zip(samples[..count * 2].chunks_exact(2)) {
            self.push_sample(pair[0]);
            self.push_sample(pair[1]);
            *power = self.power();
        }

        self.samples = samples;
        Ok(count)
    }
}
