//! Sliding window over the power stream
//!
//! Power values live in a ring buffer of two batches indexed by absolute
//! position, so sliding never copies data.

use std::io;

use super::power::PowerSource;

/// Default number of power values read from the source at once
pub const DEFAULT_BATCH_SIZE: usize = 1 << 16;

pub struct PowerWindow<S> {
    source: S,
    window_size: usize,
    ring: Vec<u32>,
    batch: Vec<u32>,
    /// Absolute index of the first value in the window
    position: u64,
    /// Number of values read from the source so far
    produced: u64,
    exhausted: bool,
}

impl<S: PowerSource> PowerWindow<S> {
    /// # Panics
    /// If `window_size` is zero or larger than the source batch size.
    pub fn new(source: S, window_size: usize) -> io::Result<Self> {
        let batch_size = source.batch_size();
        assert!(
            window_size > 0 && window_size <= batch_size,
            "window size {} outside (0, {}]",
            window_size,
            batch_size
        );

        let mut window = Self {
            source,
            window_size,
            ring: vec![0; batch_size * 2],
            batch: vec![0; batch_size],
            position: 0,
            produced: 0,
            exhausted: false,
        };
        window.fill()?;
        Ok(window)
    }

    pub fn size(&self) -> usize {
        self.window_size
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// True while the whole window holds values read from the source
    pub fn is_full(&self) -> bool {
        self.produced >= self.position + self.window_size as u64
    }

    /// Power value at `offset` from the start of the window
    ///
    /// # Panics
    /// If `offset` is not within the window.
    #[inline]
    pub fn get(&self, offset: usize) -> u32 {
        assert!(
            offset < self.window_size,
            "offset {} outside window of {}",
            offset,
            self.window_size
        );
        let index = (self.position + offset as u64) % self.ring.len() as u64;
        self.ring[index as usize]
    }

    /// Slide the window by one value
    pub fn advance(&mut self) -> io::Result<()> {
        self.advance_by(1)
    }

    /// Slide the window by `count` values
    pub fn advance_by(&mut self, count: u64) -> io::Result<()> {
        self.position += count;
        self.fill()
    }

    fn fill(&mut self) -> io::Result<()> {
        let capacity = self.ring.len() as u64;
        while !self.exhausted && !self.is_full() {
            let read = self.source.read_batch(&mut self.batch)?;
            for (i, &power) in self.batch[..read].iter().enumerate() {
                self.ring[((self.produced + i as u64) % capacity) as usize] = power;
            }
            self.produced += read as u64;
            if read < self.batch.len() {
                self.exhausted = true;
            }
        }
        Ok(())
    }
}
