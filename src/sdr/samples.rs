//! Raw sample decoding
//!
//! The receiver delivers 12-bit unsigned samples, biased by 2048, stored
//! as little-endian 16-bit words.

use std::io::{self, Read};

const BIAS: i16 = 2048;
const SAMPLE_MASK: u16 = 0x0FFF;

/// Decode one little-endian sample word
#[inline]
pub fn decode_sample(lo: u8, hi: u8) -> i16 {
    (u16::from_le_bytes([lo, hi]) & SAMPLE_MASK) as i16 - BIAS
}

/// Fill `buf` from `reader`, stopping early only at end of stream
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Reads batches of signed samples from a byte stream
pub struct SampleDecoder<R> {
    reader: R,
    batch_size: usize,
    bytes: Vec<u8>,
}

impl<R: Read> SampleDecoder<R> {
    /// # Panics
    /// If `batch_size` is zero or not a multiple of 8.
    pub fn new(reader: R, batch_size: usize) -> Self {
        assert!(
            batch_size > 0 && batch_size % 8 == 0,
            "batch size must be a positive multiple of 8, got {}",
            batch_size
        );
        Self {
            reader,
            batch_size,
            bytes: vec![0; batch_size * 2],
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Decode the next batch into `batch`, returning the number of samples
    /// decoded. Fewer than a full batch means the stream is exhausted.
    ///
    /// # Panics
    /// If `batch` is not exactly one batch long.
    pub fn read_batch(&mut self, batch: &mut [i16]) -> io::Result<usize> {
        assert_eq!(batch.len(), self.batch_size, "sample batch has wrong length");

        let read = read_full(&mut self.reader, &mut self.bytes)?;
        let count = read / 2;
        for (sample, word) in batch.iter_mut().zip(self.bytes[..count * 2].chunks_exact(2)) {
            *sample = decode_sample(word[0], word[1]);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_decode_sample_bounds() {
        assert_eq!(decode_sample(0xFF, 0x0F), 2047);
        assert_eq!(decode_sample(0x00, 0x00), -2048);
        assert_eq!(decode_sample(0x00, 0x08), 0);
    }

    #[test]
    fn test_decode_sample_ignores_high_bits() {
        assert_eq!(decode_sample(0xFF, 0xFF), 2047);
        assert_eq!(decode_sample(0x01, 0xF8), 1);
    }

    #[test]
    fn test_read_batch() {
        let bytes: Vec<u8> = (0..16u16).flat_map(|i| (i * 256).to_le_bytes()).collect();
        let mut decoder = SampleDecoder::new(Cursor::new(bytes), 8);
        let mut batch = [0i16; 8];

        assert_eq!(decoder.read_batch(&mut batch).unwrap(), 8);
        assert_eq!(batch[0], -2048);
        assert_eq!(batch[7], 7 * 256 - 2048);

        assert_eq!(decoder.read_batch(&mut batch).unwrap(), 8);
        // 15 * 256 = 0x0F00
        assert_eq!(batch[7], 0x0F00 - 2048);

        assert_eq!(decoder.read_batch(&mut batch).unwrap(), 0);
    }

    #[test]
    fn test_short_final_batch() {
        // 5 samples and a dangling byte
        let mut bytes = vec![0x00, 0x08].repeat(5);
        bytes.push(0xFF);
        let mut decoder = SampleDecoder::new(Cursor::new(bytes), 8);
        let mut batch = [7i16; 8];
        assert_eq!(decoder.read_batch(&mut batch).unwrap(), 5);
        assert_eq!(&batch[..5], &[0; 5]);
    }

    #[test]
    #[should_panic]
    fn test_batch_size_multiple_of_eight() {
        SampleDecoder::new(Cursor::new(Vec::new()), 12);
    }

    #[test]
    #[should_panic]
    fn test_batch_length_checked() {
        let mut decoder = SampleDecoder::new(Cursor::new(Vec::new()), 8);
        let mut batch = [0i16; 16];
        let _ = decoder.read_batch(&mut batch);
    }
}
