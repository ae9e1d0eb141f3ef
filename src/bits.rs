//! Bit-field extraction and immutable byte strings

use std::fmt;

/// Width in bits of the values accepted by [`extract_unsigned`] and [`test_bit`]
const VALUE_BITS: u32 = u64::BITS;

/// Extract the `size`-bit unsigned field of `value` starting at bit `start`
/// (bit 0 is the least significant).
///
/// # Panics
/// If `size` is not in `1..32`, or if `start..start + size` does not fit in 64 bits.
pub fn extract_unsigned(value: u64, start: u32, size: u32) -> u32 {
    assert!(
        (1..u32::BITS).contains(&size),
        "bit field size {} out of range 1..{}",
        size,
        u32::BITS
    );
    assert!(
        start < VALUE_BITS && start + size <= VALUE_BITS,
        "bit range {}..{} exceeds {} bits",
        start,
        start + size,
        VALUE_BITS
    );

    let mask = (1u64 << size) - 1;
    ((value >> start) & mask) as u32
}

/// True iff bit `index` of `value` is set.
///
/// # Panics
/// If `index` is not in `0..64`.
pub fn test_bit(value: u64, index: u32) -> bool {
    assert!(index < VALUE_BITS, "bit index {} exceeds {} bits", index, VALUE_BITS);
    (value >> index) & 1 == 1
}

/// Immutable sequence of bytes
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ByteString {
    bytes: Box<[u8]>,
}

impl ByteString {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Parse an even-length string of hex digits (either case).
    ///
    /// # Panics
    /// If the string has odd length or contains a non-hex character.
    pub fn from_hex(hex_str: &str) -> Self {
        assert!(hex_str.len() % 2 == 0, "odd hex string length {}", hex_str.len());
        match hex::decode(hex_str) {
            Ok(bytes) => Self {
                bytes: bytes.into_boxed_slice(),
            },
            Err(e) => panic!("invalid hex string {:?}: {}", hex_str, e),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Unsigned byte at `index`
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn byte_at(&self, index: usize) -> u8 {
        assert!(index < self.bytes.len(), "byte index {} out of bounds ({})", index, self.bytes.len());
        self.bytes[index]
    }

    /// Bytes `from..to` read as a big-endian unsigned integer
    ///
    /// # Panics
    /// If the range is not within the string, or spans more than 8 bytes.
    pub fn bytes_in_range(&self, from: usize, to: usize) -> u64 {
        assert!(
            from <= to && to <= self.bytes.len(),
            "byte range {}..{} out of bounds ({})",
            from,
            to,
            self.bytes.len()
        );
        assert!(to - from <= std::mem::size_of::<u64>(), "byte range {}..{} wider than u64", from, to);

        self.bytes[from..to]
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | b as u64)
    }
}

impl fmt::Display for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(&self.bytes))
    }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteString({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_extract_unsigned() {
        let value = 0xFEDC_BA98_7654_3210u64;
        assert_eq!(extract_unsigned(value, 0, 4), 0x0);
        assert_eq!(extract_unsigned(value, 4, 8), 0x21);
        assert_eq!(extract_unsigned(value, 60, 4), 0xF);
        assert_eq!(extract_unsigned(value, 33, 31), (value >> 33) as u32);
    }

    #[test]
    fn test_extract_unsigned_stays_below_field_size() {
        let value = u64::MAX;
        for size in 1..32 {
            for start in 0..=(64 - size) {
                assert!((extract_unsigned(value, start, size) as u64) < (1u64 << size));
            }
        }
    }

    #[test]
    fn test_extract_unsigned_reassembles_value() {
        let value = 0x0123_4567_89AB_CDEFu64;
        let low = extract_unsigned(value, 0, 24) as u64;
        let mid = extract_unsigned(value, 24, 20) as u64;
        let high = extract_unsigned(value, 44, 20) as u64;
        assert_eq!(low | (mid << 24) | (high << 44), value);
    }

    #[test]
    #[should_panic]
    fn test_extract_unsigned_rejects_32_bits() {
        extract_unsigned(0, 0, 32);
    }

    #[test]
    #[should_panic]
    fn test_extract_unsigned_rejects_zero_size() {
        extract_unsigned(0, 0, 0);
    }

    #[test]
    #[should_panic]
    fn test_extract_unsigned_rejects_overflowing_range() {
        extract_unsigned(0, 60, 5);
    }

    #[test]
    fn test_test_bit() {
        let value = 0b1010u64;
        assert!(!test_bit(value, 0));
        assert!(test_bit(value, 1));
        assert!(test_bit(value, 3));
        assert!(test_bit(1 << 63, 63));
    }

    #[test]
    #[should_panic]
    fn test_test_bit_rejects_index_64() {
        test_bit(0, 64);
    }

    #[test]
    fn test_byte_string() {
        let bytes = ByteString::from_hex("8d4840D6");
        assert_eq!(bytes.len(), 4);
        assert_eq!(bytes.byte_at(0), 0x8D);
        assert_eq!(bytes.bytes_in_range(1, 4), 0x4840D6);
        assert_eq!(bytes.bytes_in_range(2, 2), 0);
        assert_eq!(bytes.to_string(), "8D4840D6");
    }

    #[test]
    fn test_byte_string_full_width_range() {
        let bytes = ByteString::new(&[0xFF; 8]);
        assert_eq!(bytes.bytes_in_range(0, 8), u64::MAX);
    }

    #[test]
    fn test_byte_string_equality_and_hash() {
        let a = ByteString::new(&[1, 2, 3]);
        let b = ByteString::from_hex("010203");
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    #[should_panic]
    fn test_byte_string_rejects_odd_hex() {
        ByteString::from_hex("ABC");
    }

    #[test]
    #[should_panic]
    fn test_byte_at_out_of_bounds() {
        ByteString::new(&[1]).byte_at(1);
    }

    #[test]
    #[should_panic]
    fn test_bytes_in_range_too_wide() {
        ByteString::new(&[0; 9]).bytes_in_range(0, 9);
    }
}
