//! CRC-24 checksum validation for Mode S messages

/// CRC-24 generator used in Mode S (the x^24 term is implicit)
pub const GENERATOR: u32 = 0xFFF409;

const CRC_BITS: u32 = 24;
const CRC_MASK: u32 = (1 << CRC_BITS) - 1;
const TABLE_SIZE: usize = 256;

/// Table-driven CRC-24 calculator
#[derive(Debug, Clone)]
pub struct Crc24 {
    table: [u32; TABLE_SIZE],
}

/// Calculator for the Mode S generator, built at compile time
pub static MODE_S: Crc24 = Crc24::new(GENERATOR);

impl Crc24 {
    /// Create a calculator whose generator is the low 24 bits of `generator`
    pub const fn new(generator: u32) -> Self {
        Self {
            table: build_table(generator & CRC_MASK),
        }
    }

    /// CRC-24 of `bytes`, augmented with 24 zero bits
    pub fn crc(&self, bytes: &[u8]) -> u32 {
        let mut crc = 0u32;
        for &b in bytes {
            crc = (((crc << 8) | b as u32) ^ self.table[top_byte(crc)]) & CRC_MASK;
        }
        for _ in 0..CRC_BITS / 8 {
            crc = ((crc << 8) ^ self.table[top_byte(crc)]) & CRC_MASK;
        }
        crc
    }

    /// A frame is valid when its CRC-24 (trailing parity included) is zero
    pub fn is_valid(&self, bytes: &[u8]) -> bool {
        self.crc(bytes) == 0
    }
}

#[inline]
const fn top_byte(crc: u32) -> usize {
    ((crc >> 16) & 0xFF) as usize
}

/// Bit-at-a-time polynomial division of `bytes` followed by 24 zero bits
const fn crc_bitwise(generator: u32, bytes: &[u8]) -> u32 {
    let mut crc = 0u32;

    let mut i = 0;
    while i < bytes.len() {
        let mut bit = 8u32;
        while bit > 0 {
            bit -= 1;
            let b = ((bytes[i] >> bit) & 1) as u32;
            let msb_set = crc & (1 << (CRC_BITS - 1)) != 0;
            crc = ((crc << 1) | b) & CRC_MASK;
            if msb_set {
                crc ^= generator;
            }
        }
        i += 1;
    }

    let mut k = 0;
    while k < CRC_BITS {
        let msb_set = crc & (1 << (CRC_BITS - 1)) != 0;
        crc = (crc << 1) & CRC_MASK;
        if msb_set {
            crc ^= generator;
        }
        k += 1;
    }

    crc & CRC_MASK
}

const fn build_table(generator: u32) -> [u32; TABLE_SIZE] {
    let mut table = [0u32; TABLE_SIZE];
    let mut i = 0;
    while i < TABLE_SIZE {
        table[i] = crc_bitwise(generator, &[i as u8]);
        i += 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc24() {
        // Known-good DF17 identification frame
        let msg = hex::decode("8D4840D6202CC371C32CE0576098").unwrap();
        assert_eq!(MODE_S.crc(&msg), 0);
        assert!(MODE_S.is_valid(&msg));
    }

    #[test]
    fn test_crc_of_payload_is_parity() {
        let msg = hex::decode("8D4840D6202CC371C32CE0576098").unwrap();
        assert_eq!(MODE_S.crc(&msg[..11]), 0x576098);
    }

    #[test]
    fn test_appended_crc_validates() {
        let payloads = [
            "8D40621D58C382D690C8AC",
            "8D48502099440994083817",
            "0000000000000000000000",
        ];
        for payload in payloads {
            let mut frame = hex::decode(payload).unwrap();
            let crc = MODE_S.crc(&frame);
            frame.extend_from_slice(&crc.to_be_bytes()[1..]);
            assert!(MODE_S.is_valid(&frame), "{}", payload);
        }
    }

    #[test]
    fn test_single_bit_flip_detected() {
        let msg = hex::decode("8D40621D58C382D690C8AC2863A7").unwrap();
        assert!(MODE_S.is_valid(&msg));
        for bit in 0..msg.len() * 8 {
            let mut flipped = msg.clone();
            flipped[bit / 8] ^= 0x80 >> (bit % 8);
            assert_ne!(MODE_S.crc(&flipped), 0, "bit {} flip went undetected", bit);
        }
    }

    #[test]
    fn test_table_matches_bitwise() {
        let msg = hex::decode("8DA05F219B06B6AF189400").unwrap();
        assert_eq!(MODE_S.crc(&msg), crc_bitwise(GENERATOR, &msg));
    }
}
