//! CRC-validated Mode S extended squitter frames

use crate::bits::{extract_unsigned, ByteString};

use super::crc::MODE_S;
use super::types::IcaoAddress;

/// Raw message timestamp and frame bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawMessage {
    timestamp_ns: u64,
    bytes: ByteString,
}

impl RawMessage {
    /// Length in bytes of an extended squitter frame
    pub const LENGTH: usize = 14;

    /// Downlink format of ADS-B extended squitters
    pub const EXTENDED_SQUITTER: u32 = 17;

    const DF_START: u32 = 3;
    const DF_SIZE: u32 = 5;
    const ICAO_RANGE: (usize, usize) = (1, 4);
    const ME_RANGE: (usize, usize) = (4, 11);
    const TYPE_CODE_START: u32 = 51;
    const TYPE_CODE_SIZE: u32 = 5;

    /// # Panics
    /// If `bytes` is not exactly [`Self::LENGTH`] bytes long.
    pub fn new(timestamp_ns: u64, bytes: ByteString) -> Self {
        assert_eq!(
            bytes.len(),
            Self::LENGTH,
            "raw message must be {} bytes",
            Self::LENGTH
        );
        Self {
            timestamp_ns,
            bytes,
        }
    }

    /// Frame from `bytes`, or `None` if its CRC is not zero
    pub fn of(timestamp_ns: u64, bytes: &[u8]) -> Option<Self> {
        if MODE_S.crc(bytes) != 0 {
            return None;
        }
        Some(Self::new(timestamp_ns, ByteString::new(bytes)))
    }

    /// Frame length announced by the first byte: 14 for extended squitters, 0 otherwise
    pub fn size(byte0: u8) -> usize {
        let df = extract_unsigned(byte0 as u64, Self::DF_START, Self::DF_SIZE);
        if df == Self::EXTENDED_SQUITTER {
            Self::LENGTH
        } else {
            0
        }
    }

    /// Type code held in the top 5 bits of an ME payload
    pub fn type_code_of(payload: u64) -> u32 {
        extract_unsigned(payload, Self::TYPE_CODE_START, Self::TYPE_CODE_SIZE)
    }

    pub fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns
    }

    pub fn bytes(&self) -> &ByteString {
        &self.bytes
    }

    pub fn downlink_format(&self) -> u32 {
        extract_unsigned(self.bytes.byte_at(0) as u64, Self::DF_START, Self::DF_SIZE)
    }

    pub fn icao_address(&self) -> IcaoAddress {
        let (from, to) = Self::ICAO_RANGE;
        IcaoAddress::new(self.bytes.bytes_in_range(from, to) as u32)
    }

    /// 56-bit ME field
    pub fn payload(&self) -> u64 {
        let (from, to) = Self::ME_RANGE;
        self.bytes.bytes_in_range(from, to)
    }

    pub fn type_code(&self) -> u32 {
        Self::type_code_of(self.payload())
    }
}
