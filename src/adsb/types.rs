//! ADS-B data types

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// ICAO 24-bit aircraft address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IcaoAddress(u32);

impl IcaoAddress {
    /// # Panics
    /// If `address` does not fit in 24 bits.
    pub fn new(address: u32) -> Self {
        assert!(address <= 0xFF_FFFF, "ICAO address {:#X} wider than 24 bits", address);
        Self(address)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for IcaoAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}", self.0)
    }
}

/// Error returned when parsing an address that is not 6 uppercase hex digits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ICAO address {0:?}")]
pub struct InvalidIcaoAddress(pub String);

impl FromStr for IcaoAddress {
    type Err = InvalidIcaoAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == 6 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'A'..=b'F'));
        if !valid {
            return Err(InvalidIcaoAddress(s.to_string()));
        }
        u32::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| InvalidIcaoAddress(s.to_string()))
    }
}

impl Serialize for IcaoAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

static CALL_SIGN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z0-9 ]{0,8}$").unwrap());

/// Flight call sign: up to 8 characters from A-Z, 0-9 and space
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct CallSign(String);

impl CallSign {
    /// # Panics
    /// If `value` is not a valid call sign.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        assert!(CALL_SIGN.is_match(&value), "invalid call sign {:?}", value);
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
