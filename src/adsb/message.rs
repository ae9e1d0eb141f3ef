//! Decoded ADS-B messages

use super::types::{CallSign, IcaoAddress};

/// Aircraft identification and category (type codes 1-4)
#[derive(Debug, Clone, PartialEq)]
pub struct IdentificationMessage {
    pub timestamp_ns: u64,
    pub icao_address: IcaoAddress,
    pub category: u32,
    pub call_sign: CallSign,
}

/// Airborne position in local CPR coordinates (type codes 9-18 and 20-22)
#[derive(Debug, Clone, PartialEq)]
pub struct PositionMessage {
    pub timestamp_ns: u64,
    pub icao_address: IcaoAddress,
    /// Altitude in meters
    pub altitude: f64,
    /// 0 for even, 1 for odd
    pub parity: u8,
    /// Local longitude in `[0, 1)`
    pub x: f64,
    /// Local latitude in `[0, 1)`
    pub y: f64,
}

impl PositionMessage {
    /// # Panics
    /// If `parity` is not 0 or 1, or `x` or `y` is outside `[0, 1)`.
    pub fn new(timestamp_ns: u64, icao_address: IcaoAddress, altitude: f64, parity: u8, x: f64, y: f64) -> Self {
        assert!(parity <= 1, "parity must be 0 or 1, got {}", parity);
        assert!((0.0..1.0).contains(&x), "local longitude {} outside [0, 1)", x);
        assert!((0.0..1.0).contains(&y), "local latitude {} outside [0, 1)", y);
        Self {
            timestamp_ns,
            icao_address,
            altitude,
            parity,
            x,
            y,
        }
    }
}

/// Airborne velocity (type code 19)
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityMessage {
    pub timestamp_ns: u64,
    pub icao_address: IcaoAddress,
    /// Speed in m/s
    pub speed: f64,
    /// Track over ground or heading, in radians within `[0, 2π)`
    pub track_or_heading: f64,
}

impl VelocityMessage {
    /// # Panics
    /// If `speed` or `track_or_heading` is negative.
    pub fn new(timestamp_ns: u64, icao_address: IcaoAddress, speed: f64, track_or_heading: f64) -> Self {
        assert!(speed >= 0.0, "negative speed {}", speed);
        assert!(track_or_heading >= 0.0, "negative track {}", track_or_heading);
        Self {
            timestamp_ns,
            icao_address,
            speed,
            track_or_heading,
        }
    }
}

/// Message decoded from a raw extended squitter
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Identification(IdentificationMessage),
    Position(PositionMessage),
    Velocity(VelocityMessage),
}

impl Message {
    pub fn timestamp_ns(&self) -> u64 {
        match self {
            Message::Identification(m) => m.timestamp_ns,
            Message::Position(m) => m.timestamp_ns,
            Message::Velocity(m) => m.timestamp_ns,
        }
    }

    pub fn icao_address(&self) -> IcaoAddress {
        match self {
            Message::Identification(m) => m.icao_address,
            Message::Position(m) => m.icao_address,
            Message::Velocity(m) => m.icao_address,
        }
    }
}

impl From<IdentificationMessage> for Message {
    fn from(m: IdentificationMessage) -> Self {
        Message::Identification(m)
    }
}

impl From<PositionMessage> for Message {
    fn from(m: PositionMessage) -> Self {
        Message::Position(m)
    }
}

impl From<VelocityMessage> for Message {
    fn from(m: VelocityMessage) -> Self {
        Message::Velocity(m)
    }
}
