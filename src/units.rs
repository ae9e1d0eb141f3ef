//! Units of measure and geographic positions
//!
//! Every unit is expressed as its value in the SI base unit of its dimension,
//! so converting is a single multiplication.

use std::f64::consts::TAU;
use std::fmt;

use serde::Serialize;

pub mod angle {
    use super::TAU;

    pub const RADIAN: f64 = 1.0;
    pub const TURN: f64 = TAU * RADIAN;
    pub const DEGREE: f64 = TURN / 360.0;
    /// A full turn spans the whole 32-bit integer range
    pub const T32: f64 = TURN / 4_294_967_296.0;
}

pub mod length {
    pub const METER: f64 = 1.0;
    pub const CENTIMETER: f64 = 1e-2 * METER;
    pub const KILOMETER: f64 = 1e3 * METER;
    pub const INCH: f64 = 2.54 * CENTIMETER;
    pub const FOOT: f64 = 12.0 * INCH;
    pub const NAUTICAL_MILE: f64 = 1852.0 * METER;
}

pub mod time {
    pub const SECOND: f64 = 1.0;
    pub const MINUTE: f64 = 60.0 * SECOND;
    pub const HOUR: f64 = 60.0 * MINUTE;
}

pub mod speed {
    use super::{length, time};

    pub const METER_PER_SECOND: f64 = length::METER / time::SECOND;
    pub const KNOT: f64 = length::NAUTICAL_MILE / time::HOUR;
    pub const KILOMETER_PER_HOUR: f64 = length::KILOMETER / time::HOUR;
}

/// Convert `value` expressed in `from` into `to`
#[inline]
pub fn convert(value: f64, from: f64, to: f64) -> f64 {
    value * (from / to)
}

/// Convert `value` expressed in `from` into the base unit
#[inline]
pub fn convert_from(value: f64, from: f64) -> f64 {
    value * from
}

/// Convert `value` expressed in the base unit into `to`
#[inline]
pub fn convert_to(value: f64, to: f64) -> f64 {
    value / to
}

/// Largest latitude magnitude in T32 units (a quarter turn)
const MAX_LATITUDE_T32: i32 = 1 << 30;

/// Geographic position, longitude and latitude in T32 units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GeoPos {
    longitude_t32: i32,
    latitude_t32: i32,
}

impl GeoPos {
    /// # Panics
    /// If `latitude_t32` is not a valid latitude.
    pub fn new(longitude_t32: i32, latitude_t32: i32) -> Self {
        assert!(
            Self::is_valid_latitude_t32(latitude_t32),
            "latitude {} out of range",
            latitude_t32
        );
        Self {
            longitude_t32,
            latitude_t32,
        }
    }

    pub fn is_valid_latitude_t32(latitude_t32: i32) -> bool {
        (-MAX_LATITUDE_T32..=MAX_LATITUDE_T32).contains(&latitude_t32)
    }

    pub fn longitude_t32(&self) -> i32 {
        self.longitude_t32
    }

    pub fn latitude_t32(&self) -> i32 {
        self.latitude_t32
    }

    /// Longitude in radians
    pub fn longitude(&self) -> f64 {
        convert(self.longitude_t32 as f64, angle::T32, angle::RADIAN)
    }

    /// Latitude in radians
    pub fn latitude(&self) -> f64 {
        convert(self.latitude_t32 as f64, angle::T32, angle::RADIAN)
    }

    pub fn longitude_deg(&self) -> f64 {
        convert(self.longitude_t32 as f64, angle::T32, angle::DEGREE)
    }

    pub fn latitude_deg(&self) -> f64 {
        convert(self.latitude_t32 as f64, angle::T32, angle::DEGREE)
    }
}

impl fmt::Display for GeoPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}°, {}°)", self.longitude_deg(), self.latitude_deg())
    }
}
