//! ADS-B tracker
//!
//! Demodulates Mode S extended squitters from raw receiver samples (or
//! replays recorded frames), decodes identification, position and velocity
//! messages and fuses them into per-aircraft state.

pub mod adsb;
pub mod aircraft;
pub mod aircraft_tracker;
pub mod bits;
pub mod config;
pub mod decoder;
pub mod device;
pub mod error;
pub mod sdr;
pub mod units;

pub use error::{Error, Result};
