//! ADS-B message decoding module

pub mod accumulator;
pub mod cpr;
pub mod crc;
pub mod message;
pub mod parser;
pub mod raw;
pub mod types;

pub use accumulator::{AircraftStateAccumulator, AircraftStateSetter};
pub use message::{IdentificationMessage, Message, PositionMessage, VelocityMessage};
pub use parser::parse_message;
pub use raw::RawMessage;
pub use types::{CallSign, IcaoAddress};
