//! Per-aircraft state accumulation

use crate::units::GeoPos;

use super::cpr;
use super::message::{Message, PositionMessage};
use super::types::CallSign;

/// Maximum distance in time between an even and an odd position message
/// for them to be combined
pub const POSITION_PAIR_WINDOW_NS: u64 = 10_000_000_000;

/// Sink receiving the state changes of one aircraft
pub trait AircraftStateSetter {
    fn set_last_message_timestamp_ns(&mut self, timestamp_ns: u64);
    fn set_category(&mut self, category: u32);
    fn set_call_sign(&mut self, call_sign: CallSign);
    fn set_position(&mut self, position: GeoPos);
    /// Altitude in meters
    fn set_altitude(&mut self, altitude: f64);
    /// Speed in m/s
    fn set_velocity(&mut self, velocity: f64);
    /// Track or heading in radians
    fn set_track_or_heading(&mut self, track_or_heading: f64);
}

/// Feeds the messages of one aircraft into its state sink, pairing
/// even and odd position messages
#[derive(Debug)]
pub struct AircraftStateAccumulator<S> {
    state: S,
    /// Latest position message of each parity, indexed by parity
    last_position: [Option<PositionMessage>; 2],
}

impl<S: AircraftStateSetter> AircraftStateAccumulator<S> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            last_position: [None, None],
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn into_state(self) -> S {
        self.state
    }

    pub fn update(&mut self, message: &Message) {
        self.state.set_last_message_timestamp_ns(message.timestamp_ns());

        match message {
            Message::Identification(id) => {
                self.state.set_category(id.category);
                self.state.set_call_sign(id.call_sign.clone());
            }
            Message::Position(pos) => self.update_position(pos),
            Message::Velocity(vel) => {
                self.state.set_velocity(vel.speed);
                self.state.set_track_or_heading(vel.track_or_heading);
            }
        }
    }

    fn update_position(&mut self, message: &PositionMessage) {
        self.state.set_altitude(message.altitude);

        let parity = message.parity as usize;
        self.last_position[parity] = Some(message.clone());

        let Some(other) = &self.last_position[1 - parity] else {
            return;
        };
        if other.timestamp_ns.abs_diff(message.timestamp_ns) > POSITION_PAIR_WINDOW_NS {
            return;
        }

        let (even, odd) = if parity == 0 {
            (message, other)
        } else {
            (other, message)
        };
        if let Some(position) = cpr::decode_position(even.x, even.y, odd.x, odd.y, message.parity) {
            self.state.set_position(position);
        }
    }
}
