//! Aircraft state tracking and aggregation
//!
//! Keeps one accumulator per ICAO address, fed by every decoded message
//! from that aircraft, and forgets aircraft that have gone silent.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::adsb::{AircraftStateAccumulator, AircraftStateSetter, CallSign, IcaoAddress, Message};
use crate::aircraft::{AircraftData, AircraftDatabase};
use crate::units::{angle, convert_to, length, speed, GeoPos};

/// Maximum silence, in message time, before an aircraft is removed
const AIRCRAFT_TIMEOUT_NS: u64 = 60_000_000_000;

/// Minimum message time between two position log lines of one aircraft
const POSITION_LOG_INTERVAL_NS: u64 = 5_000_000_000;

/// Position and altitude (m) of one trajectory point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AirbornePos {
    pub position: GeoPos,
    pub altitude: f64,
}

/// Aggregated aircraft state
#[derive(Debug, Clone)]
pub struct AircraftState {
    icao_address: IcaoAddress,
    aircraft_data: Option<AircraftData>,
    last_message_timestamp_ns: u64,
    category: Option<u32>,
    call_sign: Option<CallSign>,
    position: Option<GeoPos>,
    /// Altitude in meters
    altitude: Option<f64>,
    /// Speed in m/s
    velocity: Option<f64>,
    /// Track or heading in radians
    track_or_heading: Option<f64>,
    trajectory: Vec<AirbornePos>,
    messages: u64,
    last_position_log_ns: Option<u64>,
}

impl AircraftState {
    pub fn new(icao_address: IcaoAddress, aircraft_data: Option<AircraftData>) -> Self {
        Self {
            icao_address,
            aircraft_data,
            last_message_timestamp_ns: 0,
            category: None,
            call_sign: None,
            position: None,
            altitude: None,
            velocity: None,
            track_or_heading: None,
            trajectory: Vec::new(),
            messages: 0,
            last_position_log_ns: None,
        }
    }

    pub fn icao_address(&self) -> IcaoAddress {
        self.icao_address
    }

    pub fn aircraft_data(&self) -> Option<&AircraftData> {
        self.aircraft_data.as_ref()
    }

    pub fn last_message_timestamp_ns(&self) -> u64 {
        self.last_message_timestamp_ns
    }

    pub fn category(&self) -> Option<u32> {
        self.category
    }

    pub fn call_sign(&self) -> Option<&CallSign> {
        self.call_sign.as_ref()
    }

    pub fn position(&self) -> Option<GeoPos> {
        self.position
    }

    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    pub fn velocity(&self) -> Option<f64> {
        self.velocity
    }

    pub fn track_or_heading(&self) -> Option<f64> {
        self.track_or_heading
    }

    pub fn trajectory(&self) -> &[AirbornePos] {
        &self.trajectory
    }

    pub fn messages(&self) -> u64 {
        self.messages
    }

    /// Check if enough message time has passed to log the position again
    fn should_log_position(&self) -> bool {
        self.last_position_log_ns.map_or(true, |last| {
            self.last_message_timestamp_ns.saturating_sub(last) >= POSITION_LOG_INTERVAL_NS
        })
    }

    fn mark_position_logged(&mut self) {
        self.last_position_log_ns = Some(self.last_message_timestamp_ns);
    }

    fn is_stale(&self, now_ns: u64) -> bool {
        now_ns.saturating_sub(self.last_message_timestamp_ns) > AIRCRAFT_TIMEOUT_NS
    }
}

impl AircraftStateSetter for AircraftState {
    fn set_last_message_timestamp_ns(&mut self, timestamp_ns: u64) {
        self.last_message_timestamp_ns = timestamp_ns;
        self.messages += 1;
    }

    fn set_category(&mut self, category: u32) {
        self.category = Some(category);
    }

    fn set_call_sign(&mut self, call_sign: CallSign) {
        self.call_sign = Some(call_sign);
    }

    fn set_position(&mut self, position: GeoPos) {
        if self.position == Some(position) {
            return;
        }
        self.position = Some(position);
        if let Some(altitude) = self.altitude {
            self.trajectory.push(AirbornePos { position, altitude });
        }
    }

    fn set_altitude(&mut self, altitude: f64) {
        if self.altitude == Some(altitude) {
            return;
        }
        self.altitude = Some(altitude);

        let Some(position) = self.position else {
            return;
        };
        let point = AirbornePos { position, altitude };
        if self.trajectory.len() == 1 {
            self.trajectory[0] = point;
        } else if self.trajectory.last() != Some(&point) {
            self.trajectory.push(point);
        }
    }

    fn set_velocity(&mut self, velocity: f64) {
        self.velocity = Some(velocity);
    }

    fn set_track_or_heading(&mut self, track_or_heading: f64) {
        self.track_or_heading = Some(track_or_heading);
    }
}

/// Aircraft tracker - manages state for all tracked aircraft
pub struct AircraftTracker {
    aircraft: HashMap<IcaoAddress, AircraftStateAccumulator<AircraftState>>,
    database: Box<dyn AircraftDatabase>,
    /// Timestamp of the most recent message
    now_ns: u64,
    total_messages: u64,
}

impl AircraftTracker {
    pub fn new(database: Box<dyn AircraftDatabase>) -> Self {
        Self {
            aircraft: HashMap::new(),
            database,
            now_ns: 0,
            total_messages: 0,
        }
    }

    /// Feed `message` to the state of its aircraft, creating it if needed
    pub fn update_with_message(&mut self, message: &Message) -> &AircraftState {
        let icao = message.icao_address();
        self.now_ns = message.timestamp_ns();
        self.total_messages += 1;

        let database = &self.database;
        let accumulator = self.aircraft.entry(icao).or_insert_with(|| {
            let data = match database.get(icao) {
                Ok(data) => data,
                Err(e) => {
                    warn!("Aircraft database lookup failed for {}: {}", icao, e);
                    None
                }
            };
            match &data {
                Some(data) => debug!("New aircraft tracked: {} ({})", icao, data.registration),
                None => debug!("New aircraft tracked: {}", icao),
            }
            AircraftStateAccumulator::new(AircraftState::new(icao, data))
        });

        let had_position = accumulator.state().position.is_some();
        accumulator.update(message);

        let state = accumulator.state_mut();
        if state.position.is_some() && (!had_position || state.should_log_position()) {
            state.mark_position_logged();
            if let Some(position) = state.position {
                info!(
                    "Aircraft {} {} at ({:.4}, {:.4}) alt={:.0} ft spd={:.0} kts trk={:.0} | msgs={}",
                    icao,
                    state.call_sign.as_ref().map_or("-", CallSign::as_str),
                    position.latitude_deg(),
                    position.longitude_deg(),
                    state.altitude.map_or(0.0, |a| convert_to(a, length::FOOT)),
                    state.velocity.map_or(0.0, |v| convert_to(v, speed::KNOT)),
                    state.track_or_heading.map_or(0.0, |t| convert_to(t, angle::DEGREE)),
                    state.messages
                );
            }
        }

        accumulator.state()
    }

    /// Remove aircraft silent for more than a minute of message time
    pub fn purge(&mut self) -> usize {
        let before = self.aircraft.len();
        let now_ns = self.now_ns;
        self.aircraft.retain(|_, acc| !acc.state().is_stale(now_ns));
        let removed = before - self.aircraft.len();
        if removed > 0 {
            debug!("Purged {} stale aircraft, {} remaining", removed, self.aircraft.len());
        }
        removed
    }

    /// Aircraft with a known position
    pub fn states(&self) -> impl Iterator<Item = &AircraftState> {
        self.aircraft
            .values()
            .map(AircraftStateAccumulator::state)
            .filter(|s| s.position.is_some())
    }

    /// Get aircraft state by ICAO address
    pub fn get(&self, icao: IcaoAddress) -> Option<&AircraftState> {
        self.aircraft.get(&icao).map(AircraftStateAccumulator::state)
    }

    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }

    /// Timestamp of the most recent message
    pub fn now_ns(&self) -> u64 {
        self.now_ns
    }

    pub fn stats_summary(&self) -> TrackerStats {
        let states = || self.aircraft.values().map(AircraftStateAccumulator::state);
        TrackerStats {
            total_aircraft: self.aircraft.len(),
            with_position: states().filter(|s| s.position.is_some()).count(),
            with_callsign: states().filter(|s| s.call_sign.is_some()).count(),
            total_messages: self.total_messages,
        }
    }
}

/// Tracker statistics
#[derive(Debug, Clone)]
pub struct TrackerStats {
    pub total_aircraft: usize,
    pub with_position: usize,
    pub with_callsign: usize,
    pub total_messages: u64,
}

impl fmt::Display for TrackerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Aircraft: {} total, {} with position, {} with callsign, {} msgs",
            self.total_aircraft, self.with_position, self.with_callsign, self.total_messages
        )
    }
}

/// Serializable view of one aircraft, in display units
#[derive(Debug, Clone, Serialize)]
pub struct AircraftSnapshot {
    pub emitted_at: DateTime<Utc>,
    pub timestamp_ns: u64,
    pub icao: IcaoAddress,
    pub registration: Option<String>,
    pub type_designator: Option<String>,
    pub model: Option<String>,
    pub callsign: Option<CallSign>,
    pub category: Option<u32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude_ft: Option<f64>,
    pub speed_kts: Option<f64>,
    pub track_deg: Option<f64>,
    pub trajectory_points: usize,
}

impl AircraftSnapshot {
    pub fn of(state: &AircraftState) -> Self {
        let data = state.aircraft_data();
        Self {
            emitted_at: Utc::now(),
            timestamp_ns: state.last_message_timestamp_ns,
            icao: state.icao_address,
            registration: data.map(|d| d.registration.to_string()),
            type_designator: data.map(|d| d.type_designator.as_str().to_string()),
            model: data.map(|d| d.model.clone()),
            callsign: state.call_sign.clone(),
            category: state.category,
            latitude: state.position.map(|p| p.latitude_deg()),
            longitude: state.position.map(|p| p.longitude_deg()),
            altitude_ft: state.altitude.map(|a| convert_to(a, length::FOOT)),
            speed_kts: state.velocity.map(|v| convert_to(v, speed::KNOT)),
            track_deg: state.track_or_heading.map(|t| convert_to(t, angle::DEGREE)),
            trajectory_points: state.trajectory.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adsb::{parse_message, RawMessage};
    use crate::aircraft::{CsvAircraftDatabase, EmptyDatabase};
    use std::io::Cursor;

    const SECOND_NS: u64 = 1_000_000_000;

    fn message(hex_str: &str, timestamp_ns: u64) -> Message {
        let raw = RawMessage::of(timestamp_ns, &hex::decode(hex_str).unwrap()).unwrap();
        parse_message(&raw).unwrap()
    }

    fn even(timestamp_ns: u64) -> Message {
        message("8D40621D58C382D690C8AC2863A7", timestamp_ns)
    }

    fn odd(timestamp_ns: u64) -> Message {
        message("8D40621D58C386435CC412692AD6", timestamp_ns)
    }

    fn pos(lon: i32, lat: i32) -> GeoPos {
        GeoPos::new(lon, lat)
    }

    #[test]
    fn test_first_message_creates_and_applies() {
        let mut tracker = AircraftTracker::new(Box::new(EmptyDatabase));
        let state = tracker.update_with_message(&message("8D4840D6202CC371C32CE0576098", 10));
        assert_eq!(state.call_sign().map(CallSign::as_str), Some("KLM1023"));
        assert_eq!(state.last_message_timestamp_ns(), 10);
        assert_eq!(tracker.len(), 1);
        // No position yet
        assert_eq!(tracker.states().count(), 0);
    }

    #[test]
    fn test_position_pair_makes_aircraft_visible() {
        let mut tracker = AircraftTracker::new(Box::new(EmptyDatabase));
        tracker.update_with_message(&even(0));
        let state = tracker.update_with_message(&odd(2 * SECOND_NS));
        let position = state.position().unwrap();
        assert!((position.latitude_deg() - 52.26578).abs() < 1e-4);
        assert!((state.altitude().unwrap() - 11_582.4).abs() < 1e-6);
        assert_eq!(state.trajectory().len(), 1);
        assert_eq!(tracker.states().count(), 1);

        let stats = tracker.stats_summary();
        assert_eq!(stats.total_aircraft, 1);
        assert_eq!(stats.with_position, 1);
        assert_eq!(stats.total_messages, 2);
    }

    #[test]
    fn test_purge_after_one_minute_of_silence() {
        let mut tracker = AircraftTracker::new(Box::new(EmptyDatabase));
        tracker.update_with_message(&even(0));
        tracker.update_with_message(&message("8D4840D6202CC371C32CE0576098", 30 * SECOND_NS));
        assert_eq!(tracker.purge(), 0);

        tracker.update_with_message(&message("8D4840D6202CC371C32CE0576098", 61 * SECOND_NS));
        assert_eq!(tracker.purge(), 1);
        assert!(tracker.get(IcaoAddress::new(0x40621D)).is_none());
        assert!(tracker.get(IcaoAddress::new(0x4840D6)).is_some());
    }

    #[test]
    fn test_database_data_attached() {
        let db = CsvAircraftDatabase::from_reader(Cursor::new("4840D6,PH-BXB,B738,BOEING 737-800,L2J,M\n")).unwrap();
        let mut tracker = AircraftTracker::new(Box::new(db));
        let state = tracker.update_with_message(&message("8D4840D6202CC371C32CE0576098", 0));
        assert_eq!(state.aircraft_data().unwrap().registration.as_str(), "PH-BXB");

        let snapshot = AircraftSnapshot::of(state);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["icao"], "4840D6");
        assert_eq!(json["registration"], "PH-BXB");
        assert_eq!(json["callsign"], "KLM1023");
        assert!(json["latitude"].is_null());
    }

    #[test]
    fn test_trajectory_first_point_follows_altitude() {
        let mut state = AircraftState::new(IcaoAddress::new(1), None);
        state.set_altitude(1000.0);
        state.set_position(pos(0, 0));
        assert_eq!(state.trajectory().len(), 1);

        // Initial point is replaced, not extended
        state.set_altitude(1100.0);
        assert_eq!(state.trajectory(), &[AirbornePos { position: pos(0, 0), altitude: 1100.0 }]);
    }

    #[test]
    fn test_trajectory_grows_with_position_and_altitude() {
        let mut state = AircraftState::new(IcaoAddress::new(1), None);
        state.set_altitude(1000.0);
        state.set_position(pos(0, 0));
        state.set_position(pos(10, 10));
        assert_eq!(state.trajectory().len(), 2);

        state.set_altitude(1200.0);
        assert_eq!(state.trajectory().len(), 3);
        assert_eq!(state.trajectory()[2], AirbornePos { position: pos(10, 10), altitude: 1200.0 });

        // Repeated values add nothing
        state.set_altitude(1200.0);
        state.set_position(pos(10, 10));
        assert_eq!(state.trajectory().len(), 3);
    }

    #[test]
    fn test_altitude_without_position_leaves_trajectory_empty() {
        let mut state = AircraftState::new(IcaoAddress::new(1), None);
        state.set_altitude(1000.0);
        state.set_altitude(2000.0);
        assert!(state.trajectory().is_empty());
    }

    #[test]
    fn test_stats_display() {
        let stats = TrackerStats {
            total_aircraft: 3,
            with_position: 2,
            with_callsign: 1,
            total_messages: 42,
        };
        assert_eq!(
            stats.to_string(),
            "Aircraft: 3 total, 2 with position, 1 with callsign, 42 msgs"
        );
    }
}
