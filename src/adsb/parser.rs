//! ADS-B message parser
//!
//! Dispatches a CRC-validated frame on its type code and decodes the ME
//! payload. Every decoder is a pure function that yields `None` for content
//! it cannot interpret.

use std::f64::consts::TAU;

use crate::bits::{extract_unsigned, test_bit};
use crate::units::{angle, convert_from, length, speed};

use super::message::{IdentificationMessage, Message, PositionMessage, VelocityMessage};
use super::raw::RawMessage;
use super::types::CallSign;

/// Parse a raw message into one of the supported message kinds
pub fn parse_message(raw: &RawMessage) -> Option<Message> {
    match raw.type_code() {
        1..=4 => decode_identification(raw).map(Message::from),
        9..=18 | 20..=22 => decode_airborne_position(raw).map(Message::from),
        19 => decode_airborne_velocity(raw).map(Message::from),
        _ => None,
    }
}

// Identification payload layout
const CATEGORY_START: u32 = 48;
const CATEGORY_SIZE: u32 = 3;
const CHAR_SIZE: u32 = 6;
const CALL_SIGN_CHARS: u32 = 8;

/// Decode identification and category (type codes 1-4)
pub fn decode_identification(raw: &RawMessage) -> Option<IdentificationMessage> {
    let payload = raw.payload();
    let category = ((14 - raw.type_code()) << 4) | extract_unsigned(payload, CATEGORY_START, CATEGORY_SIZE);

    // First character sits in the most significant group
    let mut call_sign = String::with_capacity(CALL_SIGN_CHARS as usize);
    for i in (0..CALL_SIGN_CHARS).rev() {
        call_sign.push(call_sign_char(extract_unsigned(payload, i * CHAR_SIZE, CHAR_SIZE))?);
    }

    Some(IdentificationMessage {
        timestamp_ns: raw.timestamp_ns(),
        icao_address: raw.icao_address(),
        category,
        call_sign: CallSign::new(call_sign.trim_end()),
    })
}

fn call_sign_char(code: u32) -> Option<char> {
    match code {
        1..=26 => char::from_u32('A' as u32 + code - 1),
        32 => Some(' '),
        48..=57 => char::from_u32('0' as u32 + code - 48),
        _ => None,
    }
}

// Airborne position payload layout
const CPR_SIZE: u32 = 17;
const LON_START: u32 = 0;
const LAT_START: u32 = 17;
const PARITY_BIT: u32 = 34;
const ALT_START: u32 = 36;
const ALT_SIZE: u32 = 12;
const Q_BIT: u32 = 4;

/// 2^-17, scale of the local CPR coordinates
const CPR_SCALE: f64 = 1.0 / (1u32 << CPR_SIZE) as f64;

/// Decode airborne position (type codes 9-18, 20-22)
pub fn decode_airborne_position(raw: &RawMessage) -> Option<PositionMessage> {
    let payload = raw.payload();

    let altitude_ft = decode_altitude(extract_unsigned(payload, ALT_START, ALT_SIZE))?;
    let parity = test_bit(payload, PARITY_BIT) as u8;
    let x = extract_unsigned(payload, LON_START, CPR_SIZE) as f64 * CPR_SCALE;
    let y = extract_unsigned(payload, LAT_START, CPR_SIZE) as f64 * CPR_SCALE;

    Some(PositionMessage::new(
        raw.timestamp_ns(),
        raw.icao_address(),
        convert_from(altitude_ft, length::FOOT),
        parity,
        x,
        y,
    ))
}

/// Decode a 12-bit altitude code into feet, `None` if the code is undefined
fn decode_altitude(alt: u32) -> Option<f64> {
    if test_bit(alt as u64, Q_BIT) {
        // 25 ft steps, Q bit removed
        let n = (extract_unsigned(alt as u64, 5, 7) << 4) | extract_unsigned(alt as u64, 0, 4);
        return Some(n as f64 * 25.0 - 1000.0);
    }

    // 100 ft steps, Gillham coded
    let untangled = untangle(alt) as u64;
    let mut hundreds = gray_decode(extract_unsigned(untangled, 0, 3));
    let five_hundreds = gray_decode(extract_unsigned(untangled, 3, 9));

    hundreds = match hundreds {
        0 | 5 | 6 => return None,
        7 => 5,
        h => h,
    };
    if five_hundreds % 2 == 1 {
        hundreds = 6 - hundreds;
    }

    Some(-1300.0 + 100.0 * hundreds as f64 + 500.0 * five_hundreds as f64)
}

/// Source bit of the altitude code for each untangled bit, most significant first.
/// Yields D1 D2 D4 A1 A2 A4 B1 B2 B4 C1 C2 C4.
const UNTANGLE_ORDER: [u32; 12] = [4, 2, 0, 10, 8, 6, 5, 3, 1, 11, 9, 7];

fn untangle(alt: u32) -> u32 {
    UNTANGLE_ORDER
        .iter()
        .fold(0, |acc, &src| (acc << 1) | extract_unsigned(alt as u64, src, 1))
}

fn gray_decode(gray: u32) -> u32 {
    let mut n = gray;
    for shift in [8, 4, 2, 1] {
        n ^= n >> shift;
    }
    n
}

// Airborne velocity payload layout
const SUBTYPE_START: u32 = 48;
const SUBTYPE_SIZE: u32 = 3;
const VELOCITY_START: u32 = 21;
const VELOCITY_SIZE: u32 = 22;
const COMPONENT_SIZE: u32 = 10;

/// Decode airborne velocity (type code 19)
pub fn decode_airborne_velocity(raw: &RawMessage) -> Option<VelocityMessage> {
    let payload = raw.payload();
    let subtype = extract_unsigned(payload, SUBTYPE_START, SUBTYPE_SIZE);
    let fields = extract_unsigned(payload, VELOCITY_START, VELOCITY_SIZE) as u64;

    let (speed, track_or_heading) = match subtype {
        1 | 2 => ground_velocity(fields, subtype == 2)?,
        3 | 4 => air_velocity(fields, subtype == 4)?,
        _ => return None,
    };

    Some(VelocityMessage::new(
        raw.timestamp_ns(),
        raw.icao_address(),
        speed,
        track_or_heading,
    ))
}

/// Speed (m/s) and track (rad) of a ground speed report.
/// Components are stored as value + 1, with 0 meaning unavailable.
fn ground_velocity(fields: u64, supersonic: bool) -> Option<(f64, f64)> {
    let v_ns = extract_unsigned(fields, 0, COMPONENT_SIZE).checked_sub(1)? as f64;
    let v_ew = extract_unsigned(fields, 11, COMPONENT_SIZE).checked_sub(1)? as f64;

    // Direction bits set mean south and west
    let v_ns = if test_bit(fields, 10) { -v_ns } else { v_ns };
    let v_ew = if test_bit(fields, 21) { -v_ew } else { v_ew };

    let mut track = v_ew.atan2(v_ns);
    if track < 0.0 {
        track += TAU;
    }

    let knots = v_ns.hypot(v_ew) * speed_factor(supersonic);
    Some((convert_from(knots, speed::KNOT), track))
}

/// Airspeed (m/s) and heading (rad) of an airspeed report
fn air_velocity(fields: u64, supersonic: bool) -> Option<(f64, f64)> {
    if !test_bit(fields, 21) {
        return None;
    }
    let heading = extract_unsigned(fields, 11, COMPONENT_SIZE) as f64 / (1 << COMPONENT_SIZE) as f64;
    let airspeed = extract_unsigned(fields, 0, COMPONENT_SIZE).checked_sub(1)? as f64;

    let knots = airspeed * speed_factor(supersonic);
    Some((convert_from(knots, speed::KNOT), convert_from(heading, angle::TURN)))
}

fn speed_factor(supersonic: bool) -> f64 {
    if supersonic {
        4.0
    } else {
        1.0
    }
}
