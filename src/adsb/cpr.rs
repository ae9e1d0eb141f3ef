//! CPR (Compact Position Reporting) global position decoding
//!
//! Local coordinates and intermediate results are expressed in turns.
//! The decoded position is returned in T32 units.

use std::f64::consts::TAU;

use crate::units::GeoPos;

/// Number of latitude zones for even messages
const Z_PHI0: f64 = 60.0;
/// Number of latitude zones for odd messages
const Z_PHI1: f64 = 59.0;
/// Width of an even latitude zone, in turns
const D_PHI0: f64 = 1.0 / Z_PHI0;

/// 2^32, one turn in T32 units
const TURN_T32: f64 = 4_294_967_296.0;

/// Decode the global position from an even (`x0`, `y0`) and an odd
/// (`x1`, `y1`) pair of local coordinates.
///
/// `most_recent` selects the message whose position is returned: 0 for even,
/// 1 for odd. Returns `None` when the two messages fall in different
/// longitude zone bands or when a decoded latitude is out of range.
///
/// # Panics
/// If `most_recent` is neither 0 nor 1.
pub fn decode_position(x0: f64, y0: f64, x1: f64, y1: f64, most_recent: u8) -> Option<GeoPos> {
    assert!(most_recent <= 1, "most recent must be 0 or 1, got {}", most_recent);

    let z_phi = (y0 * Z_PHI1 - y1 * Z_PHI0).round_ties_even();
    let (z_phi0, z_phi1) = if z_phi < 0.0 {
        (z_phi + Z_PHI0, z_phi + Z_PHI1)
    } else {
        (z_phi, z_phi)
    };

    let lat0 = normalize((z_phi0 + y0) / Z_PHI0);
    let lat1 = normalize((z_phi1 + y1) / Z_PHI1);

    let nl = longitude_zones(lat0);
    if nl != longitude_zones(lat1) {
        return None;
    }

    let (lon0, lon1) = if nl == 1 {
        (x0, x1)
    } else {
        let z_lambda0 = nl as f64;
        let z_lambda1 = z_lambda0 - 1.0;
        let z_lambda = (x0 * z_lambda1 - x1 * z_lambda0).round_ties_even();
        let (z0, z1) = if z_lambda < 0.0 {
            (z_lambda + z_lambda0, z_lambda + z_lambda1)
        } else {
            (z_lambda, z_lambda)
        };
        ((z0 + x0) / z_lambda0, (z1 + x1) / z_lambda1)
    };

    let lat0_t32 = latitude_t32(lat0)?;
    let lat1_t32 = latitude_t32(lat1)?;

    let pos = if most_recent == 0 {
        GeoPos::new(longitude_t32(normalize(lon0)), lat0_t32)
    } else {
        GeoPos::new(longitude_t32(normalize(lon1)), lat1_t32)
    };
    Some(pos)
}

/// Bring an angle in `[0, 1)` turn into `[-0.5, 0.5)`
fn normalize(turn: f64) -> f64 {
    if turn >= 0.5 {
        turn - 1.0
    } else {
        turn
    }
}

fn latitude_t32(turn: f64) -> Option<i32> {
    let t32 = (turn * TURN_T32).round_ties_even() as i64;
    i32::try_from(t32)
        .ok()
        .filter(|&lat| GeoPos::is_valid_latitude_t32(lat))
}

fn longitude_t32(turn: f64) -> i32 {
    // Half a turn east wraps onto half a turn west
    (turn * TURN_T32).round_ties_even() as i64 as i32
}

/// Number of even longitude zones at `latitude` (in turns)
fn longitude_zones(latitude: f64) -> u32 {
    let cos_lat = (latitude * TAU).cos();
    let a = (1.0 - (1.0 - (TAU * D_PHI0).cos()) / (cos_lat * cos_lat)).acos();
    if a.is_nan() {
        return 1;
    }
    // The equator itself belongs to the 59 zone band
    ((TAU / a).floor() as u32).min(Z_PHI1 as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{angle, convert};

    const CPR_SCALE: f64 = 131_072.0;

    fn deg_to_turn(deg: f64) -> f64 {
        convert(deg, angle::DEGREE, angle::TURN)
    }

    /// Airborne CPR encoding of a position given in degrees
    fn encode(lat_deg: f64, lon_deg: f64, odd: bool) -> (f64, f64) {
        let i = odd as u32 as f64;
        let lat = deg_to_turn(lat_deg);
        let lon = deg_to_turn(lon_deg);

        let d_lat = 1.0 / (60.0 - i);
        let yz = (CPR_SCALE * lat.rem_euclid(d_lat) / d_lat + 0.5).floor();
        let r_lat = d_lat * (yz / CPR_SCALE + (lat / d_lat).floor());

        let nl = longitude_zones(r_lat) as f64;
        let d_lon = 1.0 / (nl - i).max(1.0);
        let xz = (CPR_SCALE * lon.rem_euclid(d_lon) / d_lon + 0.5).floor();

        let mask = CPR_SCALE as u32 - 1;
        (
            (xz as u32 & mask) as f64 / CPR_SCALE,
            (yz as u32 & mask) as f64 / CPR_SCALE,
        )
    }

    fn assert_round_trip(lat_deg: f64, lon_deg: f64) {
        let (x0, y0) = encode(lat_deg, lon_deg, false);
        let (x1, y1) = encode(lat_deg, lon_deg, true);
        for most_recent in [0, 1] {
            let pos = decode_position(x0, y0, x1, y1, most_recent)
                .unwrap_or_else(|| panic!("no position for ({}, {})", lat_deg, lon_deg));
            assert!((pos.latitude_deg() - lat_deg).abs() < 1.5e-4, "{} vs {}", pos, lat_deg);
            assert!((pos.longitude_deg() - lon_deg).abs() < 1.5e-4, "{} vs {}", pos, lon_deg);
        }
    }

    #[test]
    fn test_longitude_zones() {
        assert_eq!(longitude_zones(0.0), 59);
        assert_eq!(longitude_zones(deg_to_turn(10.46)), 59);
        assert_eq!(longitude_zones(deg_to_turn(10.48)), 58);
        assert_eq!(longitude_zones(deg_to_turn(45.0)), 42);
        assert_eq!(longitude_zones(deg_to_turn(-45.0)), 42);
        assert_eq!(longitude_zones(deg_to_turn(52.2572)), 36);
        assert_eq!(longitude_zones(deg_to_turn(86.9)), 2);
        assert_eq!(longitude_zones(deg_to_turn(87.5)), 1);
    }

    #[test]
    fn test_decode_known_pair() {
        let x0 = 51372.0 / CPR_SCALE;
        let y0 = 93000.0 / CPR_SCALE;
        let x1 = 50194.0 / CPR_SCALE;
        let y1 = 74158.0 / CPR_SCALE;

        let pos = decode_position(x0, y0, x1, y1, 0).unwrap();
        assert!((pos.latitude_deg() - 52.25720).abs() < 1e-4, "{}", pos);
        assert!((pos.longitude_deg() - 3.91937).abs() < 1e-4, "{}", pos);

        let pos = decode_position(x0, y0, x1, y1, 1).unwrap();
        assert!((pos.latitude_deg() - 52.26578).abs() < 1e-4, "{}", pos);
    }

    #[test]
    fn test_round_trip() {
        assert_round_trip(46.727, 7.476);
        assert_round_trip(-33.9, 151.2);
        assert_round_trip(40.64, -73.78);
        assert_round_trip(1.35, 103.99);
        assert_round_trip(-54.8, -68.3);
    }

    #[test]
    fn test_polar_single_zone() {
        let (x0, y0) = encode(88.0, 10.0, false);
        let (x1, y1) = encode(88.0, 10.0, true);
        let pos = decode_position(x0, y0, x1, y1, 1).unwrap();
        assert!((pos.latitude_deg() - 88.0).abs() < 1e-3);
        assert!((pos.longitude_deg() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_zone_band_mismatch() {
        // Even latitude just below 10.4705 degrees, odd just above
        assert!(decode_position(0.1, 0.745, 0.1, 0.7165, 0).is_none());
        assert!(decode_position(0.1, 0.745, 0.1, 0.7165, 1).is_none());
    }

    #[test]
    #[should_panic]
    fn test_invalid_most_recent() {
        decode_position(0.0, 0.0, 0.0, 0.0, 2);
    }
}
