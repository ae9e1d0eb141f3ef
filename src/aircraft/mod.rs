//! Aircraft reference data

pub mod database;

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub use database::{AircraftDatabase, CsvAircraftDatabase, EmptyDatabase};

static REGISTRATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z0-9 .?/_+-]+$").unwrap());
static TYPE_DESIGNATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(|[A-Z0-9]{2,4})$").unwrap());
static DESCRIPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(|[ABDGHLPRSTV-][0123468][EJPT-])$").unwrap());

/// Error returned when a reference data field has an invalid format
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field} {value:?}")]
pub struct InvalidField {
    pub field: &'static str,
    pub value: String,
}

fn validated(regex: &Regex, field: &'static str, value: &str) -> Result<String, InvalidField> {
    if regex.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(InvalidField {
            field,
            value: value.to_string(),
        })
    }
}

/// Aircraft registration (tail number)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AircraftRegistration(String);

impl AircraftRegistration {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AircraftRegistration {
    type Err = InvalidField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validated(&REGISTRATION, "registration", s).map(Self)
    }
}

impl fmt::Display for AircraftRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ICAO type designator, possibly empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct AircraftTypeDesignator(String);

impl AircraftTypeDesignator {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AircraftTypeDesignator {
    type Err = InvalidField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validated(&TYPE_DESIGNATOR, "type designator", s).map(Self)
    }
}

/// ICAO aircraft description (kind, engine count, engine type), possibly empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct AircraftDescription(String);

impl AircraftDescription {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AircraftDescription {
    type Err = InvalidField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validated(&DESCRIPTION, "description", s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum WakeTurbulenceCategory {
    Light,
    Medium,
    Heavy,
    #[default]
    Unknown,
}

impl WakeTurbulenceCategory {
    /// Category from its one-letter code, unknown codes included
    pub fn of(code: &str) -> Self {
        match code {
            "L" => Self::Light,
            "M" => Self::Medium,
            "H" => Self::Heavy,
            _ => Self::Unknown,
        }
    }
}

/// Static data about one aircraft
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AircraftData {
    pub registration: AircraftRegistration,
    pub type_designator: AircraftTypeDesignator,
    pub model: String,
    pub description: AircraftDescription,
    pub wake_turbulence_category: WakeTurbulenceCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration() {
        assert_eq!("HB-JDC".parse::<AircraftRegistration>().unwrap().as_str(), "HB-JDC");
        assert!("N12.3/A_B+".parse::<AircraftRegistration>().is_ok());
        assert!("".parse::<AircraftRegistration>().is_err());
        assert!("hb-jdc".parse::<AircraftRegistration>().is_err());
    }

    #[test]
    fn test_type_designator() {
        assert!("A20N".parse::<AircraftTypeDesignator>().is_ok());
        assert!("".parse::<AircraftTypeDesignator>().is_ok());
        assert!("A".parse::<AircraftTypeDesignator>().is_err());
        assert!("A320X".parse::<AircraftTypeDesignator>().is_err());
    }

    #[test]
    fn test_description() {
        assert!("L2J".parse::<AircraftDescription>().is_ok());
        assert!("H1T".parse::<AircraftDescription>().is_ok());
        assert!("-0-".parse::<AircraftDescription>().is_ok());
        assert!("".parse::<AircraftDescription>().is_ok());
        assert!("L5J".parse::<AircraftDescription>().is_err());
        assert!("X2J".parse::<AircraftDescription>().is_err());
    }

    #[test]
    fn test_invalid_field_message() {
        let err = "A".parse::<AircraftTypeDesignator>().unwrap_err();
        assert_eq!(err.to_string(), "invalid type designator \"A\"");
    }

    #[test]
    fn test_wake_turbulence_category() {
        assert_eq!(WakeTurbulenceCategory::of("L"), WakeTurbulenceCategory::Light);
        assert_eq!(WakeTurbulenceCategory::of("M"), WakeTurbulenceCategory::Medium);
        assert_eq!(WakeTurbulenceCategory::of("H"), WakeTurbulenceCategory::Heavy);
        assert_eq!(WakeTurbulenceCategory::of("J"), WakeTurbulenceCategory::Unknown);
        assert_eq!(WakeTurbulenceCategory::of(""), WakeTurbulenceCategory::Unknown);
    }
}
