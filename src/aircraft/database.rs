//! Aircraft reference database
//!
//! The CSV form holds one aircraft per line:
//! `icao,registration,type designator,model,description,wake turbulence category`

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::adsb::IcaoAddress;
use crate::error::{Error, Result};

use super::{AircraftData, WakeTurbulenceCategory};

/// Lookup of static aircraft data by ICAO address
pub trait AircraftDatabase: Send {
    /// Data for `address`, `None` if the aircraft is unknown
    fn get(&self, address: IcaoAddress) -> Result<Option<AircraftData>>;
}

/// Database without any aircraft
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyDatabase;

impl AircraftDatabase for EmptyDatabase {
    fn get(&self, _address: IcaoAddress) -> Result<Option<AircraftData>> {
        Ok(None)
    }
}

/// One CSV row before validation
#[derive(Debug, Deserialize)]
struct RawAircraftRecord {
    icao: String,
    registration: String,
    type_designator: String,
    model: String,
    description: String,
    wake_turbulence_category: String,
}

impl RawAircraftRecord {
    fn validate(self) -> std::result::Result<(IcaoAddress, AircraftData), String> {
        let address: IcaoAddress = self.icao.parse().map_err(|e| format!("{}", e))?;
        let data = AircraftData {
            registration: self.registration.parse().map_err(|e| format!("{}", e))?,
            type_designator: self.type_designator.parse().map_err(|e| format!("{}", e))?,
            model: self.model,
            description: self.description.parse().map_err(|e| format!("{}", e))?,
            wake_turbulence_category: WakeTurbulenceCategory::of(&self.wake_turbulence_category),
        };
        Ok((address, data))
    }
}

/// In-memory database loaded from CSV
#[derive(Debug, Default)]
pub struct CsvAircraftDatabase {
    entries: HashMap<IcaoAddress, AircraftData>,
}

impl CsvAircraftDatabase {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let database = Self::from_reader(File::open(path)?)?;
        info!("Loaded {} aircraft from {}", database.len(), path.display());
        Ok(database)
    }

    /// Load every record of `reader`. Blank lines and `#` comments are skipped.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .has_headers(false)
            .flexible(false)
            .from_reader(reader);

        let mut entries = HashMap::new();
        for record in csv_reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line() as usize);
            let (address, data) = record
                .deserialize::<RawAircraftRecord>(None)
                .map_err(|e| e.to_string())
                .and_then(RawAircraftRecord::validate)
                .map_err(|reason| Error::InvalidDatabaseLine { line, reason })?;
            entries.insert(address, data);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AircraftDatabase for CsvAircraftDatabase {
    fn get(&self, address: IcaoAddress) -> Result<Option<AircraftData>> {
        Ok(self.entries.get(&address).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CSV: &str = "\
# icao,registration,type,model,description,wtc
4B1805,HB-JDC,A20N,AIRBUS A-320NEO,L2J,M
4840D6,PH-BXB,B738,BOEING 737-800,L2J,M

3C6586,D-AIXA,A359,AIRBUS A-350-900,L2J,H
";

    #[test]
    fn test_lookup() {
        let db = CsvAircraftDatabase::from_reader(Cursor::new(CSV)).unwrap();
        assert_eq!(db.len(), 3);

        let data = db.get(IcaoAddress::new(0x4840D6)).unwrap().unwrap();
        assert_eq!(data.registration.as_str(), "PH-BXB");
        assert_eq!(data.type_designator.as_str(), "B738");
        assert_eq!(data.model, "BOEING 737-800");
        assert_eq!(data.description.as_str(), "L2J");
        assert_eq!(data.wake_turbulence_category, WakeTurbulenceCategory::Medium);

        let heavy = db.get(IcaoAddress::new(0x3C6586)).unwrap().unwrap();
        assert_eq!(heavy.wake_turbulence_category, WakeTurbulenceCategory::Heavy);
    }

    #[test]
    fn test_unknown_address() {
        let db = CsvAircraftDatabase::from_reader(Cursor::new(CSV)).unwrap();
        assert!(db.get(IcaoAddress::new(0xABCDEF)).unwrap().is_none());
        assert!(EmptyDatabase.get(IcaoAddress::new(0x4840D6)).unwrap().is_none());
    }

    #[test]
    fn test_empty_optional_fields() {
        let db = CsvAircraftDatabase::from_reader(Cursor::new("ABCDEF,F-WXYZ,,,,\n")).unwrap();
        let data = db.get(IcaoAddress::new(0xABCDEF)).unwrap().unwrap();
        assert_eq!(data.type_designator.as_str(), "");
        assert_eq!(data.description.as_str(), "");
        assert_eq!(data.wake_turbulence_category, WakeTurbulenceCategory::Unknown);
    }

    #[test]
    fn test_invalid_line_reports_position() {
        let csv = "4B1805,HB-JDC,A20N,AIRBUS A-320NEO,L2J,M\n4840D6,PH-BXB,B738X,BOEING,L2J,M\n";
        match CsvAircraftDatabase::from_reader(Cursor::new(csv)) {
            Err(Error::InvalidDatabaseLine { line, reason }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("type designator"), "{}", reason);
            }
            other => panic!("expected invalid line, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_field_count() {
        let result = CsvAircraftDatabase::from_reader(Cursor::new("4840D6,PH-BXB\n"));
        assert!(matches!(result, Err(Error::InvalidDatabaseLine { line: 1, .. })));
    }

    #[test]
    fn test_ragged_record_is_csv_error() {
        let csv = "4B1805,HB-JDC,A20N,AIRBUS A-320NEO,L2J,M\n4840D6,PH-BXB,B738,BOEING,L2J,M,extra\n";
        assert!(matches!(
            CsvAircraftDatabase::from_reader(Cursor::new(csv)),
            Err(Error::Csv(_))
        ));
    }

    #[test]
    fn test_quoted_model_with_comma() {
        let csv = "4840D6,PH-BXB,B738,\"BOEING 737-800, WINGLETS\",L2J,M\n";
        let db = CsvAircraftDatabase::from_reader(Cursor::new(csv)).unwrap();
        let data = db.get(IcaoAddress::new(0x4840D6)).unwrap().unwrap();
        assert_eq!(data.model, "BOEING 737-800, WINGLETS");
    }

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(
            CsvAircraftDatabase::open("/nonexistent/aircraft.csv"),
            Err(Error::Io(_))
        ));
    }
}
