//! Configuration loaded from environment variables

use std::path::PathBuf;

use crate::sdr::SampleSource;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Raw sample source: `-` for stdin, a file, or `cmd:<program> <args...>`
    pub sample_source: SampleSource,

    /// Recorded message file to replay instead of demodulating
    pub replay_file: Option<PathBuf>,

    /// Pace replay by the recorded timestamps
    pub replay_realtime: bool,

    /// Aircraft reference data CSV
    pub aircraft_db: Option<PathBuf>,

    /// Capacity of the raw message queue
    pub queue_capacity: usize,

    /// Statistics logging interval in seconds
    pub stats_interval_secs: u64,

    /// Write a JSON line per aircraft update to stdout
    pub snapshot_json: bool,

    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables. The first command line
    /// argument, if any, is the replay file.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok(), std::env::args().nth(1))
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>, first_arg: Option<String>) -> crate::Result<Self> {
        Ok(Self {
            sample_source: SampleSource::parse(&var("SAMPLE_SOURCE").unwrap_or_default())?,

            replay_file: var("REPLAY_FILE")
                .or(first_arg)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),

            replay_realtime: var("REPLAY_REALTIME")
                .and_then(|s| parse_bool(&s))
                .unwrap_or(true),

            aircraft_db: var("AIRCRAFT_DB")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),

            queue_capacity: var("QUEUE_CAPACITY")
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(1000),

            stats_interval_secs: var("STATS_INTERVAL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            snapshot_json: var("SNAPSHOT_JSON")
                .and_then(|s| parse_bool(&s))
                .unwrap_or(false),

            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)], first_arg: Option<&str>) -> crate::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned(), first_arg.map(str::to_string))
    }

    #[test]
    fn test_defaults() {
        let config = load(&[], None).unwrap();
        assert_eq!(config.sample_source, SampleSource::Stdin);
        assert!(config.replay_file.is_none());
        assert!(config.replay_realtime);
        assert!(config.aircraft_db.is_none());
        assert_eq!(config.queue_capacity, 1000);
        assert_eq!(config.stats_interval_secs, 10);
        assert!(!config.snapshot_json);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = load(
            &[
                ("SAMPLE_SOURCE", "cmd:airspy_rx -r -"),
                ("REPLAY_REALTIME", "false"),
                ("AIRCRAFT_DB", "/data/aircraft.csv"),
                ("QUEUE_CAPACITY", "64"),
                ("STATS_INTERVAL_SECS", "30"),
                ("SNAPSHOT_JSON", "1"),
                ("LOG_LEVEL", "debug"),
            ],
            None,
        )
        .unwrap();
        assert_eq!(
            config.sample_source,
            SampleSource::Command {
                program: "airspy_rx".to_string(),
                args: vec!["-r".to_string(), "-".to_string()],
            }
        );
        assert!(!config.replay_realtime);
        assert_eq!(config.aircraft_db, Some(PathBuf::from("/data/aircraft.csv")));
        assert_eq!(config.queue_capacity, 64);
        assert_eq!(config.stats_interval_secs, 30);
        assert!(config.snapshot_json);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_replay_file_from_argument() {
        let config = load(&[], Some("flight.bin")).unwrap();
        assert_eq!(config.replay_file, Some(PathBuf::from("flight.bin")));

        let config = load(&[("REPLAY_FILE", "env.bin")], Some("flight.bin")).unwrap();
        assert_eq!(config.replay_file, Some(PathBuf::from("env.bin")));
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = load(&[("QUEUE_CAPACITY", "0"), ("REPLAY_REALTIME", "maybe")], None).unwrap();
        assert_eq!(config.queue_capacity, 1000);
        assert!(config.replay_realtime);
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(matches!(
            load(&[("SAMPLE_SOURCE", "cmd:")], None),
            Err(Error::InvalidConfig { var: "SAMPLE_SOURCE", .. })
        ));
    }
}
