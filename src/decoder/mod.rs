//! Recorded message replay

pub mod runner;

pub use runner::{parse_hex_line, RecordReader, ReplayRunner};
