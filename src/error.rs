//! Crate error type
//!
//! Only I/O and external data problems are errors. Malformed arguments are
//! precondition failures (panics) and undecodable radio content is `None`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid message record #{index}: {reason}")]
    InvalidRecord { index: u64, reason: String },

    #[error("invalid aircraft database line {line}: {reason}")]
    InvalidDatabaseLine { line: usize, reason: String },

    #[error("invalid configuration value {value:?} for {var}")]
    InvalidConfig { var: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
