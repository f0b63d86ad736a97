//! Error types for glyco

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or non-physiological glucose value
    #[error("Invalid reading: {0}")]
    InvalidReading(String),

    /// Reading timestamp is further in the future than the configured tolerance
    #[error("Reading at {timestamp} is {ahead_secs}s ahead of now (max skew {max_skew_secs}s)")]
    ClockSkewReading {
        timestamp: DateTime<Utc>,
        ahead_secs: i64,
        max_skew_secs: i64,
    },

    /// Thresholds are not strictly increasing
    #[error("Invalid threshold config: {0}")]
    InvalidThresholdConfig(String),

    /// Any other configuration parameter out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Day argument that is not a recognised date
    #[error("Invalid date: '{0}' (use today, yesterday, YYYY-MM-DD, MM/DD or 'Jan 15')")]
    InvalidDate(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
