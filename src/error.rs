//! Error types shared by the calculator and the holiday loader

use std::path::PathBuf;
use thiserror::Error;

/// Failures of a single calculation request
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalcError {
    /// The supplied start timestamp is not a valid UTC instant
    #[error("Invalid UTC date format: {0}")]
    InvalidTimestamp(String),

    /// Stepping from the start left chrono's representable calendar
    #[error("Result falls outside the supported date range (start {0})")]
    OutOfRange(String),

    /// A computed business-local instant could not be expressed in UTC
    #[error("Failed to format date to UTC: {0}")]
    SerializationError(String),
}

impl CalcError {
    /// Whether the caller is to blame (maps to a 400 at the HTTP boundary)
    pub fn is_client_error(&self) -> bool {
        matches!(self, CalcError::InvalidTimestamp(_) | CalcError::OutOfRange(_))
    }
}

/// Failure of the startup (or refresh) holiday load
#[derive(Debug, Error)]
pub enum HolidayLoadError {
    #[error("failed to fetch holidays from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("holiday source {url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read holiday file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("holiday list is not a JSON array of strings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Invalid daily schedule
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("schedule hours must satisfy start < lunch start < lunch end < end (got {start}/{lunch_start}/{lunch_end}/{end})")]
    Ordering {
        start: u32,
        lunch_start: u32,
        lunch_end: u32,
        end: u32,
    },

    #[error("end hour {0} is past 23; the working day must close before midnight")]
    EndPastMidnight(u32),
}
