//! Error types for time handling and availability computation.

use thiserror::Error;

/// Errors produced while building intervals, work windows or parsing times.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvailabilityError {
    /// An interval whose start lies after its end.
    #[error("invalid interval: start {start} is after end {end}")]
    InvalidInterval {
        /// Start as RFC 3339.
        start: String,
        /// End as RFC 3339.
        end: String,
    },

    /// A work window that cannot be built (bad hours, nonexistent local time).
    #[error("invalid work window: {0}")]
    InvalidWorkWindow(String),

    /// A date or datetime string in none of the accepted formats.
    #[error("could not parse datetime: {0}")]
    InvalidDateTime(String),

    /// A time zone name missing from the IANA database.
    #[error("unknown time zone: {0}")]
    UnknownTimezone(String),
}

/// Result alias for core operations.
pub type AvailabilityResult<T> = Result<T, AvailabilityError>;
