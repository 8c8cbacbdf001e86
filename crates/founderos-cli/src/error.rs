//! Client error types.

use founderos_core::AvailabilityError;
use founderos_google::GoogleError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Gmail or Calendar failure, including authentication.
    #[error(transparent)]
    Google(#[from] GoogleError),

    /// Bad date, time zone or working hours.
    #[error(transparent)]
    Availability(#[from] AvailabilityError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Interactive prompt failed or was interrupted.
    #[error("prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to serialize config: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl ClientError {
    /// A line of advice printed after the error, if any applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Google(e) => e.code().hint(),
            Self::Config(_) => Some("run `founderos setup` to create a working configuration"),
            Self::Availability(AvailabilityError::UnknownTimezone(_)) => {
                Some("use an IANA zone name such as Europe/London or America/New_York")
            }
            _ => None,
        }
    }
}
