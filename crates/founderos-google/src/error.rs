//! Error types for Google API operations.
//!
//! Every failure from OAuth, token storage, and the Gmail and Calendar REST
//! calls is reported as a [`GoogleError`] carrying a [`GoogleErrorCode`].

use std::fmt;
use thiserror::Error;

/// The category of a Google API error.
///
/// Commands use it to decide what advice to print alongside the message
/// (re-run `auth`, check the id, try again later).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoogleErrorCode {
    /// Authentication failed or credentials are invalid/expired.
    AuthenticationFailed,
    /// Authorization failed - user lacks permission.
    AuthorizationFailed,
    /// Network error - connection failed, timeout, DNS resolution, etc.
    NetworkError,
    /// Rate limit exceeded - too many requests.
    RateLimited,
    /// Server returned an error (5xx status codes).
    ServerError,
    /// Invalid response from the server - parse error, unexpected format.
    InvalidResponse,
    /// Resource not found (404).
    NotFound,
    /// Request was invalid (400) - bad parameters, malformed request.
    BadRequest,
    /// Configuration error - missing or invalid config.
    ConfigurationError,
    /// Unexpected local failure (I/O while saving, client construction).
    InternalError,
}

impl GoogleErrorCode {
    /// Returns a human-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }

    /// Advice printed under the error message, if there is any to give.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::AuthenticationFailed | Self::AuthorizationFailed => {
                Some("run `founderos gmail auth` or `founderos calendar auth` to sign in again")
            }
            Self::ConfigurationError => Some("run `founderos setup` or check `founderos config validate`"),
            Self::RateLimited => Some("Google is rate limiting requests, wait a minute and try again"),
            Self::NotFound => Some("check the message or event id"),
            _ => None,
        }
    }
}

impl fmt::Display for GoogleErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to Google.
#[derive(Debug, Error)]
pub struct GoogleError {
    /// The error code categorizing this error.
    code: GoogleErrorCode,
    /// A human-readable message describing the error.
    message: String,
    /// The API that generated this error (e.g. "gmail", "calendar").
    service: Option<String>,
    /// The underlying cause of this error, if any.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl GoogleError {
    /// Creates a new error with the given code and message.
    pub fn new(code: GoogleErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            service: None,
            source: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::AuthenticationFailed, message)
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::AuthorizationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::NetworkError, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::RateLimited, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::ServerError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::InvalidResponse, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::NotFound, message)
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::BadRequest, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(GoogleErrorCode::InternalError, message)
    }

    /// Sets the service name for this error.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> GoogleErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the service name, if set.
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }
}

impl fmt::Display for GoogleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref service) = self.service {
            write!(f, "[{}] ", service)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for Google operations.
pub type GoogleResult<T> = Result<T, GoogleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_display() {
        assert_eq!(
            GoogleErrorCode::AuthenticationFailed.as_str(),
            "authentication_failed"
        );
        assert_eq!(GoogleErrorCode::RateLimited.as_str(), "rate_limited");
    }

    #[test]
    fn error_code_hint() {
        assert!(GoogleErrorCode::AuthenticationFailed.hint().unwrap().contains("auth"));
        assert!(GoogleErrorCode::ConfigurationError.hint().unwrap().contains("setup"));
        assert!(GoogleErrorCode::ServerError.hint().is_none());
    }

    #[test]
    fn google_error_creation() {
        let err = GoogleError::authentication("token expired");
        assert_eq!(err.code(), GoogleErrorCode::AuthenticationFailed);
        assert_eq!(err.message(), "token expired");
        assert!(err.service().is_none());
    }

    #[test]
    fn google_error_with_service() {
        let err = GoogleError::network("connection timeout").with_service("gmail");
        assert_eq!(err.code(), GoogleErrorCode::NetworkError);
        assert_eq!(err.service(), Some("gmail"));
    }

    #[test]
    fn google_error_display() {
        let err = GoogleError::rate_limited("too many requests").with_service("calendar");
        let display = format!("{}", err);
        assert!(display.contains("[calendar]"));
        assert!(display.contains("rate_limited"));
        assert!(display.contains("too many requests"));
    }

    #[test]
    fn google_error_with_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("disk full");
        let err = GoogleError::internal("failed to write attachment").with_source(io_err);
        assert!(err.source().is_some());
    }
}
