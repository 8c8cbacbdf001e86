//! OAuth client credentials and per-service authentication settings.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{GoogleError, GoogleResult};

/// File name of the Google Cloud Console download inside the credentials directory.
pub const CLIENT_SECRET_FILE: &str = "client_secret.json";

pub const GMAIL_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/gmail.compose",
    "https://www.googleapis.com/auth/gmail.modify",
];

pub const CALENDAR_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/calendar.events",
];

/// A Google API authorized separately, with its own token file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Gmail,
    Calendar,
}

impl Service {
    pub fn scopes(self) -> Vec<String> {
        let scopes = match self {
            Self::Gmail => GMAIL_SCOPES,
            Self::Calendar => CALENDAR_SCOPES,
        };
        scopes.iter().map(|s| s.to_string()).collect()
    }

    pub fn token_file_name(self) -> &'static str {
        match self {
            Self::Gmail => "gmail_token.json",
            Self::Calendar => "calendar_token.json",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gmail => "gmail",
            Self::Calendar => "calendar",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gmail => "Gmail",
            Self::Calendar => "Calendar",
        };
        f.write_str(name)
    }
}

/// OAuth 2.0 client id and secret of a desktop application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Layout of the credentials JSON: either the Cloud Console download with an
/// `installed`/`web` section, or `client_id`/`client_secret` at the root.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<NestedCredentials>,
    web: Option<NestedCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
}

impl OAuthCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> GoogleResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GoogleError::configuration(format!("failed to read credentials file {:?}", path))
                .with_source(e)
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> GoogleResult<Self> {
        let file: CredentialsFile = serde_json::from_str(json).map_err(|e| {
            GoogleError::configuration("failed to parse credentials JSON").with_source(e)
        })?;

        if let Some(nested) = file.installed.or(file.web) {
            return Ok(Self::new(nested.client_id, nested.client_secret));
        }
        if let (Some(id), Some(secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(id, secret));
        }

        Err(GoogleError::configuration(
            "credentials JSON needs an 'installed' or 'web' section, or client_id and client_secret",
        ))
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// Everything needed to obtain and persist tokens for one [`Service`].
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub service: Service,
    pub credentials: OAuthCredentials,
    pub scopes: Vec<String>,
    pub token_path: PathBuf,
    /// Ports tried, in order, for the OAuth redirect listener.
    pub loopback_port_range: (u16, u16),
    pub callback_timeout: Duration,
    pub request_timeout: Duration,
}

impl AuthConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 300;

    /// Settings for `service` with its token file in `credentials_dir`.
    pub fn new(service: Service, credentials: OAuthCredentials, credentials_dir: &Path) -> Self {
        Self {
            service,
            credentials,
            scopes: service.scopes(),
            token_path: credentials_dir.join(service.token_file_name()),
            loopback_port_range: (8080, 8090),
            callback_timeout: Duration::from_secs(Self::DEFAULT_CALLBACK_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    pub fn with_loopback_port_range(mut self, start: u16, end: u16) -> Self {
        self.loopback_port_range = (start, end);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn validate(&self) -> GoogleResult<()> {
        self.credentials
            .validate()
            .map_err(|e| GoogleError::configuration(format!("invalid credentials: {e}")))?;

        if self.scopes.is_empty() {
            return Err(GoogleError::configuration("at least one OAuth scope is required"));
        }
        if self.loopback_port_range.0 > self.loopback_port_range.1 {
            return Err(GoogleError::configuration("invalid loopback port range"));
        }
        Ok(())
    }
}
