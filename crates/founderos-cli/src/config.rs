//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/founderos/config.toml` by default.
//!
//! Credential values (`client_id`, `client_secret`) support secret references
//! (see [`crate::secret`]). When `[google]` has no credentials, the Google
//! Cloud Console download at `<credentials_dir>/client_secret.json` is used.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use founderos_core::{DEFAULT_END_HOUR, DEFAULT_START_HOUR, DEFAULT_TIMEZONE, parse_timezone};
use founderos_google::auth::CLIENT_SECRET_FILE;
use founderos_google::{AuthConfig, OAuthCredentials, Service};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};

/// Configuration for the founderos tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// IANA zone used by the calendar commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// The user's name, recorded by `founderos setup`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub google: GoogleSettings,

    pub paths: PathSettings,

    pub availability: AvailabilitySettings,
}

/// Google OAuth client and calendar selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// OAuth client ID (supports `pass::` and `env::` prefixes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// OAuth client secret (supports `pass::` and `env::` prefixes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    pub calendar_id: String,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            calendar_id: "primary".to_string(),
        }
    }
}

/// Where credentials, tokens and fetched data are kept. `~` is expanded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbox_dir: Option<PathBuf>,
}

/// Default working hours for `calendar availability`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilitySettings {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for AvailabilitySettings {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
        }
    }
}

impl ClientConfig {
    /// Loads `path`, or the default file if `path` is `None`.
    ///
    /// An explicitly named file must exist. A missing default file yields
    /// the default configuration.
    pub fn load(path: Option<&Path>) -> ClientResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    debug!("no config at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("founderos")
    }

    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("founderos")
    }

    /// Directory holding `client_secret.json` and the token files.
    pub fn credentials_dir(&self) -> PathBuf {
        match &self.paths.credentials_dir {
            Some(dir) => expand_home(dir),
            None => Self::default_data_dir().join("credentials"),
        }
    }

    /// Directory fetched emails and exports are written to.
    pub fn inbox_dir(&self) -> PathBuf {
        match &self.paths.inbox_dir {
            Some(dir) => expand_home(dir),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("founderos")
                .join("inbox"),
        }
    }

    /// The display zone: `override_tz` (the `--tz` flag or
    /// `FOUNDEROS_TIMEZONE`), then `timezone`, then Europe/London.
    pub fn resolve_timezone(&self, override_tz: Option<&str>) -> ClientResult<Tz> {
        let name = override_tz
            .or(self.timezone.as_deref())
            .unwrap_or(DEFAULT_TIMEZONE);
        Ok(parse_timezone(name)?)
    }

    /// OAuth client credentials from `[google]`, falling back to
    /// `<credentials_dir>/client_secret.json`.
    pub fn oauth_credentials(&self) -> ClientResult<OAuthCredentials> {
        if let Some(credentials) = self.google.resolve_credentials()? {
            return Ok(credentials);
        }

        let path = self.credentials_dir().join(CLIENT_SECRET_FILE);
        if !path.exists() {
            return Err(ClientError::Config(format!(
                "Google credentials not found. Either add to {}:\n  \
                 [google]\n  \
                 client_id = \"YOUR_ID.apps.googleusercontent.com\"\n  \
                 client_secret = \"YOUR_SECRET\"\n\n  \
                 or save the Google Cloud download as {}",
                Self::default_path().display(),
                path.display()
            )));
        }
        debug!("loading OAuth client from {}", path.display());
        Ok(OAuthCredentials::from_file(&path)?)
    }

    /// Authentication settings for one service, with its token file in
    /// [`credentials_dir`](Self::credentials_dir).
    pub fn auth_config(&self, service: Service) -> ClientResult<AuthConfig> {
        let credentials = self.oauth_credentials()?;
        Ok(AuthConfig::new(service, credentials, &self.credentials_dir()))
    }

    /// Checks every setting that can be checked offline.
    pub fn validate(&self) -> ClientResult<()> {
        if let Some(tz) = &self.timezone {
            parse_timezone(tz)?;
        }

        let hours = &self.availability;
        if hours.start_hour > 24 || hours.end_hour > 24 || hours.start_hour > hours.end_hour {
            return Err(ClientError::Config(format!(
                "[availability] hours must satisfy 0 <= start_hour <= end_hour <= 24 (got {}-{})",
                hours.start_hour, hours.end_hour
            )));
        }

        if self.google.calendar_id.trim().is_empty() {
            return Err(ClientError::Config(
                "[google] calendar_id must not be empty".to_string(),
            ));
        }

        if let Some(credentials) = self.google.resolve_credentials()? {
            credentials.validate().map_err(|e| {
                ClientError::Config(format!("invalid Google credentials: {}", e))
            })?;
        }
        Ok(())
    }
}

impl GoogleSettings {
    /// Inline credentials, with secret references expanded.
    ///
    /// Returns `None` when neither field is set. Setting only one of them is
    /// an error.
    pub(crate) fn resolve_credentials(&self) -> ClientResult<Option<OAuthCredentials>> {
        match (&self.client_id, &self.client_secret) {
            (None, None) => Ok(None),
            (Some(id), Some(secret)) => {
                let id = crate::secret::resolve(id)?;
                let secret = crate::secret::resolve(secret)?;
                Ok(Some(OAuthCredentials::new(id, secret)))
            }
            (Some(_), None) => Err(ClientError::Config(
                "client_secret is missing from [google] section in config.toml".to_string(),
            )),
            (None, Some(_)) => Err(ClientError::Config(
                "client_id is missing from [google] section in config.toml".to_string(),
            )),
        }
    }
}

/// Writes `name` and `timezone` into the config file at `path`, keeping
/// every other key and comment as it was.
pub fn save_user_details(path: &Path, name: &str, timezone: &str) -> ClientResult<()> {
    let content = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut doc = content.parse::<toml_edit::DocumentMut>().map_err(|e| {
        ClientError::Config(format!("could not parse {} for writing: {}", path.display(), e))
    })?;
    doc["name"] = toml_edit::value(name);
    doc["timezone"] = toml_edit::value(timezone);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, doc.to_string())?;
    info!("saved user details to {}", path.display());
    Ok(())
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
