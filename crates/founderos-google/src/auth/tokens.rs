//! Persisted OAuth tokens.
//!
//! Each service keeps its own JSON token file in the credentials directory.
//! Files are replaced atomically and, on Unix, readable by the owner only.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GoogleError, GoogleResult};

/// Tokens are treated as expired this long before Google says they are.
const EXPIRY_BUFFER_SECS: i64 = 60;

/// An OAuth token set as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Already reduced by the expiry buffer.
    pub expires_at: Option<DateTime<Utc>>,
    pub scopes: Vec<String>,
    pub last_refresh: DateTime<Utc>,
}

impl TokenInfo {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expires_in_secs.map(expiry_from_now),
            scopes,
            last_refresh: Utc::now(),
        }
    }

    /// Tokens without an expiry never expire.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }

    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Applies a refresh response. Google only sometimes rotates the refresh
    /// token; the old one is kept when it does not.
    pub fn apply_refresh(
        &mut self,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) {
        self.access_token = access_token.into();
        if refresh_token.is_some() {
            self.refresh_token = refresh_token;
        }
        self.expires_at = expires_in_secs.map(expiry_from_now);
        self.last_refresh = Utc::now();
    }
}

fn expiry_from_now(secs: i64) -> DateTime<Utc> {
    Utc::now() + Duration::seconds(secs) - Duration::seconds(EXPIRY_BUFFER_SECS)
}

/// File-backed token store for one service.
#[derive(Debug)]
pub struct TokenStorage {
    path: PathBuf,
    tokens: Option<TokenInfo>,
}

impl TokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tokens: None,
        }
    }

    /// Loads the token file. Returns `Ok(false)` when there is none.
    pub fn load(&mut self) -> GoogleResult<bool> {
        if !self.path.exists() {
            debug!("no token file at {:?}", self.path);
            return Ok(false);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            GoogleError::configuration(format!("failed to read token file {:?}", self.path))
                .with_source(e)
        })?;
        let tokens: TokenInfo = serde_json::from_str(&content).map_err(|e| {
            GoogleError::configuration(format!(
                "token file {:?} is corrupt, delete it and authenticate again",
                self.path
            ))
            .with_source(e)
        })?;

        debug!("loaded tokens from {:?}", self.path);
        self.tokens = Some(tokens);
        Ok(true)
    }

    pub fn save(&self) -> GoogleResult<()> {
        let tokens = self
            .tokens
            .as_ref()
            .ok_or_else(|| GoogleError::internal("no tokens to save"))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                GoogleError::configuration(format!("failed to create {:?}", parent)).with_source(e)
            })?;
        }

        let content = serde_json::to_string_pretty(tokens)
            .map_err(|e| GoogleError::internal("failed to serialize tokens").with_source(e))?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content).map_err(|e| {
            GoogleError::configuration(format!("failed to write {:?}", temp_path)).with_source(e)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600));
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            GoogleError::configuration(format!("failed to replace {:?}", self.path)).with_source(e)
        })?;

        info!("saved tokens to {:?}", self.path);
        Ok(())
    }

    pub fn get(&self) -> Option<&TokenInfo> {
        self.tokens.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut TokenInfo> {
        self.tokens.as_mut()
    }

    /// Replaces the tokens and writes them out.
    pub fn set(&mut self, tokens: TokenInfo) -> GoogleResult<()> {
        self.tokens = Some(tokens);
        self.save()
    }

    /// Forgets the tokens and removes the file.
    pub fn clear(&mut self) -> GoogleResult<()> {
        self.tokens = None;
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                GoogleError::configuration(format!("failed to remove {:?}", self.path))
                    .with_source(e)
            })?;
            info!("removed token file {:?}", self.path);
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when there are no tokens or they lack one of `required_scopes`.
    pub fn needs_reauth(&self, required_scopes: &[String]) -> bool {
        self.tokens
            .as_ref()
            .is_none_or(|t| !t.has_scopes(required_scopes))
    }
}
