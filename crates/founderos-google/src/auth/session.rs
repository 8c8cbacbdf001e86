//! Keeps one service's access token valid across a command.

use tracing::{debug, info, warn};

use crate::error::{GoogleError, GoogleErrorCode, GoogleResult};

use super::config::AuthConfig;
use super::oauth::OAuthClient;
use super::tokens::{TokenInfo, TokenStorage};

/// What has to happen before a stored token can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAction {
    Use,
    Refresh,
    Authorize,
}

impl TokenAction {
    /// Missing tokens or missing scopes need consent; an expired token with a
    /// refresh token is refreshed silently.
    pub fn for_tokens(tokens: Option<&TokenInfo>, scopes: &[String]) -> Self {
        match tokens {
            None => Self::Authorize,
            Some(t) if !t.has_scopes(scopes) => Self::Authorize,
            Some(t) if !t.is_expired() => Self::Use,
            Some(t) if t.can_refresh() => Self::Refresh,
            Some(_) => Self::Authorize,
        }
    }
}

/// Authenticated session for a single [`Service`](super::config::Service).
#[derive(Debug)]
pub struct GoogleSession {
    config: AuthConfig,
    storage: TokenStorage,
    oauth: OAuthClient,
}

impl GoogleSession {
    /// Loads any stored tokens. Does not talk to Google.
    pub fn new(config: AuthConfig) -> GoogleResult<Self> {
        config.validate()?;

        let mut storage = TokenStorage::new(&config.token_path);
        storage.load()?;
        let oauth = OAuthClient::new(config.credentials.clone(), config.request_timeout)?;

        Ok(Self {
            config,
            storage,
            oauth,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Next step [`access_token`](Self::access_token) would take.
    pub fn pending_action(&self) -> TokenAction {
        TokenAction::for_tokens(self.storage.get(), &self.config.scopes)
    }

    /// Returns a usable access token, refreshing or running the browser
    /// consent flow as needed. A rejected refresh falls back to consent.
    pub async fn access_token(&mut self) -> GoogleResult<String> {
        match self.pending_action() {
            TokenAction::Use => {
                debug!(service = %self.config.service, "using stored access token");
            }
            TokenAction::Refresh => {
                if let Err(e) = self.refresh().await {
                    if e.code() != GoogleErrorCode::AuthenticationFailed {
                        return Err(e);
                    }
                    warn!("refresh token rejected, asking for consent again: {}", e);
                    self.authorize().await?;
                }
            }
            TokenAction::Authorize => self.authorize().await?,
        }

        self.storage
            .get()
            .map(|t| t.access_token.clone())
            .ok_or_else(|| GoogleError::internal("token store is empty after login"))
    }

    /// Runs the consent flow regardless of what is stored.
    pub async fn authorize(&mut self) -> GoogleResult<()> {
        let tokens = self.oauth.authorize(&self.config).await?;
        if !tokens.has_scopes(&self.config.scopes) {
            warn!(
                granted = ?tokens.scopes,
                "Google granted fewer scopes than requested"
            );
        }
        self.storage.set(tokens)?;
        info!(service = %self.config.service, "authentication complete");
        Ok(())
    }

    async fn refresh(&mut self) -> GoogleResult<()> {
        let Some(refresh_token) = self.storage.get().and_then(|t| t.refresh_token.clone()) else {
            return self.authorize().await;
        };

        debug!(service = %self.config.service, "refreshing expired access token");
        let response = self.oauth.refresh(&refresh_token).await?;
        if let Some(tokens) = self.storage.get_mut() {
            tokens.apply_refresh(
                response.access_token,
                response.refresh_token,
                response.expires_in,
            );
        }
        self.storage.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::config::{OAuthCredentials, Service};
    use chrono::{Duration, Utc};
    use std::path::Path;

    fn scopes() -> Vec<String> {
        Service::Calendar.scopes()
    }

    fn expired(refresh: Option<&str>) -> TokenInfo {
        let mut t = TokenInfo::new("a", refresh.map(str::to_string), Some(3600), scopes());
        t.expires_at = Some(Utc::now() - Duration::minutes(5));
        t
    }

    #[test]
    fn no_tokens_needs_consent() {
        assert_eq!(TokenAction::for_tokens(None, &scopes()), TokenAction::Authorize);
    }

    #[test]
    fn fresh_tokens_are_used() {
        let t = TokenInfo::new("a", None, Some(3600), scopes());
        assert_eq!(TokenAction::for_tokens(Some(&t), &scopes()), TokenAction::Use);
    }

    #[test]
    fn expired_with_refresh_token_is_refreshed() {
        let t = expired(Some("r"));
        assert_eq!(TokenAction::for_tokens(Some(&t), &scopes()), TokenAction::Refresh);
    }

    #[test]
    fn expired_without_refresh_token_needs_consent() {
        let t = expired(None);
        assert_eq!(TokenAction::for_tokens(Some(&t), &scopes()), TokenAction::Authorize);
    }

    #[test]
    fn missing_scope_needs_consent_even_if_fresh() {
        let t = TokenInfo::new("a", Some("r".into()), Some(3600), Service::Gmail.scopes());
        assert_eq!(TokenAction::for_tokens(Some(&t), &scopes()), TokenAction::Authorize);
    }

    #[test]
    fn session_loads_stored_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let credentials = OAuthCredentials::new("x.apps.googleusercontent.com", "secret");
        let config = AuthConfig::new(Service::Calendar, credentials, dir.path());

        let mut storage = TokenStorage::new(&config.token_path);
        storage
            .set(TokenInfo::new("stored", Some("r".into()), Some(3600), scopes()))
            .unwrap();

        let session = GoogleSession::new(config).unwrap();
        assert_eq!(session.pending_action(), TokenAction::Use);
    }

    #[tokio::test]
    async fn fresh_token_is_returned_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let credentials = OAuthCredentials::new("x.apps.googleusercontent.com", "secret");
        let config = AuthConfig::new(Service::Gmail, credentials, dir.path());
        TokenStorage::new(&config.token_path)
            .set(TokenInfo::new("stored", None, Some(3600), Service::Gmail.scopes()))
            .unwrap();

        let mut session = GoogleSession::new(config).unwrap();
        assert_eq!(session.access_token().await.unwrap(), "stored");
    }

    #[test]
    fn invalid_credentials_are_rejected() {
        let credentials = OAuthCredentials::new("not-a-client-id", "secret");
        let config = AuthConfig::new(Service::Gmail, credentials, Path::new("/nonexistent"));
        let err = GoogleSession::new(config).unwrap_err();
        assert_eq!(err.code(), GoogleErrorCode::ConfigurationError);
    }
}
