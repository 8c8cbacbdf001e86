//! Google access for founderos.
//!
//! - [`auth`]: OAuth consent flow with PKCE, token files, [`GoogleSession`]
//! - [`calendar`]: Calendar API v3 events
//! - [`gmail`]: Gmail API v1 messages, drafts and attachments
//!
//! ```text
//! AuthConfig ──► GoogleSession::access_token() ──► ApiClient ──┬─► CalendarClient
//!                  (load / refresh / consent)                   └─► GmailClient
//! ```

pub mod api;
pub mod auth;
pub mod calendar;
pub mod error;
pub mod gmail;

pub use api::ApiClient;
pub use auth::{AuthConfig, GoogleSession, OAuthCredentials, Service};
pub use calendar::{CalendarClient, EventQuery, NewEvent};
pub use error::{GoogleError, GoogleErrorCode, GoogleResult};
pub use gmail::{DraftMessage, EmailRecord, GmailClient};

/// Opens an authenticated session for `config.service` and returns an API
/// client bound to its access token.
pub async fn connect(config: AuthConfig) -> GoogleResult<ApiClient> {
    let timeout = config.request_timeout;
    let service = config.service;
    let mut session = GoogleSession::new(config)?;
    let token = session.access_token().await?;
    ApiClient::new(service, token, timeout)
}
