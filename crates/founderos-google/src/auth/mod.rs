//! OAuth for installed applications: consent flow, token storage, sessions.

mod config;
mod oauth;
mod session;
mod tokens;

pub use config::{
    AuthConfig, CALENDAR_SCOPES, CLIENT_SECRET_FILE, GMAIL_SCOPES, OAuthCredentials, Service,
};
pub use oauth::{GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, OAuthClient, PkceFlow, TokenResponse};
pub use session::{GoogleSession, TokenAction};
pub use tokens::{TokenInfo, TokenStorage};
