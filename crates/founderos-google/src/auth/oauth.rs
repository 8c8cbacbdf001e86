//! OAuth 2.0 authorization-code flow with PKCE for installed applications.
//!
//! The browser is sent to Google's consent page with a SHA-256 code
//! challenge. Google redirects back to a listener on `127.0.0.1`, which
//! hands the authorization code to [`OAuthClient::authorize`]; the code and
//! its verifier are then exchanged for an access/refresh token pair.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use reqwest::StatusCode;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::error::{GoogleError, GoogleResult};

use super::config::{AuthConfig, OAuthCredentials};
use super::tokens::TokenInfo;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Random bytes behind the code verifier.
const CODE_VERIFIER_LENGTH: usize = 32;

/// Exchanges OAuth grants against Google's token endpoint.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    http: reqwest::Client,
}

impl OAuthClient {
    pub fn new(credentials: OAuthCredentials, timeout: Duration) -> GoogleResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GoogleError::internal("failed to create HTTP client").with_source(e))?;

        Ok(Self { credentials, http })
    }

    /// Runs the interactive consent flow and returns fresh tokens.
    ///
    /// Binds the loopback listener first so the redirect URI is known, opens
    /// the browser (printing the URL when that fails), then blocks until the
    /// callback arrives or `config.callback_timeout` elapses.
    pub async fn authorize(&self, config: &AuthConfig) -> GoogleResult<TokenInfo> {
        let pkce = PkceFlow::new();

        let (listener, port) = bind_loopback_server(config.loopback_port_range)?;
        let redirect_uri = format!("http://127.0.0.1:{}/callback", port);
        let auth_url = pkce.build_auth_url(&self.credentials.client_id, &redirect_uri, &config.scopes);

        info!(service = %config.service, port, "starting OAuth consent flow");
        debug!("authorization URL: {}", auth_url);

        println!("Opening browser for {} authorization...", config.service);
        if let Err(e) = open::that(&auth_url) {
            warn!("failed to open browser: {}", e);
            println!("\nOpen this URL in your browser:\n\n{}\n", auth_url);
        }

        let callback = wait_for_callback(listener, config.callback_timeout)?;
        if callback.state != pkce.state {
            return Err(GoogleError::authentication(
                "OAuth state mismatch, the callback did not come from this login",
            ));
        }

        info!("received authorization code");
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", callback.code.as_str()),
            ("code_verifier", pkce.verifier.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri.as_str()),
        ];
        let response = self.post_token(&params, "token exchange").await?;

        Ok(TokenInfo::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
            granted_scopes(response.scope.as_deref(), &config.scopes),
        ))
    }

    /// Trades a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> GoogleResult<TokenResponse> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let response = self.post_token(&params, "token refresh").await?;
        info!("refreshed access token");
        Ok(response)
    }

    async fn post_token(&self, params: &[(&str, &str)], what: &str) -> GoogleResult<TokenResponse> {
        let response = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(params)
            .send()
            .await
            .map_err(|e| GoogleError::network(format!("{what} request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GoogleError::network(format!("failed to read {what} response: {e}")))?;

        if !status.is_success() {
            return Err(token_error(status, what, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| GoogleError::invalid_response(format!("invalid token response: {e}")))
    }
}

/// Maps a failed token endpoint response.
///
/// 5xx and 429 keep their own codes; anything else is a rejected grant.
fn token_error(status: StatusCode, what: &str, body: &str) -> GoogleError {
    let message = format!("{what} failed ({status}): {}", body.trim());
    if status.is_server_error() {
        GoogleError::server(message)
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        GoogleError::rate_limited(message)
    } else {
        GoogleError::authentication(message)
    }
}

/// Successful body of the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Space-separated scopes actually granted.
    #[serde(default)]
    pub scope: Option<String>,
}

/// Google may grant a superset (or, with incremental consent, a subset) of
/// what was asked for. Fall back to the request when it says nothing.
fn granted_scopes(granted: Option<&str>, requested: &[String]) -> Vec<String> {
    match granted {
        Some(s) if !s.trim().is_empty() => s.split_whitespace().map(str::to_string).collect(),
        _ => requested.to_vec(),
    }
}

/// Code and state received on the loopback redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Callback {
    code: String,
    state: String,
}

fn bind_loopback_server(port_range: (u16, u16)) -> GoogleResult<(TcpListener, u16)> {
    for port in port_range.0..=port_range.1 {
        if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)) {
            debug!("bound loopback listener on port {}", port);
            return Ok((listener, port));
        }
    }
    Err(GoogleError::configuration(format!(
        "no free port in range {}-{} for the OAuth callback",
        port_range.0, port_range.1
    )))
}

/// Accepts connections on a helper thread until one carries the callback.
fn wait_for_callback(listener: TcpListener, timeout: Duration) -> GoogleResult<Callback> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Some(result) = handle_callback(stream) {
                        let _ = tx.send(result);
                        return;
                    }
                }
                Err(e) => error!("failed to accept OAuth callback connection: {}", e),
            }
        }
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(GoogleError::authentication(format!(
            "no OAuth callback received within {}s",
            timeout.as_secs()
        ))),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(GoogleError::internal("OAuth callback listener stopped"))
        }
    }
}

/// Answers one HTTP request. Returns `None` for requests that are not the
/// callback (favicon fetches and the like) so the listener keeps waiting.
fn handle_callback(mut stream: TcpStream) -> Option<GoogleResult<Callback>> {
    let mut request_line = String::new();
    BufReader::new(&stream).read_line(&mut request_line).ok()?;

    let result = parse_callback_request(&request_line)?;

    let response = match result {
        Ok(_) => {
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
            <html><body><h1>Authorization complete</h1>\
            <p>You can close this window and return to the terminal.</p></body></html>"
        }
        Err(_) => {
            "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
            <html><body><h1>Authorization failed</h1>\
            <p>You can close this window.</p></body></html>"
        }
    };
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();

    Some(result)
}

/// Parses `GET /callback?code=..&state=.. HTTP/1.1`.
fn parse_callback_request(request_line: &str) -> Option<GoogleResult<Callback>> {
    let mut parts = request_line.split_whitespace();
    if parts.next()? != "GET" {
        return None;
    }
    let target = parts.next()?;
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    if path != "/callback" {
        return None;
    }

    let mut code = None;
    let mut state = None;
    let mut denied = None;
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value = urlencoding::decode(value)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| value.to_string());
        match key {
            "code" => code = Some(value),
            "state" => state = Some(value),
            "error" => denied = Some(value),
            _ => {}
        }
    }

    if let Some(reason) = denied {
        return Some(Err(GoogleError::authorization(format!(
            "authorization denied: {reason}"
        ))));
    }
    Some(match code {
        Some(code) => Ok(Callback {
            code,
            state: state.unwrap_or_default(),
        }),
        None => Err(GoogleError::authentication(
            "missing authorization code in callback",
        )),
    })
}

/// RFC 7636 verifier, challenge and CSRF state for one login attempt.
#[derive(Debug)]
pub struct PkceFlow {
    pub verifier: String,
    pub challenge: String,
    pub state: String,
}

impl PkceFlow {
    pub fn new() -> Self {
        let verifier = random_token(CODE_VERIFIER_LENGTH);
        let challenge = compute_challenge(&verifier);
        Self {
            verifier,
            challenge,
            state: random_token(16),
        }
    }

    /// Consent page URL requesting offline access, so a refresh token is issued.
    pub fn build_auth_url(&self, client_id: &str, redirect_uri: &str, scopes: &[String]) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&prompt=consent",
            GOOGLE_AUTH_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scopes.join(" ")),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(bytes)
}

fn compute_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GoogleErrorCode;

    #[test]
    fn verifier_is_43_chars() {
        // 32 bytes base64url without padding.
        assert_eq!(PkceFlow::new().verifier.len(), 43);
    }

    #[test]
    fn challenge_matches_rfc7636_example() {
        // Appendix B of RFC 7636.
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            compute_challenge(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn flows_are_random() {
        let a = PkceFlow::new();
        let b = PkceFlow::new();
        assert_ne!(a.verifier, b.verifier);
        assert_ne!(a.state, b.state);
    }

    #[test]
    fn auth_url_requests_offline_access() {
        let flow = PkceFlow::new();
        let url = flow.build_auth_url(
            "test.apps.googleusercontent.com",
            "http://127.0.0.1:8080/callback",
            &[
                "https://www.googleapis.com/auth/gmail.readonly".to_string(),
                "https://www.googleapis.com/auth/gmail.compose".to_string(),
            ],
        );

        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A8080%2Fcallback"));
        assert!(url.contains("gmail.readonly%20https"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains(&format!("state={}", flow.state)));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
    }

    #[test]
    fn token_endpoint_outage_is_not_an_auth_failure() {
        let err = token_error(StatusCode::SERVICE_UNAVAILABLE, "token refresh", "backend error\n");
        assert_eq!(err.code(), GoogleErrorCode::ServerError);
        assert_eq!(err.message(), "token refresh failed (503 Service Unavailable): backend error");

        let err = token_error(StatusCode::TOO_MANY_REQUESTS, "token refresh", "");
        assert_eq!(err.code(), GoogleErrorCode::RateLimited);
    }

    #[test]
    fn rejected_grant_is_an_auth_failure() {
        let err = token_error(
            StatusCode::BAD_REQUEST,
            "token refresh",
            r#"{"error": "invalid_grant"}"#,
        );
        assert_eq!(err.code(), GoogleErrorCode::AuthenticationFailed);
        assert!(err.message().contains("invalid_grant"));
    }

    #[test]
    fn callback_with_code_and_state() {
        let result = parse_callback_request("GET /callback?state=abc&code=4%2F0Ab HTTP/1.1\r\n")
            .unwrap()
            .unwrap();
        assert_eq!(
            result,
            Callback {
                code: "4/0Ab".to_string(),
                state: "abc".to_string()
            }
        );
    }

    #[test]
    fn callback_denied() {
        let err = parse_callback_request("GET /callback?error=access_denied HTTP/1.1")
            .unwrap()
            .unwrap_err();
        assert_eq!(err.code(), GoogleErrorCode::AuthorizationFailed);
        assert!(err.message().contains("access_denied"));
    }

    #[test]
    fn callback_without_code() {
        let err = parse_callback_request("GET /callback?state=abc HTTP/1.1")
            .unwrap()
            .unwrap_err();
        assert_eq!(err.code(), GoogleErrorCode::AuthenticationFailed);
    }

    #[test]
    fn unrelated_requests_are_ignored() {
        assert!(parse_callback_request("GET /favicon.ico HTTP/1.1").is_none());
        assert!(parse_callback_request("POST /callback?code=x HTTP/1.1").is_none());
        assert!(parse_callback_request("").is_none());
    }

    #[test]
    fn granted_scopes_prefer_response() {
        let requested = vec!["a".to_string()];
        assert_eq!(granted_scopes(Some("a b"), &requested), vec!["a", "b"]);
        assert_eq!(granted_scopes(None, &requested), requested);
        assert_eq!(granted_scopes(Some(" "), &requested), requested);
    }

    #[test]
    fn loopback_bind_skips_taken_port() {
        let (held, port) = bind_loopback_server((18431, 18440)).unwrap();
        let (_second, next) = bind_loopback_server((port, 18440)).unwrap();
        assert!(next > port);
        drop(held);
    }
}
