//! Authenticated JSON requests against Google REST APIs.
//!
//! [`ApiClient`] carries the bearer token and maps HTTP failures onto
//! [`GoogleError`] the same way for Gmail and Calendar.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::Service;
use crate::error::{GoogleError, GoogleResult};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    access_token: String,
    service: Service,
}

impl ApiClient {
    pub fn new(
        service: Service,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> GoogleResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("founderos/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GoogleError::internal("failed to create HTTP client").with_source(e))?;

        Ok(Self {
            http,
            access_token: access_token.into(),
            service,
        })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url).bearer_auth(&self.access_token)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url).bearer_auth(&self.access_token)
    }

    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.http.delete(url).bearer_auth(&self.access_token)
    }

    /// Sends the request and decodes a JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> GoogleResult<T> {
        let response = self.send(request).await?;
        let body = response
            .text()
            .await
            .map_err(|e| self.tag(GoogleError::network(format!("failed to read response: {e}"))))?;

        serde_json::from_str(&body).map_err(|e| {
            self.tag(GoogleError::invalid_response(format!("failed to parse response: {e}")))
        })
    }

    /// Sends the request, discarding any body on success.
    pub async fn send_empty(&self, request: RequestBuilder) -> GoogleResult<()> {
        self.send(request).await.map(|_| ())
    }

    async fn send(&self, request: RequestBuilder) -> GoogleResult<Response> {
        let response = request.send().await.map_err(|e| {
            let err = if e.is_timeout() {
                GoogleError::network("request timed out")
            } else if e.is_connect() {
                GoogleError::network(format!("connection failed: {e}"))
            } else {
                GoogleError::network(format!("request failed: {e}"))
            };
            self.tag(err)
        })?;

        let status = response.status();
        debug!(service = self.service.as_str(), %status, url = %response.url(), "API response");
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        Err(self.tag(error_for_status(status, retry_after, &body)))
    }

    fn tag(&self, err: GoogleError) -> GoogleError {
        err.with_service(self.service.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Maps a non-success status to an error, preferring Google's own message.
pub(crate) fn error_for_status(status: StatusCode, retry_after: Option<u64>, body: &str) -> GoogleError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    let detail = if detail.is_empty() {
        status.to_string()
    } else {
        detail
    };

    match status {
        StatusCode::UNAUTHORIZED => {
            GoogleError::authentication(format!("access token rejected: {detail}"))
        }
        StatusCode::FORBIDDEN => GoogleError::authorization(format!("access denied: {detail}")),
        StatusCode::NOT_FOUND | StatusCode::GONE => GoogleError::not_found(detail),
        StatusCode::TOO_MANY_REQUESTS => GoogleError::rate_limited(match retry_after {
            Some(secs) => format!("{detail}, retry after {secs} seconds"),
            None => detail,
        }),
        s if s.is_client_error() => GoogleError::bad_request(format!("{s}: {detail}")),
        s => GoogleError::server(format!("{s}: {detail}")),
    }
}
