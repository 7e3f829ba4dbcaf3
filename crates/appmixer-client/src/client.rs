//! Authenticated HTTP transport for the Appmixer API.
//!
//! Every call carries the session's bearer token. Non-2xx responses become
//! [`ClientError::Api`] with the message extracted from the error body.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use crate::auth::{self, Session};
use crate::config::ClientConfig;
use crate::error::{extract_error_message, ClientError, ClientResult};

/// Client bound to one authenticated session.
///
/// Cheap to clone; the session is shared and immutable.
#[derive(Debug, Clone)]
pub struct AppmixerClient {
    http: Client,
    session: Arc<Session>,
}

impl AppmixerClient {
    /// Validate `config`, authenticate, and return a client for the session.
    pub async fn authenticate(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let http = build_http_client(Duration::from_secs(config.timeout_secs))?;
        let session = auth::authenticate(&http, config).await?;
        Ok(Self::with_http_client(session, http))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(session: Session, http: Client) -> Self {
        Self {
            http,
            session: Arc::new(session),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.session.base_url()
    }

    /// Send one request and return the raw response body.
    ///
    /// `path` is appended to the base URL and may carry a query string. A JSON
    /// body (and its content type) is sent only when `body` is `Some`.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<Vec<u8>> {
        let url = format!("{}{}", self.session.base_url(), path);
        debug!(method = %method, url = %url, "Making API request");

        let mut builder = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        if !self.session.token().is_empty() {
            builder = builder.bearer_auth(self.session.token());
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            return Ok(bytes.to_vec());
        }

        let raw = String::from_utf8_lossy(&bytes).into_owned();
        error!(
            status_code = status.as_u16(),
            response = %raw,
            method = %method,
            url = %url,
            "API request failed"
        );

        Err(ClientError::Api {
            status: status.as_u16(),
            message: extract_error_message(&raw),
            body: raw,
        })
    }

    // ── Typed helpers ─────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let bytes = self.execute(Method::GET, path, None).await?;
        decode(&bytes)
    }

    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let bytes = self
            .execute(Method::POST, path, Some(serde_json::to_value(body)?))
            .await?;
        decode(&bytes)
    }

    /// POST whose response body is ignored.
    pub(crate) async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<()> {
        self.execute(Method::POST, path, Some(serde_json::to_value(body)?))
            .await?;
        Ok(())
    }

    /// PUT whose response body is ignored.
    pub(crate) async fn put_unit<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<()> {
        self.execute(Method::PUT, path, Some(serde_json::to_value(body)?))
            .await?;
        Ok(())
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let bytes = self.execute(Method::DELETE, path, None).await?;
        decode(&bytes)
    }

    /// DELETE whose response body is ignored.
    pub(crate) async fn delete_unit(&self, path: &str) -> ClientResult<()> {
        self.execute(Method::DELETE, path, None).await?;
        Ok(())
    }
}

fn build_http_client(timeout: Duration) -> ClientResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("appmixer-client/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ClientError::InvalidConfig(format!("Failed to build HTTP client: {e}")))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> ClientResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Percent-encode one path segment.
pub(crate) fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_is_parse() {
        let err = decode::<serde_json::Value>(b"not json").unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
        let text = err.to_string();
        assert!(text.starts_with("failed to parse response: "));
        assert_eq!(text.matches("parse response").count(), 1);
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("abc123"), "abc123");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }
}
