//! Client error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Error returned by the Appmixer client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API answered with a status outside `[200, 300)`.
    ///
    /// `body` keeps the raw response text so callers can inspect it
    /// structurally (e.g. a `statusCode` field) instead of matching on the
    /// message.
    #[error("API request failed with status {status}: {message}")]
    Api {
        status: u16,
        message: String,
        body: String,
    },

    /// Session bootstrap did not answer with HTTP 200.
    #[error("authentication failed with status {status}: {body}")]
    AuthenticationFailed { status: u16, body: String },

    /// The session lacks the scope required for the operation.
    #[error("{operation} requires {scope} permissions")]
    PermissionDenied { operation: String, scope: String },

    /// Network-level failure (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request or response body could not be (de)serialized.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Client could not be built from the supplied settings.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Parse(e.to_string())
    }
}

impl ClientError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } | ClientError::AuthenticationFailed { status, .. } => {
                Some(*status)
            }
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response body parsed as JSON, if the error carries one.
    #[must_use]
    pub fn body_json(&self) -> Option<serde_json::Value> {
        match self {
            ClientError::Api { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }

    /// Whether this error means the remote entity does not exist.
    ///
    /// Structural signals win: the HTTP status, then a `statusCode` field in
    /// the JSON body. Only errors without any structured data fall back to
    /// looking for `status 404` in the message text.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            ClientError::Api { status, .. } => {
                *status == 404
                    || self
                        .body_json()
                        .and_then(|body| body_status_code(&body))
                        .is_some_and(|code| code == 404)
            }
            ClientError::Http(e) => e.status().is_some_and(|s| s.as_u16() == 404),
            other => mentions_not_found(&other.to_string()),
        }
    }

}

/// `statusCode` field of an error body, as sent by the API's error handler.
fn body_status_code(body: &serde_json::Value) -> Option<u64> {
    body.get("statusCode").and_then(serde_json::Value::as_u64)
}

/// Text fallback for not-found detection.
///
/// Weak heuristic: only used when no status code is available.
pub fn mentions_not_found(text: &str) -> bool {
    text.contains("status 404")
}

/// Extract a readable message from a failed response body.
///
/// Tries the `message` field, then `error`, then falls back to the raw text.
/// Empty strings and `null` count as absent.
pub(crate) fn extract_error_message(body: &str) -> String {
    if let Ok(serde_json::Value::Object(obj)) = serde_json::from_str::<serde_json::Value>(body) {
        let found = ["message", "error"]
            .iter()
            .filter_map(|key| obj.get(*key))
            .map(|value| match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            })
            .find(|message| !message.is_empty());
        if let Some(message) = found {
            return message;
        }
    }
    body.to_string()
}
