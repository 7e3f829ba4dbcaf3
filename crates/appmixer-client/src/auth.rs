//! Session bootstrap: credentials in, bearer token and caller identity out.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::UserResponse;
use crate::scope::ADMIN_SCOPE;

/// Identity of the authenticated caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Authenticated session, created once per process and never refreshed.
///
/// The [`Debug`] impl redacts the bearer token.
#[derive(Clone)]
pub struct Session {
    base_url: String,
    token: String,
    user: SessionUser,
    scope: Vec<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .field("scope", &self.scope)
            .finish()
    }
}

impl Session {
    /// Build a session directly (tests, or tokens obtained out of band).
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        user: SessionUser,
        scope: Vec<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            user,
            scope,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    #[must_use]
    pub fn scope(&self) -> &[String] {
        &self.scope
    }

    /// Whether `id` is the authenticated caller.
    #[must_use]
    pub fn is_self(&self, id: &str) -> bool {
        !self.user.id.is_empty() && self.user.id == id
    }
}

#[derive(Serialize)]
struct AuthRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    user: UserResponse,
    token: String,
}

/// Exchange credentials for a session via `POST /user/auth`.
///
/// Only HTTP 200 counts as success. The request carries no bearer header.
pub async fn authenticate(http: &Client, config: &ClientConfig) -> ClientResult<Session> {
    let base_url = config.api_url.trim_end_matches('/');
    let url = format!("{base_url}/user/auth");
    debug!(url = %url, email = %config.email, "Authenticating with Appmixer");

    let response = http
        .post(&url)
        .json(&AuthRequest {
            email: &config.email,
            password: &config.password,
        })
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if status != StatusCode::OK {
        error!(status_code = status.as_u16(), url = %url, "Authentication failed");
        return Err(ClientError::AuthenticationFailed {
            status: status.as_u16(),
            body,
        });
    }

    let auth: AuthResponse = serde_json::from_str(&body)
        .map_err(|e| ClientError::Parse(format!("failed to parse auth response: {e}")))?;

    let session = Session::new(
        base_url,
        auth.token,
        SessionUser {
            id: auth.user.id,
            username: auth.user.username,
            email: auth.user.email,
        },
        auth.user.scope,
    );

    let is_admin = session.scope().iter().any(|s| s == ADMIN_SCOPE);
    if !is_admin {
        warn!("User does not have admin scope. Some operations will fail.");
    }
    info!(
        user_id = %session.user().id,
        is_admin,
        "Successfully authenticated"
    );

    Ok(session)
}
