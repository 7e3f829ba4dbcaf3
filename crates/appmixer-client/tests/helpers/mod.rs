//! Shared fixtures for client integration tests.

#![allow(dead_code)]

use appmixer_client::{AppmixerClient, Session, SessionUser};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TEST_TOKEN: &str = "test-token-123";
pub const CALLER_ID: &str = "caller-1";

/// Bearer header value the mock server should expect.
pub fn bearer() -> String {
    format!("Bearer {TEST_TOKEN}")
}

/// Client bound to `server` with the given scopes.
pub fn client_with_scope(server: &MockServer, scope: &[&str]) -> AppmixerClient {
    let session = Session::new(
        server.uri(),
        TEST_TOKEN,
        SessionUser {
            id: CALLER_ID.to_string(),
            username: "operator".to_string(),
            email: "operator@example.com".to_string(),
        },
        scope.iter().map(|s| (*s).to_string()).collect(),
    );
    AppmixerClient::with_http_client(session, reqwest::Client::new())
}

pub fn admin_client(server: &MockServer) -> AppmixerClient {
    client_with_scope(server, &["user", "admin"])
}

pub fn plain_client(server: &MockServer) -> AppmixerClient {
    client_with_scope(server, &["user"])
}

/// User payload as the API returns it.
pub fn user_json(id: &str, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "isActive": true,
        "plan": {"name": "pro", "seats": 3},
        "scope": ["user"],
        "vendor": ["acme"],
        "created": "2024-05-01T10:00:00.000Z"
    })
}

/// Account payload as the API returns it.
pub fn account_json(id: &str, service: &str) -> Value {
    json!({
        "accountId": id,
        "name": "bot@example.com",
        "displayName": "Support bot",
        "service": service,
        "userId": CALLER_ID,
        "profileInfo": {"email": "bot@example.com", "teamId": 42},
        "icon": "data:image/png;base64,AAA",
        "label": "Slack"
    })
}
