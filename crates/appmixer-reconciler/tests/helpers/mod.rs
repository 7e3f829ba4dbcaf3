//! Shared fixtures for reconciler integration tests.

#![allow(dead_code)]

use appmixer_client::{AppmixerClient, Session, SessionUser};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const CALLER_ID: &str = "caller-1";

pub fn client_with_scope(server: &MockServer, scope: &[&str]) -> AppmixerClient {
    let session = Session::new(
        server.uri(),
        "test-token-123",
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

/// Number of requests the mock server has seen.
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|r| r.len())
        .unwrap_or_default()
}

pub fn account_json(id: &str, display_name: Option<&str>) -> Value {
    json!({
        "accountId": id,
        "name": "bot@example.com",
        "displayName": display_name,
        "service": "appmixer:slack",
        "userId": CALLER_ID,
        "profileInfo": {"email": "bot@example.com", "teamId": 42},
        "icon": "slack.png",
        "label": "Slack"
    })
}
