//! Shared fixtures for CLI integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use appmixer_cli::config::{AccountRead, ConnectionArgs, Settings};
use appmixer_client::{AppmixerClient, Session, SessionUser};
use appmixer_reconciler::AccountSpec;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

pub const CALLER_ID: &str = "caller-1";

pub fn admin_client(server: &MockServer) -> AppmixerClient {
    let session = Session::new(
        server.uri(),
        "test-token-123",
        SessionUser {
            id: CALLER_ID.to_string(),
            username: "operator".to_string(),
            email: "operator@example.com".to_string(),
        },
        vec!["user".to_string(), "admin".to_string()],
    );
    AppmixerClient::with_http_client(session, reqwest::Client::new())
}

/// Settings pointing at the mock server, with a poller that never sleeps.
pub fn settings(server: &MockServer) -> Settings {
    Settings::new(
        ConnectionArgs {
            api_url: Some(server.uri()),
            email: Some("operator@example.com".into()),
            password: Some("operator-pass".into()),
            timeout_secs: 5,
            delete_max_attempts: 3,
            delete_poll_interval_secs: 0,
            account_read: AccountRead::Direct,
        },
        CancellationToken::new(),
    )
}

pub fn slack_spec(api_key: &str) -> AccountSpec {
    AccountSpec {
        service: "appmixer:slack".into(),
        token: BTreeMap::from([("apiKey".to_string(), json!(api_key))]),
        display_name: None,
    }
}

pub fn account_json(id: &str, service: &str) -> Value {
    json!({
        "accountId": id,
        "name": "bot@example.com",
        "displayName": null,
        "service": service,
        "userId": CALLER_ID
    })
}

pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|r| r.len())
        .unwrap_or_default()
}
