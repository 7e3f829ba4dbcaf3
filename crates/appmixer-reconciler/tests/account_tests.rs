//! Integration tests for the account reconciler.

mod helpers;

use std::collections::BTreeMap;

use appmixer_reconciler::{
    token_fingerprint, AccountReadStrategy, AccountReconciler, AccountRecord, AccountSpec,
    ReconcileError, Reconciler,
};
use helpers::{account_json, plain_client, request_count};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn slack_spec(display_name: Option<&str>) -> AccountSpec {
    AccountSpec {
        service: "appmixer:slack".into(),
        token: BTreeMap::from([("apiKey".to_string(), json!("xoxb-secret"))]),
        display_name: display_name.map(str::to_string),
    }
}

fn slack_record() -> AccountRecord {
    AccountRecord {
        id: "a1".into(),
        service: "appmixer:slack".into(),
        display_name: "Support bot".into(),
        token_fingerprint: token_fingerprint(&slack_spec(None).token),
        ..AccountRecord::default()
    }
}

// ── Create ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_returns_configured_fields_without_read() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts"))
        .and(body_json(json!({
            "service": "appmixer:slack",
            "token": {"apiKey": "xoxb-secret"},
            "displayName": "Support bot"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"accountId": "a1", "tokenId": "t1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let record = AccountReconciler::default()
        .create(&plain_client(&server), &slack_spec(Some("Support bot")))
        .await
        .unwrap();

    assert_eq!(record.id, "a1");
    assert_eq!(record.display_name, "Support bot");
    assert!(record.name.is_empty());
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_create_non_string_token_issues_no_request() {
    let server = MockServer::start().await;

    let mut spec = slack_spec(None);
    spec.token.insert("port".into(), json!(8080));

    let err = AccountReconciler::default()
        .create(&plain_client(&server), &spec)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "value for key 'port' in 'token' map is not a string"
    );
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_create_invalid_credentials_classified() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "statusCode": 400,
            "message": "Credentials validation failed."
        })))
        .mount(&server)
        .await;

    let err = AccountReconciler::default()
        .create(&plain_client(&server), &slack_spec(None))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidCredentials { ref service, .. } if service == "appmixer:slack"));
}

#[tokio::test]
async fn test_create_missing_key_classified() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Token is missing a required key: subdomain"
        })))
        .mount(&server)
        .await;

    let err = AccountReconciler::default()
        .create(&plain_client(&server), &slack_spec(None))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::MissingCredentialKey { .. }));
}

#[tokio::test]
async fn test_create_empty_account_id_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tokenId": "t1"})))
        .mount(&server)
        .await;

    let err = AccountReconciler::default()
        .create(&plain_client(&server), &slack_spec(None))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::MissingId { .. }));
}

// ── Read ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_round_trip_never_exposes_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"accountId": "a1", "tokenId": "t1"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/accounts/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_json("a1", None)))
        .mount(&server)
        .await;

    let reconciler = AccountReconciler::default();
    let client = plain_client(&server);
    let created = reconciler.create(&client, &slack_spec(None)).await.unwrap();
    let read = reconciler.read(&client, &created).await.unwrap().unwrap();

    assert_eq!(read.display_name, "");
    assert_eq!(read.profile_info["teamId"], "42");
    assert_eq!(read.token_fingerprint, created.token_fingerprint);

    let serialized = serde_json::to_string(&read).unwrap();
    assert!(!serialized.contains("xoxb-secret"));
    assert!(!format!("{read:?}").contains("xoxb-secret"));
}

#[tokio::test]
async fn test_read_missing_is_gone() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/a1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})))
        .mount(&server)
        .await;

    let read = AccountReconciler::default()
        .read(&plain_client(&server), &slack_record())
        .await
        .unwrap();
    assert!(read.is_none());
}

#[tokio::test]
async fn test_read_list_and_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            account_json("a0", Some("Other")),
            account_json("a1", Some("Support bot"))
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let reconciler = AccountReconciler::new(AccountReadStrategy::ListAndFilter);
    let client = plain_client(&server);

    let read = reconciler.read(&client, &slack_record()).await.unwrap().unwrap();
    assert_eq!(read.id, "a1");
    assert_eq!(read.display_name, "Support bot");

    let missing = AccountRecord {
        id: "a9".into(),
        ..slack_record()
    };
    assert!(reconciler.read(&client, &missing).await.unwrap().is_none());
}

// ── Update ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_display_name() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/accounts/a1"))
        .and(body_json(json!({"displayName": "Renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/accounts/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_json("a1", Some("Renamed"))))
        .mount(&server)
        .await;

    let record = AccountReconciler::default()
        .update(&plain_client(&server), &slack_record(), &slack_spec(Some("Renamed")))
        .await
        .unwrap();
    assert_eq!(record.display_name, "Renamed");
}

#[tokio::test]
async fn test_update_without_change_only_reads() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/a1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(account_json("a1", Some("Support bot"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = AccountReconciler::default();
    let spec = slack_spec(Some("Support bot"));
    assert!(!reconciler.needs_update(&slack_record(), &spec));

    reconciler
        .update(&plain_client(&server), &slack_record(), &spec)
        .await
        .unwrap();
    assert_eq!(request_count(&server).await, 1);
}

// ── Delete ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_not_found_is_success() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/accounts/a1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Account not found"})))
        .expect(1)
        .mount(&server)
        .await;

    AccountReconciler::default()
        .delete(&plain_client(&server), &slack_record())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_other_errors_propagate() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/accounts/a1"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "Account in use"})))
        .mount(&server)
        .await;

    let err = AccountReconciler::default()
        .delete(&plain_client(&server), &slack_record())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to delete account 'a1': API request failed with status 409: Account in use"
    );
}

// ── Import ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_import_adopts_configured_token_on_update() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/a1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(account_json("a1", Some("Support bot"))),
        )
        .mount(&server)
        .await;

    let reconciler = AccountReconciler::default();
    let client = plain_client(&server);
    let imported = reconciler.import(&client, "a1").await.unwrap();
    assert!(imported.token_fingerprint.is_empty());

    let spec = slack_spec(Some("Support bot"));
    assert!(!reconciler.requires_replacement(&imported, &spec));
    assert!(reconciler.needs_update(&imported, &spec));

    let adopted = reconciler.update(&client, &imported, &spec).await.unwrap();
    assert_eq!(adopted.token_fingerprint, token_fingerprint(&spec.token));
    assert!(!reconciler.needs_update(&adopted, &spec));

    // Adoption is local: only reads reach the server.
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.method.as_str() == "GET"));
}

#[tokio::test]
async fn test_import_missing_account_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/zz"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = AccountReconciler::default()
        .import(&plain_client(&server), "zz")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Account with ID zz not found");
}
