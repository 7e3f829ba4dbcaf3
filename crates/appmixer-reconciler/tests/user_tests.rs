//! Integration tests for the user reconciler.

mod helpers;

use std::time::Duration;

use appmixer_reconciler::{
    DeletionPoller, ReconcileError, Reconciler, UserReconciler, UserRecord, UserSpec,
};
use helpers::{admin_client, plain_client, request_count, CALLER_ID};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_reconciler() -> UserReconciler {
    UserReconciler::new(DeletionPoller::new(5, Duration::ZERO))
}

fn alice_spec() -> UserSpec {
    UserSpec {
        username: "alice".into(),
        email: "a@x.com".into(),
        password: "secret".into(),
        scope: None,
        vendor: None,
    }
}

fn alice_record() -> UserRecord {
    UserRecord {
        id: "u1".into(),
        username: "alice".into(),
        email: "a@x.com".into(),
        password: "secret".into(),
        scope: vec!["user".into()],
        ..UserRecord::default()
    }
}

async fn mount_user(server: &MockServer, id: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/users/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Create ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user"))
        .and(body_json(json!({"email": "a@x.com", "username": "alice", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("pattern", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "u0", "username": "alice.smith"},
            {"id": "u1", "username": "alice"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    mount_user(
        &server,
        "u1",
        json!({
            "id": "u1",
            "username": "alice",
            "email": "a@x.com",
            "isActive": false,
            "scope": ["user"],
            "created": "2024-05-01T10:00:00.000Z"
        }),
    )
    .await;

    let record = fast_reconciler()
        .create(&plain_client(&server), &alice_spec())
        .await
        .unwrap();

    assert_eq!(record.id, "u1");
    assert_eq!(record.scope, vec!["user".to_string()]);
    assert!(record.vendor.is_empty());
    assert_eq!(record.password, "secret");
    // POST, lookup, read; no permissions PUT.
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_create_with_permissions_sends_one_put() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": "u1", "username": "alice"}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/users/u1"))
        .and(body_json(json!({"scope": ["user", "admin"], "vendor": ["acme"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    mount_user(
        &server,
        "u1",
        json!({"id": "u1", "username": "alice", "scope": ["user", "admin"], "vendor": ["acme"]}),
    )
    .await;

    let spec = UserSpec {
        scope: Some(vec!["user".into(), "admin".into()]),
        vendor: Some(vec!["acme".into()]),
        ..alice_spec()
    };
    let record = fast_reconciler()
        .create(&admin_client(&server), &spec)
        .await
        .unwrap();
    assert_eq!(record.vendor, vec!["acme".to_string()]);
}

#[tokio::test]
async fn test_create_with_empty_scope_converges() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": "u1", "username": "alice"}])),
        )
        .mount(&server)
        .await;
    mount_user(
        &server,
        "u1",
        json!({"id": "u1", "username": "alice", "scope": ["user"]}),
    )
    .await;

    let spec = UserSpec {
        scope: Some(vec![]),
        ..alice_spec()
    };
    let reconciler = fast_reconciler();
    let record = reconciler
        .create(&plain_client(&server), &spec)
        .await
        .unwrap();

    assert_eq!(record.scope, vec!["user".to_string()]);
    // POST, lookup, read; an empty list sends no PUT.
    assert_eq!(request_count(&server).await, 3);
    assert!(reconciler.changed_fields(&record, &spec).is_empty());
    assert!(!reconciler.needs_update(&record, &spec));
}

#[tokio::test]
async fn test_create_short_password_issues_no_request() {
    let server = MockServer::start().await;

    let spec = UserSpec {
        password: "abcd".into(),
        ..alice_spec()
    };
    let err = fast_reconciler()
        .create(&admin_client(&server), &spec)
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::Validation(_)));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_create_scope_without_admin_issues_no_request() {
    let server = MockServer::start().await;

    let spec = UserSpec {
        scope: Some(vec!["admin".into()]),
        ..alice_spec()
    };
    let err = fast_reconciler()
        .create(&plain_client(&server), &spec)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Setting scope or vendor requires admin permissions"
    );
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_create_identity_recovery_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "u9", "username": "alice-other"}])),
        )
        .mount(&server)
        .await;

    let err = fast_reconciler()
        .create(&plain_client(&server), &alice_spec())
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::IdentityRecovery { ref username } if username == "alice"));
}

// ── Read ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_read_gone_by_body_status_code() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "statusCode": 404,
            "message": "User not found"
        })))
        .mount(&server)
        .await;

    let read = fast_reconciler()
        .read(&admin_client(&server), &alice_record())
        .await
        .unwrap();
    assert!(read.is_none());
}

#[tokio::test]
async fn test_read_tolerates_null_fields() {
    let server = MockServer::start().await;

    mount_user(
        &server,
        "u1",
        json!({
            "id": "u1",
            "username": "alice",
            "scope": null,
            "vendor": null,
            "created": null
        }),
    )
    .await;

    let read = fast_reconciler()
        .read(&admin_client(&server), &alice_record())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(read.username, "alice");
    assert!(read.scope.is_empty());
    assert!(read.vendor.is_empty());
    assert_eq!(read.password, "secret");
}

#[tokio::test]
async fn test_read_other_errors_propagate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "db down"})))
        .mount(&server)
        .await;

    let err = fast_reconciler()
        .read(&admin_client(&server), &alice_record())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to read user 'u1': API request failed with status 500: db down"
    );
}

#[tokio::test]
async fn test_read_normalizes_plan_and_keeps_password() {
    let server = MockServer::start().await;
    mount_user(
        &server,
        "u1",
        json!({"id": "u1", "username": "alice", "plan": "free", "scope": ["user"]}),
    )
    .await;

    let record = fast_reconciler()
        .read(&admin_client(&server), &alice_record())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.plan["name"], "free");
    assert_eq!(record.password, "secret");
}

// ── Update ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_self_permissions_rejected_even_for_admin() {
    let server = MockServer::start().await;

    let record = UserRecord {
        id: CALLER_ID.into(),
        ..alice_record()
    };
    let spec = UserSpec {
        scope: Some(vec!["user".into(), "admin".into()]),
        ..alice_spec()
    };
    let err = fast_reconciler()
        .update(&admin_client(&server), &record, &spec)
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::SelfModification(_)));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_update_self_password_rejected() {
    let server = MockServer::start().await;

    let record = UserRecord {
        id: CALLER_ID.into(),
        ..alice_record()
    };
    let spec = UserSpec {
        password: "new-secret".into(),
        ..alice_spec()
    };
    let err = fast_reconciler()
        .update(&plain_client(&server), &record, &spec)
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("Cannot update your own password"));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_update_other_user_requires_admin() {
    let server = MockServer::start().await;

    let spec = UserSpec {
        vendor: Some(vec!["acme".into()]),
        ..alice_spec()
    };
    let err = fast_reconciler()
        .update(&plain_client(&server), &alice_record(), &spec)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Modifying other users (scope, vendor, or password) requires admin permissions"
    );
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_update_short_password_rejected_before_permissions_put() {
    let server = MockServer::start().await;

    let spec = UserSpec {
        scope: Some(vec!["user".into(), "admin".into()]),
        password: "abc".into(),
        ..alice_spec()
    };
    let err = fast_reconciler()
        .update(&admin_client(&server), &alice_record(), &spec)
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::Validation(_)));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_update_scope_and_password() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/users/u1"))
        .and(body_json(json!({"scope": ["user", "admin"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/user/reset-password"))
        .and(body_json(json!({"email": "a@x.com", "password": "rotated-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    mount_user(
        &server,
        "u1",
        json!({"id": "u1", "username": "alice", "email": "a@x.com", "scope": ["user", "admin"]}),
    )
    .await;

    let spec = UserSpec {
        scope: Some(vec!["user".into(), "admin".into()]),
        password: "rotated-1".into(),
        ..alice_spec()
    };
    let record = fast_reconciler()
        .update(&admin_client(&server), &alice_record(), &spec)
        .await
        .unwrap();

    assert_eq!(record.scope, vec!["user".to_string(), "admin".to_string()]);
    assert_eq!(record.password, "rotated-1");
}

#[tokio::test]
async fn test_update_failed_reset_keeps_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/user/reset-password"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Forbidden"})))
        .mount(&server)
        .await;

    let spec = UserSpec {
        password: "rotated-1".into(),
        ..alice_spec()
    };
    let err = fast_reconciler()
        .update(&admin_client(&server), &alice_record(), &spec)
        .await
        .unwrap_err();
    assert_eq!(err.client_error().and_then(|e| e.status()), Some(403));
}

// ── Delete ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_polls_until_completed() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ticket": "tk-1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u1/delete-status/tk-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "pending", "stepsDone": 1, "stepsTotal": 3})),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u1/delete-status/tk-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "completed", "stepsDone": 3, "stepsTotal": 3})),
        )
        .mount(&server)
        .await;

    fast_reconciler()
        .delete(&admin_client(&server), &alice_record())
        .await
        .unwrap();

    // DELETE + three status checks.
    assert_eq!(request_count(&server).await, 4);
}

#[tokio::test]
async fn test_delete_failed_status() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ticket": "tk-1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u1/delete-status/tk-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "failed"})))
        .mount(&server)
        .await;

    let err = fast_reconciler()
        .delete(&admin_client(&server), &alice_record())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "User deletion failed with status: failed");
}

#[tokio::test]
async fn test_delete_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ticket": "tk-1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u1/delete-status/tk-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
        .expect(5)
        .mount(&server)
        .await;

    let err = fast_reconciler()
        .delete(&admin_client(&server), &alice_record())
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::DeletionTimedOut { attempts: 5, .. }));
}

#[tokio::test]
async fn test_delete_self_rejected() {
    let server = MockServer::start().await;

    let record = UserRecord {
        id: CALLER_ID.into(),
        ..alice_record()
    };
    let err = fast_reconciler()
        .delete(&admin_client(&server), &record)
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::SelfModification(_)));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_delete_requires_admin() {
    let server = MockServer::start().await;

    let err = fast_reconciler()
        .delete(&plain_client(&server), &alice_record())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Deleting users requires admin permissions");
    assert_eq!(request_count(&server).await, 0);
}

// ── Import ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_import_missing_user_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})))
        .mount(&server)
        .await;

    let err = fast_reconciler()
        .import(&admin_client(&server), "nope")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "User with ID nope not found");
}
