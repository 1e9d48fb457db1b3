// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # API Integration Tests
//!
//! Integration tests for the HTTP surface, driven through the full router:
//!
//! - The authentication gate on protected routes
//! - Login, logout and logout of every session
//! - Fail-closed behavior while the session store is down
//! - Error response formatting
//!
//! ## Test Categories
//!
//! - `test_gate_*`: Authentication gate tests
//! - `test_login_*`: Login tests
//! - `test_logout_*`: Revocation tests
//! - `test_outage_*`: Store outage tests
//! - `test_health_*`: Health endpoint tests

use std::time::Duration;

use axum::http::{header, Method};
use serde_json::json;

use inkwell_tests::common::init_test_logging;
use inkwell_tests::prelude::*;

// =============================================================================
// Test Helpers
// =============================================================================

fn assert_unauthorized(response: &TestResponse) {
    assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{:?}", response.body);
    assert_eq!(response.error_code(), Some("UNAUTHORIZED"));
    assert_eq!(
        response.headers.get(header::WWW_AUTHENTICATE).map(|v| v.as_bytes()),
        Some(b"Bearer".as_slice())
    );
}

// =============================================================================
// Gate Tests
// =============================================================================

#[tokio::test]
async fn test_gate_missing_header() {
    init_test_logging();
    let app = TestApp::new();

    let response = app.get("/api/v1/profile", None).await;
    assert_unauthorized(&response);
    assert_eq!(
        response.body["error"]["message"].as_str(),
        Some("Authentication required")
    );
}

#[tokio::test]
async fn test_gate_malformed_headers() {
    let app = TestApp::new();
    let token = app.login("alice", PASSWORD).await;

    let malformed = [
        token.clone(),
        format!("bearer {}", token),
        format!("Basic {}", token),
        format!("Bearer  {}", token),
        format!("Bearer {} extra", token),
        "Bearer".to_string(),
        "Bearer ".to_string(),
    ];
    for value in &malformed {
        let response = app
            .request(Method::GET, "/api/v1/profile", Some(value), None)
            .await;
        assert_unauthorized(&response);
    }
}

#[tokio::test]
async fn test_gate_invalid_credentials() {
    let app = TestApp::new();
    let codec = app.state.codec.clone();

    let foreign = other_codec().issue(ALICE).unwrap();
    let expired = expired_credential(&codec, ALICE, 60);
    let early = future_credential(&codec, ALICE, 600);

    // Registered sessions do not rescue a credential the codec rejects.
    for credential in [&foreign, &expired, &early] {
        app.state
            .sessions
            .register(credential, ALICE, Duration::from_secs(600))
            .await
            .unwrap();
    }

    for token in ["garbage", foreign.as_str(), expired.as_str(), early.as_str()] {
        let response = app.get("/api/v1/profile", Some(token)).await;
        assert_unauthorized(&response);
    }
}

#[tokio::test]
async fn test_gate_valid_but_unregistered() {
    let app = TestApp::new();
    let credential = app.state.codec.issue(ALICE).unwrap();

    let response = app.get("/api/v1/profile", Some(credential.as_str())).await;
    assert_unauthorized(&response);
}

#[tokio::test]
async fn test_gate_record_of_another_subject() {
    let app = TestApp::new();
    let credential = app.state.codec.issue(ALICE).unwrap();
    app.state
        .sessions
        .register(&credential, BOB, Duration::from_secs(600))
        .await
        .unwrap();

    let response = app.get("/api/v1/profile", Some(credential.as_str())).await;
    assert_unauthorized(&response);
}

#[tokio::test]
async fn test_gate_authorizes_live_session() {
    let app = TestApp::new();
    let token = app.login("alice", PASSWORD).await;

    let response = app.get("/api/v1/profile", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user_id"], json!(42));
    assert_eq!(response.body["active_sessions"], json!(1));
}

#[tokio::test]
async fn test_gate_secret_rotation_rejects_old_tokens() {
    let app = TestApp::new();
    let token = app.login("alice", PASSWORD).await;

    let rotated = TestApp::with_codec(other_codec());
    let credential = inkwell_core::types::Credential::new(token.clone());
    rotated
        .state
        .sessions
        .register(&credential, ALICE, Duration::from_secs(600))
        .await
        .unwrap();

    let response = rotated.get("/api/v1/profile", Some(&token)).await;
    assert_unauthorized(&response);
}

// =============================================================================
// Login Tests
// =============================================================================

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();

    let response = app.try_login("alice", PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["token_type"], json!("Bearer"));
    assert_eq!(response.body["expires_in"], json!(3600));
    assert_eq!(response.body["user_id"], json!(42));

    let token = response.body["token"].as_str().unwrap();
    let claims = app
        .state
        .codec
        .verify(&inkwell_core::types::Credential::new(token))
        .unwrap();
    assert_eq!(claims.subject, ALICE);

    // The lookup's write committed along with the session.
    assert_eq!(app.database.get(&last_login_key("alice")), Some(json!(42)));
    assert_eq!(app.database.open_transactions(), 0);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new();

    let response = app.try_login("alice", "not-the-password").await;
    assert_unauthorized(&response);
    assert!(app.store.is_empty());
    assert_eq!(app.database.get(&last_login_key("alice")), None);
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = TestApp::new();

    let response = app.try_login("mallory", PASSWORD).await;
    assert_unauthorized(&response);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_login_requires_fields() {
    let app = TestApp::new();

    let response = app.try_login("", PASSWORD).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("BAD_REQUEST"));

    let response = app
        .request(
            Method::POST,
            "/api/v1/login",
            None,
            Some(json!({ "username": "alice" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_is_public() {
    let app = TestApp::new();

    // A bad header on a public route is ignored.
    let response = app
        .request(
            Method::POST,
            "/api/v1/login",
            Some("Bearer garbage"),
            Some(json!({ "username": "alice", "password": PASSWORD })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

// =============================================================================
// Logout Tests
// =============================================================================

#[tokio::test]
async fn test_logout_revokes_current_session() {
    let app = TestApp::new();
    let token = app.login("alice", PASSWORD).await;

    let response = app.post("/api/v1/logout", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["revoked"], json!(1));

    // The signature is still valid; the session is gone.
    assert!(app
        .state
        .codec
        .verify(&inkwell_core::types::Credential::new(token.clone()))
        .is_ok());
    assert_unauthorized(&app.get("/api/v1/profile", Some(&token)).await);
    assert_unauthorized(&app.post("/api/v1/logout", Some(&token)).await);
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    init_test_logging();
    let app = TestApp::new();
    let token = app.login("alice", PASSWORD).await;
    let bob = app.login("bob", PASSWORD).await;

    let extra = distinct_credentials(&app.state.codec, ALICE, 3);
    for credential in &extra {
        app.state
            .sessions
            .register(credential, ALICE, Duration::from_secs(600))
            .await
            .unwrap();
    }
    let profile = app.get("/api/v1/profile", Some(&token)).await;
    let sessions = profile.body["active_sessions"].as_u64().unwrap();
    assert!(sessions >= 3);

    let response = app.post("/api/v1/logout/all", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["revoked"].as_u64(), Some(sessions));

    assert_unauthorized(&app.get("/api/v1/profile", Some(&token)).await);
    for credential in &extra {
        assert_unauthorized(&app.get("/api/v1/profile", Some(credential.as_str())).await);
    }

    let response = app.get("/api/v1/profile", Some(&bob)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user_id"], json!(7));
}

#[tokio::test]
async fn test_logout_requires_credential() {
    let app = TestApp::new();
    assert_unauthorized(&app.post("/api/v1/logout", None).await);
    assert_unauthorized(&app.post("/api/v1/logout/all", None).await);
}

// =============================================================================
// Outage Tests
// =============================================================================

#[tokio::test]
async fn test_outage_protected_route_fails_closed() {
    let app = TestApp::new();
    let token = app.login("alice", PASSWORD).await;

    app.store.set_available(false);
    let response = app.get("/api/v1/profile", Some(&token)).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.error_code(), Some("SERVICE_UNAVAILABLE"));
    assert_eq!(
        response.body["error"]["message"].as_str(),
        Some("Service temporarily unavailable")
    );

    app.store.set_available(true);
    let response = app.get("/api/v1/profile", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_outage_login_rolls_back() {
    let app = TestApp::new();
    app.store.set_available(false);

    let response = app.try_login("alice", PASSWORD).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(app.database.get(&last_login_key("alice")), None);
    assert_eq!(app.database.open_transactions(), 0);
}

#[tokio::test]
async fn test_outage_database_down_at_login() {
    let app = TestApp::new();
    app.database.set_available(false);

    let response = app.try_login("alice", PASSWORD).await;
    assert!(response.status.is_server_error());
    assert!(app.store.is_empty());
}

// =============================================================================
// Health Tests
// =============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();

    let response = app.get("/api/v1/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], json!("healthy"));
    assert_eq!(
        response.body["components"][0]["name"],
        json!("session_store:memory")
    );
}

#[tokio::test]
async fn test_health_reports_caller_with_live_session() {
    let app = TestApp::new();
    let token = app.login("alice", PASSWORD).await;

    let response = app.get("/api/v1/health", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user_id"], json!(42));

    let anonymous = app.get("/api/v1/health", None).await;
    assert!(anonymous.body.get("user_id").is_none());
}

#[tokio::test]
async fn test_health_ignores_revoked_credential() {
    let app = TestApp::new();
    let token = app.login("alice", PASSWORD).await;
    assert_eq!(app.post("/api/v1/logout", Some(&token)).await.status, StatusCode::OK);

    let response = app.get("/api/v1/health", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.get("user_id").is_none());
}

#[tokio::test]
async fn test_health_reports_store_outage() {
    let app = TestApp::new();
    app.store.set_available(false);

    let response = app.get("/api/v1/health", None).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["status"], json!("unhealthy"));
    assert_eq!(response.body["components"][0]["healthy"], json!(false));
}
