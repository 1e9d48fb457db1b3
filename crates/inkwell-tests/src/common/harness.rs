// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Full-router harness over memory backends.
//!
//! Requests are driven through `tower::ServiceExt::oneshot`; no socket is
//! bound.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use inkwell_api::{ApiConfig, ApiServer, AppState};
use inkwell_core::memory::{MemoryDatabase, MemoryStore};
use inkwell_core::token::TokenCodec;

use super::fixtures::{test_codec, ALICE, BOB};
use super::mocks::FixtureAccounts;

/// Password of every fixture account.
pub const PASSWORD: &str = "wonderland";

/// A response captured by the harness.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Parsed JSON body, or `Value::Null` for an empty or non-JSON body.
    pub body: Value,
}

impl TestResponse {
    /// Returns the `error.code` field of an error body.
    pub fn error_code(&self) -> Option<&str> {
        self.body["error"]["code"].as_str()
    }
}

/// The application wired to in-memory backends.
///
/// Accounts `alice` (subject 42) and `bob` (subject 7) exist with password
/// [`PASSWORD`].
pub struct TestApp {
    /// The full router, middleware included.
    pub router: Router,
    /// Session store backing the directory.
    pub store: Arc<MemoryStore>,
    /// Database behind the unit of work.
    pub database: Arc<MemoryDatabase>,
    /// Shared state, for direct access to the codec and directory.
    pub state: AppState<MemoryDatabase>,
}

impl TestApp {
    /// Builds the app with the default configuration.
    pub fn new() -> Self {
        Self::with_codec(test_codec())
    }

    /// Builds the app around the given codec.
    pub fn with_codec(codec: Arc<TokenCodec>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let database = Arc::new(MemoryDatabase::new());
        FixtureAccounts::add(&database, "alice", PASSWORD, ALICE);
        FixtureAccounts::add(&database, "bob", PASSWORD, BOB);

        let state = AppState::builder()
            .config(ApiConfig::default())
            .codec(codec)
            .store(store.clone())
            .database(database.clone())
            .accounts(Arc::new(FixtureAccounts))
            .build()
            .expect("test app state");
        let router = ApiServer::new(state.clone()).router();

        Self {
            router,
            store,
            database,
            state,
        }
    }

    /// Sends a request with an optional raw `Authorization` value.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sends a GET request with a bearer token.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let authorization = token.map(|t| format!("Bearer {}", t));
        self.request(Method::GET, uri, authorization.as_deref(), None)
            .await
    }

    /// Sends a POST request with a bearer token and no body.
    pub async fn post(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let authorization = token.map(|t| format!("Bearer {}", t));
        self.request(Method::POST, uri, authorization.as_deref(), None)
            .await
    }

    /// Posts a login request.
    pub async fn try_login(&self, username: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/api/v1/login",
            None,
            Some(serde_json::json!({ "username": username, "password": password })),
        )
        .await
    }

    /// Logs in and returns the issued token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self.try_login(username, password).await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {:?}", response.body);
        response.body["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
