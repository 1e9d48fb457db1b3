// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer authentication middleware.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use tracing::Instrument;

use crate::auth::AuthGate;
use crate::error::ApiError;

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer running the [`AuthGate`] in front of every route.
///
/// Requests to public paths always pass through, with an identity only when
/// they present a live credential. Any other request either carries an [`Identity`](crate::auth::Identity) into the
/// inner service or is answered here without reaching it.
#[derive(Clone)]
pub struct AuthLayer {
    gate: Arc<AuthGate>,
    public_paths: Arc<HashSet<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(gate: Arc<AuthGate>) -> Self {
        Self {
            gate,
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Adds public paths that don't require authentication.
    ///
    /// A path ending in `*` matches every path with that prefix.
    pub fn with_public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths = Arc::new(paths.into_iter().collect());
        self
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            gate: self.gate.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for bearer authentication.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    gate: Arc<AuthGate>,
    public_paths: Arc<HashSet<String>>,
}

impl<S> AuthMiddleware<S> {
    /// Checks if a path is public.
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }

        self.public_paths.iter().any(|public_path| {
            public_path
                .strip_suffix('*')
                .is_some_and(|prefix| path.starts_with(prefix))
        })
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let gate = self.gate.clone();
        let is_public = self.is_public_path(req.uri().path());

        // The clone is not driven to readiness; swap so the ready one is used.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let header = req.headers().get(header::AUTHORIZATION);

            if is_public {
                // Public routes never reject, but a valid credential still
                // yields an identity for `OptionalAuth`.
                if header.is_some() {
                    if let Ok(identity) = gate.authenticate(header).await {
                        req.extensions_mut().insert(identity);
                    }
                }
                return inner.call(req).await;
            }

            let identity = match gate.authenticate(header).await {
                Ok(identity) => identity,
                Err(e) => {
                    tracing::debug!(kind = %e.kind(), path = %req.uri().path(), "Request rejected");
                    return Ok(ApiError::from(e).into_response());
                }
            };

            let span = tracing::info_span!(
                "authenticated",
                request_id = %identity.request_id,
                user_id = %identity.subject,
            );
            req.extensions_mut().insert(identity);

            inner.call(req).instrument(span).await
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
