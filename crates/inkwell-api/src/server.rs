// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use inkwell_core::database::Database;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::AuthLayer;
use crate::state::AppState;

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
pub struct ApiServer<D: Database> {
    state: AppState<D>,
    config: Arc<ApiConfig>,
}

impl<D: Database> ApiServer<D> {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState<D>) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Creates the router with all routes and middleware.
    ///
    /// Every route sits behind the [`AuthLayer`] except the configured
    /// public paths.
    pub fn router(&self) -> Router {
        let auth = AuthLayer::new(self.state.gate.clone())
            .with_public_paths(self.config.public_paths.clone());

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout,
            ))
            .layer(auth);

        let api = Router::new()
            .route("/login", post(handlers::login::<D>))
            .route("/logout", post(handlers::logout::<D>))
            .route("/logout/all", post(handlers::logout_all::<D>))
            .route("/profile", get(handlers::profile::<D>))
            .route("/health", get(handlers::health::<D>));

        Router::new()
            .nest(&self.config.base_path, api)
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server.
    pub async fn run(self) -> ApiResult<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind: {}", e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }
}

// =============================================================================
// Tests
// =============================================================================
