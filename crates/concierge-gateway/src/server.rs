// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use concierge_agent::ChatService;
use concierge_config::model::ServerConfig;
use concierge_core::ConciergeError;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::Accounts;
use crate::{handlers, sse};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub chat: Arc<ChatService>,
    pub accounts: Arc<Accounts>,
    /// Process start, for uptime reporting.
    pub started: Instant,
}

impl GatewayState {
    pub fn new(chat: Arc<ChatService>, accounts: Arc<Accounts>) -> Self {
        Self {
            chat,
            accounts,
            started: Instant::now(),
        }
    }
}

/// Builds the application router.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/chat", post(handlers::post_chat))
        .route("/chat/stream", post(sse::post_chat_stream))
        .route("/chat/history", get(handlers::get_history))
        .route("/models/status", get(handlers::get_models_status))
        .route("/auth/register", post(handlers::post_register))
        .route("/auth/login", post(handlers::post_login))
        .route("/auth/verify", get(handlers::get_verify))
        .route("/analytics/user/{user_id}", get(handlers::get_user_analytics))
        .route("/analytics/report/{user_id}", get(handlers::get_user_report))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Binds `config.bind_address:config.port` and serves until `shutdown` resolves.
pub async fn serve(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ConciergeError> {
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ConciergeError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ConciergeError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}
