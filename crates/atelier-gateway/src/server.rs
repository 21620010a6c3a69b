// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;

use atelier_attendance::AttendanceService;
use atelier_auth::AuthService;
use atelier_config::GatewayConfig;
use atelier_conversations::ConversationService;
use atelier_core::{AtelierError, CompletionProvider, EventBus};

use crate::handlers;
use crate::sse;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub conversations: Arc<ConversationService>,
    pub attendance: Arc<AttendanceService>,
    pub auth: Arc<AuthService>,
    /// Used directly by the stateless relay endpoint.
    pub provider: Arc<dyn CompletionProvider>,
    /// Change feed source for the SSE endpoint.
    pub bus: EventBus,
    /// Process start time for uptime reporting.
    pub started_at: std::time::Instant,
}

/// Builds the gateway router with all routes and middleware.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/api/chat", post(handlers::post_chat))
        .route("/api/auth/register", post(handlers::post_register))
        .route("/api/auth/login", post(handlers::post_login))
        .route(
            "/api/conversations",
            post(handlers::post_conversation).get(handlers::get_conversations),
        )
        .route(
            "/api/conversations/{id}/messages",
            post(handlers::post_customer_message),
        )
        .route(
            "/api/conversations/{id}/category",
            post(handlers::post_category),
        )
        .route("/api/conversations/{id}", delete(handlers::delete_conversation))
        .route("/api/attendance/queue", get(handlers::get_queue))
        .route("/api/attendance/stats", get(handlers::get_stats))
        .route("/api/attendance/events", get(sse::events))
        .route("/api/attendance/{id}/claim", post(handlers::post_claim))
        .route("/api/attendance/{id}/transfer", post(handlers::post_transfer))
        .route("/api/attendance/{id}/close", post(handlers::post_close))
        .route(
            "/api/attendance/{id}/messages",
            post(handlers::post_agent_message),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds to the configured host:port and serves the gateway until the
/// process is stopped.
pub async fn start_server(config: &GatewayConfig, state: GatewayState) -> Result<(), AtelierError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| AtelierError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| AtelierError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
