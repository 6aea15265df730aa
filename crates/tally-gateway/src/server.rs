// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use tally_agent::Ingestor;
use tally_core::TallyError;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Processes validated webhook batches.
    pub ingestor: Arc<Ingestor>,
    /// Channel secret for webhook signature verification. `None` disables
    /// verification (the binary warns loudly when it does this).
    pub channel_secret: Option<String>,
}

/// Webhook server configuration (mirrors `ServerConfig` from tally-config,
/// kept local so this crate does not depend on the config crate).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the webhook router.
///
/// - `POST /webhook` (signed event batches)
/// - `GET /health` (unauthenticated liveness probe)
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/webhook", post(handlers::post_webhook))
        .route("/health", get(handlers::get_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve the webhook router until the
/// process stops.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), TallyError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TallyError::Channel {
            message: format!("failed to bind webhook server to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("webhook server listening on {addr}");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| TallyError::Channel {
            message: format!("webhook server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
