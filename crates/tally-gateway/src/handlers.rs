// SPDX-FileCopyrightText: 2026 Tallybot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the webhook server.
//!
//! The webhook handler takes the raw body as `Bytes` because the delivery
//! signature is computed over the exact bytes on the wire; parsing happens
//! only after verification succeeds.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error, warn};

use tally_line::events::WebhookPayload;
use tally_line::signature::verify_signature;

use crate::server::GatewayState;

/// Header carrying the delivery signature.
const SIGNATURE_HEADER: &str = "x-line-signature";

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
}

/// POST /webhook
///
/// Verifies the signature, parses the batch, and attempts every event.
/// Returns 200 once all events have been attempted, even when individual
/// events failed internally; 401 on a bad signature; 500 only when the
/// batch itself cannot be parsed.
pub async fn post_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(secret) = &state.channel_secret {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !verify_signature(secret, &body, signature) {
            warn!("webhook delivery rejected: signature mismatch");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            error!(error = %e, "structurally malformed webhook batch");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let recorded = state.ingestor.process_batch(&payload.events).await;
    debug!(
        events = payload.events.len(),
        recorded, "webhook batch processed"
    );

    StatusCode::OK.into_response()
}

/// GET /health
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
