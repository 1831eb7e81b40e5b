//! Webhook endpoint handlers.
//!
//! The Clerk handler works in a fixed order:
//! 1. Check the signature headers are present
//! 2. Verify the signature over the raw body bytes
//! 3. Decode the verified body into a typed event
//! 4. Dispatch it and return 200, whatever the downstream outcome

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::dispatch::Dispatcher;
use crate::event::VerifiedEvent;
use crate::webhook::signature::{SignatureHeaders, WebhookVerifier};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<WebhookVerifier>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(verifier: WebhookVerifier, dispatcher: Dispatcher) -> Self {
        Self {
            verifier: Arc::new(verifier),
            dispatcher: Arc::new(dispatcher),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Clerk Webhook
// =============================================================================

/// Webhook response.
#[derive(Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl WebhookResponse {
    fn accepted() -> (StatusCode, Json<Self>) {
        (
            StatusCode::OK,
            Json(Self {
                status: "accepted",
                message: None,
            }),
        )
    }

    fn rejected(message: &'static str) -> (StatusCode, Json<Self>) {
        (
            StatusCode::BAD_REQUEST,
            Json(Self {
                status: "error",
                message: Some(message),
            }),
        )
    }
}

/// Clerk webhook endpoint.
///
/// The body is taken as raw bytes so verification sees exactly what was
/// signed. Nothing in it is parsed until the signature checks out.
pub async fn clerk_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature_headers = match SignatureHeaders::from_header_map(&headers) {
        Ok(h) => h,
        Err(_) => return WebhookResponse::rejected("missing signature headers"),
    };

    info!(
        svix_id = %signature_headers.id,
        body_length = body.len(),
        "clerk_webhook_received"
    );

    if let Err(e) = state.verifier.verify(&signature_headers, &body) {
        warn!(svix_id = %signature_headers.id, reason = %e, "clerk_webhook_verification_failed");
        return WebhookResponse::rejected("verification failed");
    }

    let event = match VerifiedEvent::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(svix_id = %signature_headers.id, error = %e, "clerk_webhook_malformed_body");
            return WebhookResponse::rejected("malformed body");
        }
    };

    let outcome = state.dispatcher.dispatch(&event).await;

    info!(
        svix_id = %signature_headers.id,
        event_type = %event.kind(),
        outcome = ?outcome,
        "clerk_webhook_handled"
    );

    WebhookResponse::accepted()
}
