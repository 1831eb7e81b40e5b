//! Web server module for handling inbound webhooks.
//!
//! This module provides the HTTP surface of the relay:
//! - Receives Clerk webhooks
//! - Verifies the Svix signature over the raw body
//! - Hands the decoded event to the dispatcher
//! - Answers 200 once verified, 400 otherwise

pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{clerk_webhook, health, AppState, HealthResponse, WebhookResponse};
pub use signature::{SignatureHeaders, WebhookVerifier};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhooks/clerk", post(clerk_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
