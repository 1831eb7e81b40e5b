//! Error types for the relay.
//!
//! Each failure class gets its own enum so callers can tell a fatal
//! configuration problem apart from a rejected request or a downstream outage.

use thiserror::Error;

/// Fatal configuration errors. The server refuses to start on any of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("webhook signing secret is not valid base64")]
    InvalidSecret,
}

/// Reasons an inbound webhook failed authentication.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("missing signature headers")]
    MissingHeaders,

    #[error("timestamp header is not a unix timestamp")]
    InvalidTimestamp,

    #[error("timestamp is older than the allowed tolerance")]
    TimestampTooOld,

    #[error("timestamp is too far in the future")]
    TimestampTooNew,

    #[error("signature header is malformed")]
    InvalidSignatureHeader,

    #[error("no matching signature found")]
    NoMatchingSignature,
}

/// A verified body that is not a usable event envelope.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("invalid event json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("event {kind} has unexpected data shape: {source}")]
    Data {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures reported by the notification trigger collaborator.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("trigger request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("trigger rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}
