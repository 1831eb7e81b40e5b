//! Clerk Relay - verified webhook to notification relay.
//!
//! Receives Clerk webhooks, authenticates them against the Svix signing
//! secret and turns the events worth announcing into Novu workflow triggers.
//!
//! ## Architecture
//!
//! ```text
//! Clerk → Web Server → WebhookVerifier → VerifiedEvent → Dispatcher → Novu
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod notify;
pub mod webhook;

// Re-export commonly used types
pub use config::Config;
pub use dispatch::{Dispatcher, Outcome, SubscriberOptions};
pub use error::{ConfigError, EventError, TriggerError, VerifyError};
pub use event::VerifiedEvent;
pub use notify::{NotificationPayload, NotificationTrigger, NovuClient, Subscriber};
pub use webhook::{router, AppState, WebhookVerifier};
