//! Notification trigger collaborator.
//!
//! The dispatcher only sees the [`NotificationTrigger`] trait; the Novu
//! client is constructed once at startup and injected.
//!
//! ## Flow
//!
//! ```text
//! Dispatcher → NotificationTrigger::trigger() → POST /v1/events/trigger
//! ```

pub mod novu;
pub mod types;

use async_trait::async_trait;

use crate::error::TriggerError;

pub use novu::NovuClient;
pub use types::{NotificationPayload, Subscriber};

/// Fires a notification workflow for one subscriber.
#[async_trait]
pub trait NotificationTrigger: Send + Sync {
    async fn trigger(
        &self,
        workflow_id: &str,
        subscriber: &Subscriber,
        payload: &NotificationPayload,
    ) -> Result<(), TriggerError>;
}
