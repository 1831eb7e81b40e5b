//! Event dispatch: map a verified event to one notification trigger.
//!
//! ## Processing Flow
//!
//! ```text
//! VerifiedEvent → plan() → Notification → NotificationTrigger::trigger()
//! ```
//!
//! Trigger failures are logged and reported in the [`Outcome`], never
//! propagated: the webhook source always sees success once verification
//! has passed.

pub mod email;
pub mod user;

use std::sync::Arc;

use tracing::{error, info};

use crate::config::Config;
use crate::event::VerifiedEvent;
use crate::notify::{NotificationPayload, NotificationTrigger, Subscriber};

pub use email::{workflow_id_for_slug, EMAIL_TEMPLATES};
pub use user::USER_CREATED_WORKFLOW;

/// Settings used when deriving subscribers.
#[derive(Debug, Clone)]
pub struct SubscriberOptions {
    /// Prefix for subscriber identifiers built from email addresses
    pub id_prefix: String,
    /// Locale assigned to every subscriber
    pub locale: String,
}

impl SubscriberOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            id_prefix: config.subscriber_prefix.clone(),
            locale: config.default_locale.clone(),
        }
    }

    fn subscriber_id(&self, email: &str) -> String {
        format!("{}{}", self.id_prefix, email)
    }
}

impl Default for SubscriberOptions {
    fn default() -> Self {
        Self {
            id_prefix: "clerk_".to_string(),
            locale: "en_US".to_string(),
        }
    }
}

/// Everything one trigger call needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub workflow_id: String,
    pub subscriber: Subscriber,
    pub payload: NotificationPayload,
}

/// Why an event produced no trigger call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Kind is not handled at all.
    UnhandledKind(String),
    /// Kind is recognized but only logged.
    LogOnly(&'static str),
    /// No recipient address to derive a subscriber from.
    MissingRecipient,
    MissingSlug,
    UnknownSlug(String),
    /// Recognized slug without template data.
    EmptyTemplateData(String),
}

/// Terminal state of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ignored(IgnoreReason),
    Triggered { workflow_id: String },
    TriggerFailed { workflow_id: String },
}

/// Classify and map an event without side effects.
pub fn plan(event: &VerifiedEvent, options: &SubscriberOptions) -> Result<Notification, IgnoreReason> {
    match event {
        VerifiedEvent::UserCreated(user) => user::plan_user_created(user, options),
        VerifiedEvent::EmailCreated(email) => email::plan_email_created(email, options),
        VerifiedEvent::UserUpdated(_) => Err(IgnoreReason::LogOnly(crate::event::USER_UPDATED)),
        VerifiedEvent::UserDeleted(_) => Err(IgnoreReason::LogOnly(crate::event::USER_DELETED)),
        VerifiedEvent::Other { kind } => Err(IgnoreReason::UnhandledKind(kind.clone())),
    }
}

/// Dispatches verified events to the injected trigger.
pub struct Dispatcher {
    trigger: Arc<dyn NotificationTrigger>,
    options: SubscriberOptions,
}

impl Dispatcher {
    pub fn new(trigger: Arc<dyn NotificationTrigger>, options: SubscriberOptions) -> Self {
        Self { trigger, options }
    }

    /// Issue at most one trigger call for the event.
    pub async fn dispatch(&self, event: &VerifiedEvent) -> Outcome {
        info!(event_type = %event.kind(), "dispatch_start");

        if let VerifiedEvent::UserUpdated(user) | VerifiedEvent::UserDeleted(user) = event {
            info!(event_type = %event.kind(), user_id = ?user.id, "user_event_logged");
        }

        let notification = match plan(event, &self.options) {
            Ok(n) => n,
            Err(reason) => {
                info!(event_type = %event.kind(), reason = ?reason, "dispatch_ignored");
                return Outcome::Ignored(reason);
            }
        };

        let Notification {
            workflow_id,
            subscriber,
            payload,
        } = notification;

        info!(
            workflow_id = %workflow_id,
            subscriber_id = %subscriber.subscriber_id,
            payload_fields = payload.len(),
            "dispatch_triggering"
        );

        match self.trigger.trigger(&workflow_id, &subscriber, &payload).await {
            Ok(()) => {
                info!(workflow_id = %workflow_id, "dispatch_triggered");
                Outcome::Triggered { workflow_id }
            }
            Err(e) => {
                error!(workflow_id = %workflow_id, error = %e, "dispatch_trigger_failed");
                Outcome::TriggerFailed { workflow_id }
            }
        }
    }
}
