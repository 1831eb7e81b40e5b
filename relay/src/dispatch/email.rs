//! `email.created` mapping.
//!
//! Each supported Clerk email template has one entry in [`EMAIL_TEMPLATES`]
//! naming the payload builder for its slug. The workflow id is the slug with
//! underscores replaced by hyphens.

use serde_json::{Map, Value};

use super::{IgnoreReason, Notification, SubscriberOptions};
use crate::event::EmailData;
use crate::notify::{NotificationPayload, Subscriber};

pub type PayloadBuilder = fn(&EmailData, &mut NotificationPayload);

/// Slug → payload builder for every forwarded email template.
pub const EMAIL_TEMPLATES: &[(&str, PayloadBuilder)] = &[
    ("verification_code", otp_code),
    ("reset_password_code", otp_code),
    ("magic_link_sign_in", magic_link),
    ("organization_invitation", organization_invitation),
    ("invitation", invitation),
    ("password_changed", password_changed),
];

pub fn workflow_id_for_slug(slug: &str) -> String {
    slug.replace('_', "-")
}

fn builder_for(slug: &str) -> Option<PayloadBuilder> {
    EMAIL_TEMPLATES
        .iter()
        .find(|(known, _)| *known == slug)
        .map(|(_, builder)| *builder)
}

pub fn plan_email_created(
    email: &EmailData,
    options: &SubscriberOptions,
) -> Result<Notification, IgnoreReason> {
    let slug = email
        .slug
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(IgnoreReason::MissingSlug)?;

    let builder = builder_for(slug).ok_or_else(|| IgnoreReason::UnknownSlug(slug.to_string()))?;

    if email.data.is_empty() {
        return Err(IgnoreReason::EmptyTemplateData(slug.to_string()));
    }

    let to = email
        .to_email_address
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(IgnoreReason::MissingRecipient)?;

    let mut subscriber = Subscriber::new(options.subscriber_id(to), options.locale.as_str());
    subscriber.email = to.to_string();

    let mut payload = NotificationPayload::new();
    payload.insert("subject", email.subject.clone().unwrap_or_default());
    builder(email, &mut payload);

    Ok(Notification {
        workflow_id: workflow_id_for_slug(slug),
        subscriber,
        payload,
    })
}

fn otp_code(email: &EmailData, payload: &mut NotificationPayload) {
    payload.insert("otp_code", text(&email.data, "otp_code"));
}

fn magic_link(email: &EmailData, payload: &mut NotificationPayload) {
    payload.insert("magic_link", text(&email.data, "magic_link"));
    payload.insert("ttl_minutes", text(&email.data, "ttl_minutes"));
}

fn organization_invitation(email: &EmailData, payload: &mut NotificationPayload) {
    let org_name = email
        .data
        .get("org")
        .and_then(Value::as_object)
        .map(|org| text(org, "name"))
        .unwrap_or_default();

    payload.insert("inviter_name", text(&email.data, "inviter_name"));
    payload.insert("org_name", org_name);
    payload.insert("action_url", text(&email.data, "action_url"));
}

fn invitation(email: &EmailData, payload: &mut NotificationPayload) {
    payload.insert("action_url", text(&email.data, "action_url"));
}

fn password_changed(email: &EmailData, payload: &mut NotificationPayload) {
    payload.insert("greeting_name", text(&email.data, "greeting_name"));
    payload.insert(
        "primary_email_address",
        text(&email.data, "primary_email_address"),
    );
}

/// Read a field as a string; scalars are stringified, anything else is "".
fn text(data: &Map<String, Value>, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
