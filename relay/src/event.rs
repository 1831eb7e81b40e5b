//! Typed Clerk webhook events.
//!
//! Events are decoded in two steps: the envelope first (`type` + raw `data`),
//! then the kind-specific record. Unknown kinds decode to
//! [`VerifiedEvent::Other`] so new Clerk event types never fail a delivery.
//!
//! Only call [`VerifiedEvent::from_slice`] on bytes whose signature has
//! already been checked.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::EventError;

pub const USER_CREATED: &str = "user.created";
pub const USER_UPDATED: &str = "user.updated";
pub const USER_DELETED: &str = "user.deleted";
pub const EMAIL_CREATED: &str = "email.created";

/// Raw event envelope as sent by Clerk.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

/// An authenticated, decoded webhook event.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifiedEvent {
    UserCreated(UserData),
    /// Log-only; carries just the user id.
    UserUpdated(UserRef),
    /// Log-only; carries just the user id.
    UserDeleted(UserRef),
    EmailCreated(EmailData),
    /// Any event kind this relay does not interpret.
    Other { kind: String },
}

impl VerifiedEvent {
    pub fn from_slice(body: &[u8]) -> Result<Self, EventError> {
        let envelope: Envelope = serde_json::from_slice(body)?;
        let kind = envelope.kind;
        let data = envelope.data;

        let event = match kind.as_str() {
            USER_CREATED => VerifiedEvent::UserCreated(decode_data(&kind, data)?),
            USER_UPDATED => VerifiedEvent::UserUpdated(UserRef::from_data(&data)),
            USER_DELETED => VerifiedEvent::UserDeleted(UserRef::from_data(&data)),
            EMAIL_CREATED => VerifiedEvent::EmailCreated(decode_data(&kind, data)?),
            _ => VerifiedEvent::Other { kind },
        };

        Ok(event)
    }

    /// The event type tag, e.g. `user.created`.
    pub fn kind(&self) -> &str {
        match self {
            VerifiedEvent::UserCreated(_) => USER_CREATED,
            VerifiedEvent::UserUpdated(_) => USER_UPDATED,
            VerifiedEvent::UserDeleted(_) => USER_DELETED,
            VerifiedEvent::EmailCreated(_) => EMAIL_CREATED,
            VerifiedEvent::Other { kind } => kind,
        }
    }
}

fn decode_data<T>(kind: &str, data: Value) -> Result<T, EventError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(data).map_err(|source| EventError::Data {
        kind: kind.to_string(),
        source,
    })
}

/// Clerk user record carried by `user.created`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserData {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Epoch milliseconds
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub last_sign_in_at: Option<i64>,
}

impl UserData {
    /// The first listed email address.
    pub fn primary_email(&self) -> Option<&str> {
        self.email_addresses
            .first()
            .map(|e| e.email_address.as_str())
            .filter(|e| !e.is_empty())
    }

    pub fn primary_phone(&self) -> Option<&str> {
        self.phone_numbers
            .first()
            .map(|p| p.phone_number.as_str())
            .filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmailAddress {
    #[serde(default)]
    pub id: Option<String>,
    pub email_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PhoneNumber {
    #[serde(default)]
    pub id: Option<String>,
    pub phone_number: String,
}

/// Identity of the user behind a log-only event.
///
/// Read straight from the raw `data` so the rest of the record never has
/// to match any shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserRef {
    pub id: Option<String>,
}

impl UserRef {
    fn from_data(data: &Value) -> Self {
        Self {
            id: data.get("id").and_then(Value::as_str).map(str::to_string),
        }
    }
}

/// Clerk email record carried by `email.created`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmailData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub to_email_address: Option<String>,
    /// Template variables for the email; shape depends on the slug.
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
