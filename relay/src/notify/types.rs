//! Records handed to the notification trigger.
//!
//! Field names serialize in the camelCase form the Novu trigger API expects.

use serde::Serialize;
use serde_json::{Map, Value};

/// Normalized notification recipient.
///
/// Empty optional fields are left out of the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub subscriber_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub locale: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub avatar: String,
    /// Free-form metadata, sent as the subscriber's `data`.
    #[serde(rename = "data", skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Subscriber {
    pub fn new(subscriber_id: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            subscriber_id: subscriber_id.into(),
            locale: locale.into(),
            ..Default::default()
        }
    }
}

/// Free-form template variables for a workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NotificationPayload(Map<String, Value>);

impl NotificationPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
