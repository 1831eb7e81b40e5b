//! Novu trigger API client.
//!
//! One client is built at startup and shared for the life of the process.
//! Reference: https://docs.novu.co/api-reference/events/trigger-event

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

use super::types::{NotificationPayload, Subscriber};
use super::NotificationTrigger;
use crate::config::Config;
use crate::error::TriggerError;

const TRIGGER_PATH: &str = "/v1/events/trigger";

/// Longest response body kept in a rejection error.
const MAX_ERROR_BODY: usize = 512;

#[derive(Serialize)]
struct TriggerRequest<'a> {
    name: &'a str,
    to: &'a Subscriber,
    payload: &'a NotificationPayload,
}

/// HTTP client for the Novu events API.
#[derive(Clone)]
pub struct NovuClient {
    http: Client,
    endpoint: String,
    secret_key: String,
}

impl NovuClient {
    pub fn new(api_url: &str, secret_key: String, timeout: Duration) -> Result<Self, TriggerError> {
        let http = Client::builder().timeout(timeout).build()?;
        let endpoint = format!("{}{}", api_url.trim_end_matches('/'), TRIGGER_PATH);

        info!(endpoint = %endpoint, "novu_client_initialized");

        Ok(Self {
            http,
            endpoint,
            secret_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, TriggerError> {
        Self::new(
            &config.novu_api_url,
            config.novu_secret_key.clone(),
            config.request_timeout(),
        )
    }
}

#[async_trait]
impl NotificationTrigger for NovuClient {
    async fn trigger(
        &self,
        workflow_id: &str,
        subscriber: &Subscriber,
        payload: &NotificationPayload,
    ) -> Result<(), TriggerError> {
        let request = TriggerRequest {
            name: workflow_id,
            to: subscriber,
            payload,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("ApiKey {}", self.secret_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(
                workflow_id,
                subscriber_id = %subscriber.subscriber_id,
                status_code = status.as_u16(),
                "novu_trigger_sent"
            );
            return Ok(());
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }

        error!(
            workflow_id,
            status_code = status.as_u16(),
            "novu_trigger_rejected"
        );

        Err(TriggerError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
