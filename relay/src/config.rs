//! Configuration module for environment variable parsing.
//!
//! The signing secret and the Novu key are required; everything else has a
//! default. Values are read through a lookup function so tests can supply
//! their own variables without touching the process environment.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

pub const SIGNING_SECRET_VAR: &str = "CLERK_WEBHOOK_SIGNING_SECRET";
pub const NOVU_SECRET_KEY_VAR: &str = "NOVU_SECRET_KEY";

const DEFAULT_NOVU_API_URL: &str = "https://api.novu.co";
const DEFAULT_SUBSCRIBER_PREFIX: &str = "clerk_";
const DEFAULT_LOCALE: &str = "en_US";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Svix signing secret for Clerk webhooks (`whsec_...`)
    pub webhook_signing_secret: String,

    /// Accepted clock skew for the `svix-timestamp` header, in seconds
    pub webhook_tolerance_secs: u64,

    /// Novu API key used by the trigger client
    pub novu_secret_key: String,

    /// Base URL of the Novu API
    pub novu_api_url: String,

    /// HTTP request timeout in milliseconds for trigger calls
    pub request_timeout_ms: u64,

    /// Prefix prepended to derived subscriber identifiers
    pub subscriber_prefix: String,

    /// Locale assigned to every subscriber
    pub default_locale: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080),

            webhook_signing_secret: required(&lookup, SIGNING_SECRET_VAR)?,

            webhook_tolerance_secs: parse_or(&lookup, "WEBHOOK_TOLERANCE_SECS", 300),

            novu_secret_key: required(&lookup, NOVU_SECRET_KEY_VAR)?,

            novu_api_url: non_blank(&lookup, "NOVU_API_URL")
                .unwrap_or_else(|| DEFAULT_NOVU_API_URL.to_string()),

            request_timeout_ms: parse_or(&lookup, "REQUEST_TIMEOUT_MS", 8000),

            subscriber_prefix: non_blank(&lookup, "SUBSCRIBER_ID_PREFIX")
                .unwrap_or_else(|| DEFAULT_SUBSCRIBER_PREFIX.to_string()),

            default_locale: non_blank(&lookup, "DEFAULT_LOCALE")
                .unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
        })
    }

    pub fn webhook_tolerance(&self) -> Duration {
        Duration::from_secs(self.webhook_tolerance_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn non_blank<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_blank(lookup, name).ok_or(ConfigError::Missing(name))
}

/// Parse a numeric variable, falling back to the default when absent or invalid.
fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = match lookup(name) {
        Some(v) => v,
        None => return default,
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid numeric value, using default");
            default
        }
    }
}
