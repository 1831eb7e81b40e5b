//! Clerk webhook signature verification.
//!
//! Clerk delivers webhooks through Svix, which signs each request using
//! HMAC-SHA256 over `"{svix-id}.{svix-timestamp}.{body}"`.
//! Reference: https://docs.svix.com/receiving/verifying-payloads/how-manual

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use crate::error::{ConfigError, VerifyError};

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_ID: &str = "svix-id";
pub const HEADER_TIMESTAMP: &str = "svix-timestamp";
pub const HEADER_SIGNATURE: &str = "svix-signature";

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

/// The three transport headers that authenticate a delivery.
#[derive(Debug, Clone, Copy)]
pub struct SignatureHeaders<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
}

impl<'a> SignatureHeaders<'a> {
    /// Extract the signature headers. Absent, empty or non-ASCII values
    /// all count as missing.
    pub fn from_header_map(headers: &'a HeaderMap) -> Result<Self, VerifyError> {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        match (get(HEADER_ID), get(HEADER_TIMESTAMP), get(HEADER_SIGNATURE)) {
            (Some(id), Some(timestamp), Some(signature)) => Ok(Self {
                id,
                timestamp,
                signature,
            }),
            (id, timestamp, signature) => {
                warn!(
                    has_id = id.is_some(),
                    has_timestamp = timestamp.is_some(),
                    has_signature = signature.is_some(),
                    "webhook_signature_missing_headers"
                );
                Err(VerifyError::MissingHeaders)
            }
        }
    }
}

/// Verifies Svix-signed webhook deliveries against a shared secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    mac: HmacSha256,
    tolerance: Duration,
}

impl WebhookVerifier {
    /// Build a verifier from a signing secret.
    ///
    /// The secret is base64, optionally prefixed with `whsec_`.
    pub fn new(secret: &str, tolerance: Duration) -> Result<Self, ConfigError> {
        let secret = secret.trim();
        let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        let key = STANDARD
            .decode(encoded)
            .map_err(|_| ConfigError::InvalidSecret)?;

        if key.is_empty() {
            return Err(ConfigError::InvalidSecret);
        }

        let mac = HmacSha256::new_from_slice(&key).map_err(|_| ConfigError::InvalidSecret)?;

        Ok(Self { mac, tolerance })
    }

    /// Verify a delivery against the current wall clock.
    pub fn verify(&self, headers: &SignatureHeaders<'_>, body: &[u8]) -> Result<(), VerifyError> {
        self.verify_at(headers, body, unix_now())
    }

    /// Verify a delivery as of `now` (Unix seconds).
    ///
    /// `body` must be the exact bytes received; the signature covers them
    /// byte for byte.
    pub fn verify_at(
        &self,
        headers: &SignatureHeaders<'_>,
        body: &[u8],
        now: i64,
    ) -> Result<(), VerifyError> {
        let webhook_time: i64 = match headers.timestamp.parse() {
            Ok(t) => t,
            Err(_) => {
                warn!(svix_id = %headers.id, timestamp = %headers.timestamp, "webhook_signature_invalid_timestamp");
                return Err(VerifyError::InvalidTimestamp);
            }
        };

        let tolerance = i64::try_from(self.tolerance.as_secs()).unwrap_or(i64::MAX);

        if now.saturating_sub(webhook_time) > tolerance {
            warn!(
                svix_id = %headers.id,
                webhook_time,
                current_time = now,
                "webhook_signature_stale"
            );
            return Err(VerifyError::TimestampTooOld);
        }

        if webhook_time.saturating_sub(now) > tolerance {
            warn!(
                svix_id = %headers.id,
                webhook_time,
                current_time = now,
                "webhook_signature_from_future"
            );
            return Err(VerifyError::TimestampTooNew);
        }

        let mut candidates = 0usize;
        for entry in headers.signature.split_whitespace() {
            let Some((version, encoded)) = entry.split_once(',') else {
                continue;
            };
            if version != SIGNATURE_VERSION {
                continue;
            }
            let Ok(expected) = STANDARD.decode(encoded) else {
                continue;
            };
            candidates += 1;

            // verify_slice compares in constant time
            if self
                .signed_content(headers.id, headers.timestamp, body)
                .verify_slice(&expected)
                .is_ok()
            {
                return Ok(());
            }
        }

        if candidates == 0 {
            warn!(svix_id = %headers.id, "webhook_signature_header_malformed");
            return Err(VerifyError::InvalidSignatureHeader);
        }

        warn!(svix_id = %headers.id, candidates, "webhook_signature_mismatch");
        Err(VerifyError::NoMatchingSignature)
    }

    /// Produce a `v1,<base64>` signature header value for a delivery.
    pub fn sign(&self, msg_id: &str, timestamp: i64, body: &[u8]) -> String {
        let timestamp = timestamp.to_string();
        let digest = self
            .signed_content(msg_id, &timestamp, body)
            .finalize()
            .into_bytes();
        format!("{},{}", SIGNATURE_VERSION, STANDARD.encode(digest))
    }

    fn signed_content(&self, msg_id: &str, timestamp: &str, body: &[u8]) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        mac
    }
}

fn unix_now() -> i64 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    i64::try_from(secs).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";
    const NOW: i64 = 1_700_000_000;
    const BODY: &[u8] = br#"{"type":"user.created","object":"event","data":{"id":"usr_1"}}"#;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(SECRET, Duration::from_secs(300)).unwrap()
    }

    fn headers<'a>(id: &'a str, timestamp: &'a str, signature: &'a str) -> SignatureHeaders<'a> {
        SignatureHeaders {
            id,
            timestamp,
            signature,
        }
    }

    #[test]
    fn test_verify_signature_valid() {
        let v = verifier();
        let sig = v.sign("msg_1", NOW, BODY);
        let ts = NOW.to_string();

        assert_eq!(v.verify_at(&headers("msg_1", &ts, &sig), BODY, NOW), Ok(()));
    }

    #[test]
    fn test_verify_signature_tampered_body() {
        let v = verifier();
        let sig = v.sign("msg_1", NOW, BODY);
        let ts = NOW.to_string();
        let tampered = br#"{"type":"user.created","object":"event","data":{"id":"usr_2"}}"#;

        assert_eq!(
            v.verify_at(&headers("msg_1", &ts, &sig), tampered, NOW),
            Err(VerifyError::NoMatchingSignature)
        );
    }

    #[test]
    fn test_verify_signature_reserialized_body_fails() {
        let v = verifier();
        let sig = v.sign("msg_1", NOW, BODY);
        let ts = NOW.to_string();
        let value: serde_json::Value = serde_json::from_slice(BODY).unwrap();
        let pretty = serde_json::to_vec_pretty(&value).unwrap();

        assert!(v.verify_at(&headers("msg_1", &ts, &sig), &pretty, NOW).is_err());
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let other = WebhookVerifier::new("whsec_b3RoZXItc2VjcmV0", Duration::from_secs(300)).unwrap();
        let sig = other.sign("msg_1", NOW, BODY);
        let ts = NOW.to_string();

        assert_eq!(
            verifier().verify_at(&headers("msg_1", &ts, &sig), BODY, NOW),
            Err(VerifyError::NoMatchingSignature)
        );
    }

    #[test]
    fn test_verify_signature_different_message_id() {
        let v = verifier();
        let sig = v.sign("msg_1", NOW, BODY);
        let ts = NOW.to_string();

        assert_eq!(
            v.verify_at(&headers("msg_2", &ts, &sig), BODY, NOW),
            Err(VerifyError::NoMatchingSignature)
        );
    }

    #[test]
    fn test_verify_signature_stale() {
        let v = verifier();
        let old = NOW - 301;
        let sig = v.sign("msg_1", old, BODY);
        let ts = old.to_string();

        assert_eq!(
            v.verify_at(&headers("msg_1", &ts, &sig), BODY, NOW),
            Err(VerifyError::TimestampTooOld)
        );
    }

    #[test]
    fn test_verify_signature_future() {
        let v = verifier();
        let future = NOW + 301;
        let sig = v.sign("msg_1", future, BODY);
        let ts = future.to_string();

        assert_eq!(
            v.verify_at(&headers("msg_1", &ts, &sig), BODY, NOW),
            Err(VerifyError::TimestampTooNew)
        );
    }

    #[test]
    fn test_verify_signature_at_tolerance_edge() {
        let v = verifier();
        let edge = NOW - 300;
        let sig = v.sign("msg_1", edge, BODY);
        let ts = edge.to_string();

        assert_eq!(v.verify_at(&headers("msg_1", &ts, &sig), BODY, NOW), Ok(()));
    }

    #[test]
    fn test_verify_signature_invalid_timestamp() {
        assert_eq!(
            verifier().verify_at(&headers("msg_1", "yesterday", "v1,abc"), BODY, NOW),
            Err(VerifyError::InvalidTimestamp)
        );
    }

    #[test]
    fn test_verify_signature_multiple_entries() {
        let v = verifier();
        let good = v.sign("msg_1", NOW, BODY);
        let combined = format!("v1,bm90LXRoZS1zaWduYXR1cmU= v2,ignored {}", good);
        let ts = NOW.to_string();

        assert_eq!(v.verify_at(&headers("msg_1", &ts, &combined), BODY, NOW), Ok(()));
    }

    #[test]
    fn test_verify_signature_malformed_header() {
        let ts = NOW.to_string();
        assert_eq!(
            verifier().verify_at(&headers("msg_1", &ts, "garbage v2,abc"), BODY, NOW),
            Err(VerifyError::InvalidSignatureHeader)
        );
    }

    #[test]
    fn test_secret_prefix_optional() {
        let prefixed = verifier();
        let bare = WebhookVerifier::new(
            SECRET.trim_start_matches(SECRET_PREFIX),
            Duration::from_secs(300),
        )
        .unwrap();
        let sig = prefixed.sign("msg_1", NOW, BODY);
        let ts = NOW.to_string();

        assert_eq!(prefixed.verify_at(&headers("msg_1", &ts, &sig), BODY, NOW), Ok(()));
        assert_eq!(bare.verify_at(&headers("msg_1", &ts, &sig), BODY, NOW), Ok(()));
        assert_eq!(bare.sign("msg_1", NOW, BODY), sig);
    }

    #[test]
    fn test_non_base64_bare_secret_rejected() {
        assert!(matches!(
            WebhookVerifier::new("plain-secret!", Duration::from_secs(300)),
            Err(ConfigError::InvalidSecret)
        ));
    }

    #[test]
    fn test_invalid_secret_rejected() {
        assert!(matches!(
            WebhookVerifier::new("whsec_!!!not-base64!!!", Duration::from_secs(300)),
            Err(ConfigError::InvalidSecret)
        ));
        assert!(matches!(
            WebhookVerifier::new("whsec_", Duration::from_secs(300)),
            Err(ConfigError::InvalidSecret)
        ));
    }

    #[test]
    fn test_headers_from_map() {
        let mut map = HeaderMap::new();
        map.insert(HEADER_ID, HeaderValue::from_static("msg_1"));
        map.insert(HEADER_TIMESTAMP, HeaderValue::from_static("1700000000"));
        map.insert(HEADER_SIGNATURE, HeaderValue::from_static("v1,abc"));

        let parsed = SignatureHeaders::from_header_map(&map).unwrap();
        assert_eq!(parsed.id, "msg_1");
        assert_eq!(parsed.timestamp, "1700000000");
        assert_eq!(parsed.signature, "v1,abc");
    }

    #[test]
    fn test_headers_missing_or_empty() {
        let mut map = HeaderMap::new();
        map.insert(HEADER_ID, HeaderValue::from_static("msg_1"));
        map.insert(HEADER_TIMESTAMP, HeaderValue::from_static("1700000000"));
        assert_eq!(
            SignatureHeaders::from_header_map(&map).unwrap_err(),
            VerifyError::MissingHeaders
        );

        map.insert(HEADER_SIGNATURE, HeaderValue::from_static(""));
        assert_eq!(
            SignatureHeaders::from_header_map(&map).unwrap_err(),
            VerifyError::MissingHeaders
        );
    }
}
