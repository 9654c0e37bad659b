//! Stripe webhook signature verification.
//!
//! Header format: `t=<unix timestamp>,v1=<hex hmac>[,v1=<hex hmac>...]`. The HMAC-SHA256
//! covers `"{t}.{raw body}"`, so verification must see the body exactly as received.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use super::stripe_objects::StripeEvent;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed payload, matching Stripe's library default.
pub const SIGNATURE_TOLERANCE_SECS: u64 = 300;

#[derive(Debug, Error, PartialEq)]
pub enum WebhookVerificationError {
    #[error("webhook signing secret is not configured")]
    MissingSecret,
    #[error("invalid webhook signature: {0}")]
    InvalidSignature(&'static str),
    #[error("invalid webhook payload: {0}")]
    InvalidPayload(String),
}

/// Verifies `payload` against `signature_header` and decodes the event envelope.
pub fn verify_webhook_event(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
) -> Result<StripeEvent, WebhookVerificationError> {
    verify_webhook_event_at(payload, signature_header, secret, Utc::now().timestamp())
}

pub fn verify_webhook_event_at(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    now: i64,
) -> Result<StripeEvent, WebhookVerificationError> {
    if secret.trim().is_empty() {
        return Err(WebhookVerificationError::MissingSecret);
    }

    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in signature_header.split(',') {
        let part = part.trim();
        if let Some(rest) = part.strip_prefix("t=") {
            timestamp = Some(rest);
        } else if let Some(rest) = part.strip_prefix("v1=") {
            signatures.push(rest);
        }
    }

    let timestamp = timestamp.ok_or(WebhookVerificationError::InvalidSignature(
        "missing timestamp in stripe-signature",
    ))?;
    if signatures.is_empty() {
        return Err(WebhookVerificationError::InvalidSignature(
            "missing v1 in stripe-signature",
        ));
    }

    let signed_at: i64 = timestamp.parse().map_err(|_| {
        WebhookVerificationError::InvalidSignature("malformed timestamp in stripe-signature")
    })?;
    // `t` is unauthenticated here, so the distance must not overflow.
    if now.abs_diff(signed_at) > SIGNATURE_TOLERANCE_SECS {
        return Err(WebhookVerificationError::InvalidSignature(
            "timestamp outside the tolerance zone",
        ));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookVerificationError::MissingSecret)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|signature| match hex::decode(signature) {
        Ok(provided) => mac.clone().verify_slice(&provided).is_ok(),
        Err(_) => false,
    });
    if !matched {
        return Err(WebhookVerificationError::InvalidSignature(
            "no signatures found matching the expected signature for payload",
        ));
    }

    serde_json::from_slice::<StripeEvent>(payload)
        .map_err(|err| WebhookVerificationError::InvalidPayload(err.to_string()))
}
