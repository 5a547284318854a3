//! Gateway webhook signature verification and event payload.
//!
//! The gateway signs each callback with HMAC-SHA256 over
//! `"{timestamp}.{raw_body}"` and sends the result in the
//! `Gateway-Signature` header as `t=<unix_ts>,v1=<hex_digest>`.
//! Verification is constant-time via [`Mac::verify_slice`], and stale
//! timestamps are rejected to bound replay.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::client::ChargeStatus;
use crate::error::PaymentError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a webhook timestamp before it is rejected as a replay.
pub const MAX_TIMESTAMP_SKEW_SECS: i64 = 300;

/// A parsed gateway webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// Gateway charge identifier the event refers to.
    pub charge_id: String,
    pub status: ChargeStatus,
}

/// Verify a webhook signature header against the raw request body.
///
/// `now_unix` is passed in rather than read from the clock so the check
/// is testable.
pub fn verify_signature(
    payload: &[u8],
    signature_header: &str,
    webhook_secret: &str,
    now_unix: i64,
) -> Result<(), PaymentError> {
    let mut timestamp: Option<i64> = None;
    let mut signature: Option<&str> = None;

    for part in signature_header.split(',') {
        match part.split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => signature = Some(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(PaymentError::InvalidSignature)?;
    let signature = signature.ok_or(PaymentError::InvalidSignature)?;

    if (now_unix - timestamp).abs() > MAX_TIMESTAMP_SKEW_SECS {
        return Err(PaymentError::InvalidSignature);
    }

    let signature_bytes = hex::decode(signature).map_err(|_| PaymentError::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(webhook_secret.as_bytes())
        .map_err(|_| PaymentError::InvalidSignature)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    mac.verify_slice(&signature_bytes)
        .map_err(|_| PaymentError::InvalidSignature)
}

/// Parse a verified webhook body.
pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, PaymentError> {
    serde_json::from_slice(payload).map_err(|e| PaymentError::Deserialize(e.to_string()))
}
