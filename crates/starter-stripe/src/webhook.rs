//! # Stripe Webhook Handling
//!
//! Signature verification, event parsing and handler dispatch for the
//! notifications Stripe posts to the webhook endpoint.

use crate::checkout::PROVIDER;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use starter_core::{StarterError, StarterResult, WebhookEvent, WebhookEventType};
use std::collections::HashMap;
use tracing::{debug, info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed payload
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

// =============================================================================
// Signature Verification
// =============================================================================

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> StarterResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        StarterError::WebhookVerification("Missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(StarterError::WebhookVerification(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn signer(secret: &str, timestamp: i64, payload: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

/// Hex signature Stripe would send for `payload` at `timestamp`
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    hex::encode(signer(secret, timestamp, payload).finalize().into_bytes())
}

/// Check a `Stripe-Signature` header against the raw body.
///
/// Accepts the payload if any `v1` signature matches and the timestamp is
/// within `tolerance_secs` of `now`.
pub fn verify_signature(
    secret: &str,
    payload: &[u8],
    header: &str,
    now: i64,
    tolerance_secs: i64,
) -> StarterResult<()> {
    let parsed = parse_signature_header(header)?;

    // `t` is unauthenticated; abs_diff cannot overflow on hostile values
    if now.abs_diff(parsed.timestamp) > tolerance_secs.max(0) as u64 {
        return Err(StarterError::WebhookVerification(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    // verify_slice compares in constant time
    let valid = parsed.signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| {
                signer(secret, parsed.timestamp, payload)
                    .verify_slice(&bytes)
                    .is_ok()
            })
            .unwrap_or(false)
    });

    if !valid {
        return Err(StarterError::WebhookVerification(
            "Signature mismatch".to_string(),
        ));
    }

    Ok(())
}

// =============================================================================
// Event Parsing
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    created: i64,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

fn str_field(object: &serde_json::Map<String, serde_json::Value>, key: &str) -> Option<String> {
    object.get(key).and_then(|v| v.as_str()).map(String::from)
}

/// Parse an already-verified payload into a [`WebhookEvent`]
pub fn parse_event(payload: &[u8]) -> StarterResult<WebhookEvent> {
    let event: StripeWebhookEvent = serde_json::from_slice(payload)
        .map_err(|e| StarterError::Serialization(format!("Failed to parse webhook: {}", e)))?;

    debug!("Verified Stripe webhook: type={}", event.event_type);

    let object = event.data.object;
    let event_type = WebhookEventType::from_stripe(&event.event_type);

    let session_id = match event_type {
        WebhookEventType::CheckoutCompleted | WebhookEventType::CheckoutExpired => {
            str_field(&object, "id")
        }
        _ => None,
    };

    let customer_email = object
        .get("customer_details")
        .and_then(|cd| cd.get("email"))
        .and_then(|v| v.as_str())
        .map(String::from)
        .or_else(|| str_field(&object, "customer_email"));

    Ok(WebhookEvent {
        event_id: event.id,
        event_type,
        provider: PROVIDER.to_string(),
        session_id,
        payment_intent_id: str_field(&object, "payment_intent"),
        customer_email,
        amount_paid: object
            .get("amount_total")
            .or_else(|| object.get("amount_paid"))
            .and_then(|v| v.as_i64()),
        timestamp: DateTime::from_timestamp(event.created, 0).unwrap_or_else(Utc::now),
        raw_data: Some(serde_json::Value::Object(object)),
    })
}

// =============================================================================
// Dispatch
// =============================================================================

/// Parsed checkout.session.completed event data
#[derive(Debug, Clone)]
pub struct CheckoutCompletedData {
    pub session_id: String,
    pub payment_intent_id: Option<String>,
    pub subscription_id: Option<String>,
    pub customer_email: Option<String>,
    pub amount_total: i64,
    pub payment_status: String,
    pub metadata: HashMap<String, String>,
}

impl CheckoutCompletedData {
    /// Parse from a webhook event
    pub fn from_event(event: &WebhookEvent) -> StarterResult<Self> {
        let obj = event
            .raw_data
            .as_ref()
            .and_then(|raw| raw.as_object())
            .ok_or_else(|| StarterError::Serialization("Missing event object".to_string()))?;

        let session_id = str_field(obj, "id")
            .ok_or_else(|| StarterError::Serialization("Missing session id".to_string()))?;

        let metadata = obj
            .get("metadata")
            .and_then(|m| m.as_object())
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            session_id,
            payment_intent_id: str_field(obj, "payment_intent"),
            subscription_id: str_field(obj, "subscription"),
            customer_email: event.customer_email.clone(),
            amount_total: event.amount_paid.unwrap_or(0),
            payment_status: str_field(obj, "payment_status").unwrap_or_else(|| "unknown".to_string()),
            metadata,
        })
    }

    /// Check if payment was successful
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

/// Webhook event handler trait
///
/// Implement this trait to act on payment events (fulfilment, emails, ...).
#[allow(unused_variables)]
pub trait WebhookHandler: Send + Sync {
    /// Called when a checkout session is completed
    fn on_checkout_completed(&self, data: CheckoutCompletedData) -> StarterResult<()> {
        info!(
            "Checkout completed: session={}, amount={}, paid={}",
            data.session_id,
            data.amount_total,
            data.is_paid()
        );
        Ok(())
    }

    /// Called when a checkout session expires unpaid
    fn on_checkout_expired(&self, event: &WebhookEvent) -> StarterResult<()> {
        info!("Checkout expired: {:?}", event.session_id);
        Ok(())
    }

    /// Called when a payment succeeds
    fn on_payment_succeeded(&self, event: &WebhookEvent) -> StarterResult<()> {
        info!("Payment succeeded: {:?}", event.payment_intent_id);
        Ok(())
    }

    /// Called when a payment fails
    fn on_payment_failed(&self, event: &WebhookEvent) -> StarterResult<()> {
        warn!("Payment failed: {:?}", event.payment_intent_id);
        Ok(())
    }

    /// Called for subscription lifecycle events
    fn on_subscription_event(&self, event: &WebhookEvent) -> StarterResult<()> {
        info!("Subscription event {:?}: {}", event.event_type, event.event_id);
        Ok(())
    }

    /// Called for unknown/unhandled events
    fn on_unknown_event(&self, event: &WebhookEvent) -> StarterResult<()> {
        debug!("Unhandled webhook event: {:?}", event.event_type);
        Ok(())
    }
}

/// Default handler (just logs events)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a webhook event to the appropriate handler method
pub fn dispatch_webhook_event(handler: &dyn WebhookHandler, event: WebhookEvent) -> StarterResult<()> {
    match &event.event_type {
        WebhookEventType::CheckoutCompleted => {
            let data = CheckoutCompletedData::from_event(&event)?;
            handler.on_checkout_completed(data)
        }
        WebhookEventType::CheckoutExpired => handler.on_checkout_expired(&event),
        WebhookEventType::PaymentSucceeded => handler.on_payment_succeeded(&event),
        WebhookEventType::PaymentFailed => handler.on_payment_failed(&event),
        WebhookEventType::SubscriptionCreated
        | WebhookEventType::SubscriptionCancelled
        | WebhookEventType::SubscriptionRenewed => handler.on_subscription_event(&event),
        WebhookEventType::Unknown(_) => handler.on_unknown_event(&event),
    }
}

/// Events to enable on the Stripe Dashboard webhook endpoint
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &[
    "checkout.session.completed",
    "checkout.session.expired",
    "payment_intent.succeeded",
    "payment_intent.payment_failed",
    "customer.subscription.created",
    "customer.subscription.deleted",
    "invoice.paid",
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    const SECRET: &str = "whsec_test";

    fn checkout_payload() -> Vec<u8> {
        json!({
            "id": "evt_test",
            "type": "checkout.session.completed",
            "created": 1_700_000_000,
            "data": {
                "object": {
                    "id": "cs_test_123",
                    "payment_intent": "pi_test_456",
                    "customer_details": { "email": "ada@example.com" },
                    "amount_total": 1000,
                    "payment_status": "paid",
                    "metadata": { "plan": "starter" }
                }
            }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_parse_signature_header() {
        let parsed = parse_signature_header("t=1234567890,v1=abc123,v1=def456,v0=zzz").unwrap();

        assert_eq!(parsed.timestamp, 1234567890);
        assert_eq!(parsed.signatures, vec!["abc123", "def456"]);
    }

    #[test]
    fn test_parse_signature_header_missing_parts() {
        assert!(parse_signature_header("v1=abc").is_err());
        assert!(parse_signature_header("t=123").is_err());
        assert!(parse_signature_header("").is_err());
    }

    #[test]
    fn test_verify_valid_signature() {
        let payload = checkout_payload();
        let now = 1_700_000_100;
        let sig = compute_signature(SECRET, now, &payload);
        let header = format!("t={},v1={}", now, sig);

        assert!(verify_signature(SECRET, &payload, &header, now, SIGNATURE_TOLERANCE_SECS).is_ok());
    }

    #[test]
    fn test_verify_accepts_any_matching_v1() {
        let payload = checkout_payload();
        let now = 1_700_000_100;
        let sig = compute_signature(SECRET, now, &payload);
        let header = format!("t={},v1={},v1={}", now, "00".repeat(32), sig);

        assert!(verify_signature(SECRET, &payload, &header, now, SIGNATURE_TOLERANCE_SECS).is_ok());
    }

    #[test]
    fn test_verify_rejects_tampered_payload() {
        let payload = checkout_payload();
        let now = 1_700_000_100;
        let sig = compute_signature(SECRET, now, &payload);
        let header = format!("t={},v1={}", now, sig);

        let mut tampered = payload.clone();
        tampered.extend_from_slice(b" ");

        let err =
            verify_signature(SECRET, &tampered, &header, now, SIGNATURE_TOLERANCE_SECS).unwrap_err();
        assert!(matches!(err, StarterError::WebhookVerification(_)));
    }

    #[test]
    fn test_verify_rejects_wrong_secret_and_stale_timestamp() {
        let payload = checkout_payload();
        let signed_at = 1_700_000_000;
        let sig = compute_signature("whsec_other", signed_at, &payload);
        let header = format!("t={},v1={}", signed_at, sig);
        assert!(verify_signature(SECRET, &payload, &header, signed_at, 300).is_err());

        let sig = compute_signature(SECRET, signed_at, &payload);
        let header = format!("t={},v1={}", signed_at, sig);
        assert!(verify_signature(SECRET, &payload, &header, signed_at + 301, 300).is_err());
    }

    #[test]
    fn test_verify_rejects_extreme_timestamps() {
        let payload = checkout_payload();
        let now = 1_700_000_000;

        for t in [i64::MIN, -9_223_372_036_854_775_000, i64::MAX] {
            let header = format!("t={},v1={}", t, "00".repeat(32));
            let err = verify_signature(SECRET, &payload, &header, now, SIGNATURE_TOLERANCE_SECS)
                .unwrap_err();
            assert!(matches!(err, StarterError::WebhookVerification(_)));
        }
    }

    #[test]
    fn test_parse_checkout_completed() {
        let event = parse_event(&checkout_payload()).unwrap();

        assert_eq!(event.event_id, "evt_test");
        assert_eq!(event.event_type, WebhookEventType::CheckoutCompleted);
        assert_eq!(event.session_id.as_deref(), Some("cs_test_123"));
        assert_eq!(event.customer_email.as_deref(), Some("ada@example.com"));
        assert_eq!(event.amount_paid, Some(1000));

        let data = CheckoutCompletedData::from_event(&event).unwrap();
        assert!(data.is_paid());
        assert_eq!(data.payment_intent_id.as_deref(), Some("pi_test_456"));
        assert_eq!(data.metadata.get("plan").map(String::as_str), Some("starter"));
    }

    #[test]
    fn test_parse_event_garbage() {
        assert!(parse_event(b"not json").is_err());
    }

    #[test]
    fn test_dispatch_webhook() {
        struct TestHandler {
            called: AtomicBool,
        }

        impl WebhookHandler for TestHandler {
            fn on_checkout_completed(&self, _data: CheckoutCompletedData) -> StarterResult<()> {
                self.called.store(true, Ordering::SeqCst);
                Ok(())
            }
        }

        let handler = TestHandler {
            called: AtomicBool::new(false),
        };

        let event = parse_event(&checkout_payload()).unwrap();
        dispatch_webhook_event(&handler, event).unwrap();

        assert!(handler.called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_required_events_are_all_recognised() {
        for name in REQUIRED_WEBHOOK_EVENTS {
            let event_type = WebhookEventType::from_stripe(name);
            assert!(
                !matches!(event_type, WebhookEventType::Unknown(_)),
                "{} is not handled",
                name
            );
        }
    }
}
