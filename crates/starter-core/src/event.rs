//! # Webhook Events
//!
//! Provider-neutral view of a verified webhook notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Webhook event types we care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// Checkout session completed
    CheckoutCompleted,
    /// Checkout session expired without payment
    CheckoutExpired,
    /// Payment succeeded
    PaymentSucceeded,
    /// Payment failed
    PaymentFailed,
    /// Subscription created
    SubscriptionCreated,
    /// Subscription cancelled
    SubscriptionCancelled,
    /// Subscription renewed
    SubscriptionRenewed,
    /// Unknown event (passthrough)
    Unknown(String),
}

impl WebhookEventType {
    /// Map a provider event name onto our event types
    pub fn from_stripe(name: &str) -> Self {
        match name {
            "checkout.session.completed" => WebhookEventType::CheckoutCompleted,
            "checkout.session.expired" => WebhookEventType::CheckoutExpired,
            "payment_intent.succeeded" => WebhookEventType::PaymentSucceeded,
            "payment_intent.payment_failed" => WebhookEventType::PaymentFailed,
            "customer.subscription.created" => WebhookEventType::SubscriptionCreated,
            "customer.subscription.deleted" => WebhookEventType::SubscriptionCancelled,
            "invoice.paid" => WebhookEventType::SubscriptionRenewed,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }
}

/// A verified, parsed webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from provider
    pub event_id: String,

    pub event_type: WebhookEventType,

    /// Provider name
    pub provider: String,

    /// Related checkout session ID (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Related payment intent ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,

    /// Amount paid (in smallest unit)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<i64>,

    /// Raw `data.object` payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<serde_json::Value>,

    pub timestamp: DateTime<Utc>,
}
