//! # Stripe Subscriptions
//!
//! Response mapping for `GET`/`DELETE /v1/subscriptions/{id}`.
//! The HTTP calls live on the strategy in `checkout.rs`.

use chrono::DateTime;
use serde::Deserialize;
use starter_core::{StarterError, StarterResult, Subscription};

/// Subset of the Stripe subscription object we read
#[derive(Debug, Deserialize)]
pub(crate) struct StripeSubscription {
    id: String,
    status: String,
    #[serde(default)]
    customer: Option<String>,
    #[serde(default)]
    cancel_at_period_end: bool,
    #[serde(default)]
    current_period_end: Option<i64>,
}

impl StripeSubscription {
    pub(crate) fn parse(body: &str) -> StarterResult<Self> {
        serde_json::from_str(body).map_err(|e| {
            StarterError::Serialization(format!("Failed to parse subscription: {}", e))
        })
    }
}

impl From<StripeSubscription> for Subscription {
    fn from(sub: StripeSubscription) -> Self {
        Subscription {
            id: sub.id,
            status: sub.status,
            customer: sub.customer,
            cancel_at_period_end: sub.cancel_at_period_end,
            current_period_end: sub
                .current_period_end
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        }
    }
}
