//! # Checkout Types
//!
//! Transient checkout/subscription requests and the values a payment
//! provider hands back. Nothing here is persisted.

use crate::error::StarterResult;
use crate::strategy::PaymentStrategy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Charge currency (ISO 4217). Checkout only sells in US dollars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    USD,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
        }
    }

    /// Format an amount in the smallest unit for display (e.g., "$10.00")
    pub fn display_amount(&self, amount: i64) -> String {
        let symbol = match self {
            Currency::USD => "$",
        };
        format!("{}{}.{:02}", symbol, amount / 100, (amount % 100).abs())
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Checkout mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    /// One-time payment
    #[default]
    Payment,
    /// Recurring subscription
    Subscription,
}

impl CheckoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutMode::Payment => "payment",
            CheckoutMode::Subscription => "subscription",
        }
    }
}

/// A line item sent to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product name shown on the hosted page
    pub name: String,
    /// Unit price in the smallest currency unit
    pub unit_amount: i64,
    pub currency: Currency,
    pub quantity: u32,
}

/// One-time payment request.
///
/// Callers validate `price_in_cents > 0` and a non-empty `product_name`
/// before building one; the payment layer does not re-check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub price_in_cents: i64,
    pub product_name: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutRequest {
    pub fn new(
        price_in_cents: i64,
        product_name: impl Into<String>,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        Self {
            price_in_cents,
            product_name: product_name.into(),
            success_url: success_url.into(),
            cancel_url: cancel_url.into(),
        }
    }

    /// The single line item for this request: quantity 1, fixed currency
    pub fn line_item(&self) -> LineItem {
        LineItem {
            name: self.product_name.clone(),
            unit_amount: self.price_in_cents,
            currency: Currency::USD,
            quantity: 1,
        }
    }

    pub fn mode(&self) -> CheckoutMode {
        CheckoutMode::Payment
    }
}

/// Recurring payment request for a provider-side price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    /// Provider price ID (price_...)
    pub price_id: String,
    /// Prefill for the hosted page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

/// A checkout session created by a payment provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID
    pub session_id: String,

    /// Provider name (e.g., "stripe")
    pub provider: String,

    /// URL to redirect customer to for payment
    pub checkout_url: String,

    pub mode: CheckoutMode,

    /// When the session expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// Outcome of a checkout attempt; exactly one of url / error.
///
/// Serializes as `{"url": "..."}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutResult {
    Url(String),
    Error(String),
}

impl CheckoutResult {
    pub fn url(&self) -> Option<&str> {
        match self {
            CheckoutResult::Url(url) => Some(url.as_str()),
            CheckoutResult::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            CheckoutResult::Url(_) => None,
            CheckoutResult::Error(message) => Some(message.as_str()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CheckoutResult::Url(_))
    }
}

impl From<StarterResult<CheckoutSession>> for CheckoutResult {
    fn from(result: StarterResult<CheckoutSession>) -> Self {
        match result {
            Ok(session) => CheckoutResult::Url(session.checkout_url),
            Err(e) => CheckoutResult::Error(e.public_message()),
        }
    }
}

/// Ask the provider for a one-time payment session.
///
/// Provider failures are logged and folded into `CheckoutResult::Error`;
/// nothing propagates past this call.
pub async fn initiate_checkout(
    strategy: &dyn PaymentStrategy,
    request: &CheckoutRequest,
) -> CheckoutResult {
    let result = strategy.create_checkout(request).await;
    match &result {
        Ok(session) => info!(
            provider = strategy.provider_name(),
            session_id = %session.session_id,
            "Created checkout session"
        ),
        Err(e) => error!(provider = strategy.provider_name(), "Error creating checkout session: {}", e),
    }
    result.into()
}

/// Ask the provider for a subscription session; same contract as [`initiate_checkout`]
pub async fn initiate_subscription(
    strategy: &dyn PaymentStrategy,
    request: &SubscriptionRequest,
) -> CheckoutResult {
    let result = strategy.create_subscription_checkout(request).await;
    if let Err(e) = &result {
        error!(provider = strategy.provider_name(), "Error creating subscription session: {}", e);
    }
    result.into()
}

/// Subscription state as reported by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    /// Provider status string (active, past_due, canceled, ...)
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_period_end: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        matches!(self.status.as_str(), "active" | "trialing")
    }
}
