//! # Payment Strategy Trait
//!
//! Strategy trait for hosted payment providers. The app is wired to a single
//! provider at startup and reaches it only through this trait, so handlers
//! can be exercised against in-memory fakes.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PaymentStrategy (trait)                  │
//! │  ├── create_checkout()               one-time payment       │
//! │  ├── create_subscription_checkout()  recurring price        │
//! │  ├── get_subscription() / cancel_subscription()             │
//! │  ├── verify_webhook()                                       │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                    ┌───────┴───────┐
//!                    │StripeCheckout │
//!                    │   Strategy    │
//!                    └───────────────┘
//! ```

use crate::checkout::{CheckoutRequest, CheckoutSession, Subscription, SubscriptionRequest};
use crate::error::StarterResult;
use crate::event::WebhookEvent;
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for payment provider implementations.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Create a one-time payment session and return the redirect URL.
    async fn create_checkout(&self, request: &CheckoutRequest) -> StarterResult<CheckoutSession>;

    /// Create a subscription session for a provider-side price.
    async fn create_subscription_checkout(
        &self,
        request: &SubscriptionRequest,
    ) -> StarterResult<CheckoutSession>;

    /// Fetch a subscription by provider ID
    async fn get_subscription(&self, subscription_id: &str) -> StarterResult<Subscription>;

    /// Cancel a subscription immediately
    async fn cancel_subscription(&self, subscription_id: &str) -> StarterResult<Subscription>;

    /// Verify a webhook signature and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes
    /// * `signature` - Signature header from the request
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> StarterResult<WebhookEvent>;

    /// Get the provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;

/// Redirect targets handed to the provider
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Base URL of the application (e.g., "https://app.example.com")
    pub base_url: String,
    /// Success page path
    pub success_path: String,
    /// Cancel page path
    pub cancel_path: String,
}

impl CheckoutUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            success_path: "/success".to_string(),
            cancel_path: "/cancel".to_string(),
        }
    }

    pub fn success_url(&self) -> String {
        format!("{}{}", self.base_url, self.success_path)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}{}", self.base_url, self.cancel_path)
    }

    /// Whether redirects (and therefore cookies) travel over TLS
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl Default for CheckoutUrls {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}
