//! # starter-stripe
//!
//! Stripe payment strategy for saas-starter-rs.
//!
//! **StripeCheckoutStrategy** implements `PaymentStrategy` over the
//! Checkout Sessions API:
//! - one-time payments with a single dynamic line item
//! - subscription checkout for a dashboard-defined price
//! - subscription lookup and cancellation
//! - webhook signature verification
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use starter_core::{initiate_checkout, CheckoutRequest};
//! use starter_stripe::StripeCheckoutStrategy;
//!
//! let strategy = StripeCheckoutStrategy::from_env()?;
//!
//! let request = CheckoutRequest::new(1000, "Sample Product", success_url, cancel_url);
//! let result = initiate_checkout(&strategy, &request).await;
//! // result is either {"url": ...} or {"error": ...}
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use starter_stripe::{dispatch_webhook_event, LoggingWebhookHandler};
//!
//! let event = strategy.verify_webhook(&body, signature_header).await?;
//! dispatch_webhook_event(&LoggingWebhookHandler, event)?;
//! ```

pub mod checkout;
pub mod config;
pub mod subscription;
pub mod webhook;

// Re-exports
pub use checkout::StripeCheckoutStrategy;
pub use config::StripeConfig;
pub use webhook::{
    compute_signature, dispatch_webhook_event, verify_signature, CheckoutCompletedData,
    LoggingWebhookHandler, WebhookHandler, REQUIRED_WEBHOOK_EVENTS, SIGNATURE_TOLERANCE_SECS,
};
