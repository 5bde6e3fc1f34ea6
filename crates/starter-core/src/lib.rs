//! # starter-core
//!
//! Core types and traits for the saas-starter application.
//!
//! This crate provides:
//! - `AuthProvider` trait and the `User` / `AuthSession` / `Credentials` types
//! - `PaymentStrategy` trait for hosted checkout providers
//! - `CheckoutRequest`, `CheckoutResult` and `initiate_checkout` for the payment flow
//! - `WebhookEvent` for verified provider notifications
//! - `StarterError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use starter_core::{initiate_checkout, CheckoutRequest, CheckoutUrls};
//!
//! let urls = CheckoutUrls::new("https://app.example.com");
//! let request = CheckoutRequest::new(1000, "Sample Product", urls.success_url(), urls.cancel_url());
//!
//! match initiate_checkout(strategy.as_ref(), &request).await {
//!     CheckoutResult::Url(url) => { /* redirect the browser */ }
//!     CheckoutResult::Error(message) => { /* show the message */ }
//! }
//! ```

pub mod auth;
pub mod checkout;
pub mod error;
pub mod event;
pub mod strategy;

// Re-exports for convenience
pub use auth::{
    AuthProvider, AuthSession, BoxedAuthProvider, Credentials, User, MIN_PASSWORD_LEN,
    MISSING_FIELDS_MESSAGE, SHORT_PASSWORD_MESSAGE,
};
pub use checkout::{
    initiate_checkout, initiate_subscription, CheckoutMode, CheckoutRequest, CheckoutResult,
    CheckoutSession, Currency, LineItem, Subscription, SubscriptionRequest,
};
pub use error::{StarterError, StarterResult, INTERNAL_ERROR_MESSAGE};
pub use event::{WebhookEvent, WebhookEventType};
pub use strategy::{BoxedPaymentStrategy, CheckoutUrls, PaymentStrategy};
