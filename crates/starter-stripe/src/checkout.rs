//! # Stripe Checkout Sessions
//!
//! Implementation of the Stripe Checkout Sessions API.
//! Card details never touch this server; customers pay on the hosted page.

use crate::config::StripeConfig;
use crate::subscription::StripeSubscription;
use crate::webhook::{parse_event, verify_signature, SIGNATURE_TOLERANCE_SECS};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use starter_core::{
    CheckoutMode, CheckoutRequest, CheckoutSession, PaymentStrategy, StarterError, StarterResult,
    Subscription, SubscriptionRequest, WebhookEvent,
};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

pub(crate) const PROVIDER: &str = "stripe";

/// Stripe Checkout Session strategy
///
/// Uses Stripe's hosted checkout page for secure payments.
pub struct StripeCheckoutStrategy {
    pub(crate) config: StripeConfig,
    pub(crate) client: Client,
}

impl StripeCheckoutStrategy {
    /// Create a new Stripe checkout strategy
    pub fn new(config: StripeConfig) -> StarterResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StarterError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> StarterResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/v1{}", self.config.api_base_url, path)
    }

    /// Attach auth and version headers
    pub(crate) fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.config.secret_key)
            .header("Stripe-Version", &self.config.api_version)
    }

    /// Send a request and return the body of a 2xx response
    pub(crate) async fn send(&self, request: RequestBuilder) -> StarterResult<String> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| StarterError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StarterError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            // Parse Stripe error
            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(StarterError::provider(
                    PROVIDER,
                    Some(status.as_u16()),
                    error_response.error.message,
                ));
            }

            return Err(StarterError::provider(
                PROVIDER,
                Some(status.as_u16()),
                format!("HTTP {}", status.as_u16()),
            ));
        }

        Ok(body)
    }

    /// Form fields for a one-time payment session
    fn payment_params(request: &CheckoutRequest) -> Vec<(String, String)> {
        let item = request.line_item();

        vec![
            ("mode".to_string(), request.mode().as_str().to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                item.currency.as_str().to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                item.unit_amount.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                item.name,
            ),
            ("line_items[0][quantity]".to_string(), item.quantity.to_string()),
        ]
    }

    /// Form fields for a subscription session
    fn subscription_params(request: &SubscriptionRequest) -> Vec<(String, String)> {
        let mut params = vec![
            (
                "mode".to_string(),
                CheckoutMode::Subscription.as_str().to_string(),
            ),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("line_items[0][price]".to_string(), request.price_id.clone()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
        ];

        if let Some(email) = &request.customer_email {
            params.push(("customer_email".to_string(), email.clone()));
        }

        params
    }

    async fn create_session(
        &self,
        mode: CheckoutMode,
        form_params: Vec<(String, String)>,
    ) -> StarterResult<CheckoutSession> {
        debug!("Creating Stripe checkout session: mode={}", mode.as_str());

        let request = self
            .client
            .post(self.api_url("/checkout/sessions"))
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .form(&form_params);

        let body = self.send(request).await?;

        let session_response: StripeCheckoutSessionResponse = serde_json::from_str(&body)
            .map_err(|e| {
                StarterError::Serialization(format!("Failed to parse Stripe response: {}", e))
            })?;

        let checkout_url = session_response.url.ok_or_else(|| {
            StarterError::Serialization(format!(
                "Checkout session {} has no url",
                session_response.id
            ))
        })?;

        info!("Created Stripe checkout session: id={}", session_response.id);

        Ok(CheckoutSession {
            session_id: session_response.id,
            provider: PROVIDER.to_string(),
            checkout_url,
            mode,
            expires_at: session_response
                .expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            created_at: Utc::now(),
        })
    }
}

#[async_trait]
impl PaymentStrategy for StripeCheckoutStrategy {
    #[instrument(skip(self, request), fields(amount = request.price_in_cents))]
    async fn create_checkout(&self, request: &CheckoutRequest) -> StarterResult<CheckoutSession> {
        self.create_session(request.mode(), Self::payment_params(request))
            .await
    }

    #[instrument(skip(self, request), fields(price_id = %request.price_id))]
    async fn create_subscription_checkout(
        &self,
        request: &SubscriptionRequest,
    ) -> StarterResult<CheckoutSession> {
        self.create_session(CheckoutMode::Subscription, Self::subscription_params(request))
            .await
    }

    #[instrument(skip(self))]
    async fn get_subscription(&self, subscription_id: &str) -> StarterResult<Subscription> {
        let request = self
            .client
            .get(self.api_url(&format!("/subscriptions/{}", subscription_id)));
        let body = self.send(request).await?;
        StripeSubscription::parse(&body).map(Into::into)
    }

    #[instrument(skip(self))]
    async fn cancel_subscription(&self, subscription_id: &str) -> StarterResult<Subscription> {
        let request = self
            .client
            .delete(self.api_url(&format!("/subscriptions/{}", subscription_id)));
        let body = self.send(request).await?;
        let subscription: Subscription = StripeSubscription::parse(&body)?.into();
        info!("Cancelled subscription: id={}, status={}", subscription.id, subscription.status);
        Ok(subscription)
    }

    #[instrument(skip(self, payload, signature))]
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> StarterResult<WebhookEvent> {
        verify_signature(
            &self.config.webhook_secret,
            payload,
            signature,
            Utc::now().timestamp(),
            SIGNATURE_TOLERANCE_SECS,
        )?;
        parse_event(payload)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
