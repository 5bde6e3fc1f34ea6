//! # Stripe Configuration
//!
//! Configuration management for Stripe integration.
//! All secrets are loaded from environment variables.

use starter_core::StarterError;
use std::env;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Pinned so response shapes (e.g. `current_period_end`) stay put
const DEFAULT_API_VERSION: &str = "2023-10-16";

/// Stripe API configuration
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_...)
    pub secret_key: String,

    /// Publishable key (pk_test_... or pk_live_...), handed to pages only
    pub publishable_key: Option<String>,

    /// Webhook signing secret (whsec_...)
    pub webhook_secret: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,

    /// Seconds before a provider call is abandoned
    pub timeout_secs: u64,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("mode", &if self.is_live_mode() { "live" } else { "test" })
            .field("publishable_key", &self.publishable_key)
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_SECRET_KEY`
    /// - `STRIPE_WEBHOOK_SECRET`
    ///
    /// Optional:
    /// - `STRIPE_PUBLISHABLE_KEY`
    pub fn from_env() -> Result<Self, StarterError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, StarterError> {
        let secret_key = var("STRIPE_SECRET_KEY").ok_or_else(|| {
            StarterError::Configuration("STRIPE_SECRET_KEY not set".to_string())
        })?;

        let webhook_secret = var("STRIPE_WEBHOOK_SECRET").ok_or_else(|| {
            StarterError::Configuration("STRIPE_WEBHOOK_SECRET not set".to_string())
        })?;

        let publishable_key = var("STRIPE_PUBLISHABLE_KEY").filter(|k| !k.is_empty());

        let mut config = Self::new(secret_key, webhook_secret);
        config.publishable_key = publishable_key;
        config.validate()?;
        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(secret_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            publishable_key: None,
            webhook_secret: webhook_secret.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: 30,
        }
    }

    /// Check key prefixes
    pub fn validate(&self) -> Result<(), StarterError> {
        if !self.secret_key.starts_with("sk_test_") && !self.secret_key.starts_with("sk_live_") {
            return Err(StarterError::Configuration(
                "STRIPE_SECRET_KEY must start with sk_test_ or sk_live_".to_string(),
            ));
        }

        if let Some(key) = &self.publishable_key {
            if !key.starts_with("pk_test_") && !key.starts_with("pk_live_") {
                return Err(StarterError::Configuration(
                    "STRIPE_PUBLISHABLE_KEY must start with pk_test_ or pk_live_".to_string(),
                ));
            }
        }

        if !self.webhook_secret.starts_with("whsec_") {
            return Err(StarterError::Configuration(
                "STRIPE_WEBHOOK_SECRET must start with whsec_".to_string(),
            ));
        }

        Ok(())
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    /// Check if using live keys
    pub fn is_live_mode(&self) -> bool {
        self.secret_key.starts_with("sk_live_")
    }

    /// Builder: set publishable key
    pub fn with_publishable_key(mut self, key: impl Into<String>) -> Self {
        self.publishable_key = Some(key.into());
        self
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }
}
