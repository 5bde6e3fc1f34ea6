//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the provider clients, redirect URLs and the session cookie codec.

use anyhow::Context;
use starter_core::{BoxedAuthProvider, BoxedPaymentStrategy, CheckoutUrls};
use starter_stripe::StripeCheckoutStrategy;
use starter_supabase::{CookieJar, SessionBridge, SessionCookie, SupabaseAuthClient};
use std::net::SocketAddr;
use std::sync::Arc;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, used for provider redirects
    pub app_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            app_url: std::env::var("APP_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_format: std::env::var("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            app_url: "http://localhost:3000".to_string(),
            environment: "development".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Authentication provider
    pub auth: BoxedAuthProvider,
    /// Payment provider
    pub payments: BoxedPaymentStrategy,
    /// Checkout redirect URLs
    pub urls: CheckoutUrls,
    /// Session cookie codec
    pub session_cookie: SessionCookie,
    /// Publishable key exposed to the payment page
    pub publishable_key: Option<String>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Build the Supabase and Stripe clients from the environment
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let auth = SupabaseAuthClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Supabase: {}", e))?;
        let cookie_name = auth.config().session_cookie_name();

        let stripe = StripeCheckoutStrategy::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;
        let publishable_key = stripe.config().publishable_key.clone();

        let mut state = Self::with_providers(
            config,
            Arc::new(auth) as BoxedAuthProvider,
            Arc::new(stripe) as BoxedPaymentStrategy,
            cookie_name,
        );
        state.publishable_key = publishable_key;
        Ok(state)
    }

    /// Assemble state around already-built providers
    pub fn with_providers(
        config: AppConfig,
        auth: BoxedAuthProvider,
        payments: BoxedPaymentStrategy,
        cookie_name: impl Into<String>,
    ) -> Self {
        let urls = CheckoutUrls::new(&config.app_url);
        let session_cookie = SessionCookie::new(cookie_name, urls.is_https());

        Self {
            auth,
            payments,
            urls,
            session_cookie,
            publishable_key: None,
            config,
        }
    }

    /// Session bridge over one request's cookies
    pub fn session_bridge(&self, jar: CookieJar) -> SessionBridge {
        SessionBridge::new(self.auth.clone(), self.session_cookie.clone(), jar)
    }

    /// Success URL with the provider's session ID placeholder
    pub fn success_url(&self) -> String {
        format!("{}?session_id={{CHECKOUT_SESSION_ID}}", self.urls.success_url())
    }

    pub fn cancel_url(&self) -> String {
        self.urls.cancel_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeAuth, FakePayments};

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Pretty);
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            ..AppConfig::default()
        };

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_invalid_socket_addr() {
        let config = AppConfig {
            host: "not a host".to_string(),
            ..AppConfig::default()
        };

        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_redirect_urls() {
        let config = AppConfig {
            app_url: "https://app.example.com/".to_string(),
            ..AppConfig::default()
        };
        let state = AppState::with_providers(
            config,
            Arc::new(FakeAuth::default()),
            Arc::new(FakePayments::default()),
            "sb-test-auth-token",
        );

        assert_eq!(
            state.success_url(),
            "https://app.example.com/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(state.cancel_url(), "https://app.example.com/cancel");
        assert_eq!(state.session_cookie.name(), "sb-test-auth-token");
    }
}
