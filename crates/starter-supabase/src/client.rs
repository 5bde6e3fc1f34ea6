//! # Supabase Auth Client
//!
//! `AuthProvider` implementation over the GoTrue REST API.
//! Password hashing, user storage and token minting all happen provider-side.

use crate::config::SupabaseConfig;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use starter_core::{AuthProvider, AuthSession, Credentials, StarterError, StarterResult, User};
use tracing::{debug, instrument, warn};

const PROVIDER: &str = "supabase";

/// Supabase (GoTrue) auth client
pub struct SupabaseAuthClient {
    config: SupabaseConfig,
    client: Client,
}

impl SupabaseAuthClient {
    /// Create a new client
    pub fn new(config: SupabaseConfig) -> StarterResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StarterError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> StarterResult<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(self.config.auth_url(path))
            .header("apikey", &self.config.anon_key)
    }

    /// Send a request and return the body of a 2xx response
    async fn send(&self, request: RequestBuilder) -> StarterResult<String> {
        let response = request
            .send()
            .await
            .map_err(|e| StarterError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StarterError::Network(e.to_string()))?;

        if !status.is_success() {
            debug!("Supabase API error: status={}, body={}", status, body);
            let message = serde_json::from_str::<GoTrueError>(&body)
                .ok()
                .and_then(GoTrueError::into_message)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(StarterError::provider(PROVIDER, Some(status.as_u16()), message));
        }

        Ok(body)
    }

    fn parse_session(body: &str) -> StarterResult<AuthSession> {
        serde_json::from_str::<GoTrueSession>(body)
            .map(GoTrueSession::into_session)
            .map_err(|e| StarterError::Serialization(format!("Failed to parse session: {}", e)))
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthClient {
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn sign_up(&self, credentials: &Credentials) -> StarterResult<Option<AuthSession>> {
        let body = self
            .send(self.post("/signup").json(&json!({
                "email": credentials.email,
                "password": credentials.password,
            })))
            .await?;

        // With email confirmation enabled the provider returns a bare user
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| StarterError::Serialization(e.to_string()))?;
        if value.get("access_token").is_some() {
            Ok(Some(Self::parse_session(&body)?))
        } else {
            debug!("Sign-up pending email confirmation");
            Ok(None)
        }
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn sign_in_with_password(&self, credentials: &Credentials) -> StarterResult<AuthSession> {
        let body = self
            .send(
                self.post("/token")
                    .query(&[("grant_type", "password")])
                    .json(&json!({
                        "email": credentials.email,
                        "password": credentials.password,
                    })),
            )
            .await?;
        Self::parse_session(&body)
    }

    #[instrument(skip_all)]
    async fn refresh_session(&self, refresh_token: &str) -> StarterResult<AuthSession> {
        let body = self
            .send(
                self.post("/token")
                    .query(&[("grant_type", "refresh_token")])
                    .json(&json!({ "refresh_token": refresh_token })),
            )
            .await?;
        Self::parse_session(&body)
    }

    #[instrument(skip_all)]
    async fn get_user(&self, access_token: &str) -> StarterResult<User> {
        let body = self
            .send(
                self.client
                    .get(self.config.auth_url("/user"))
                    .header("apikey", &self.config.anon_key)
                    .bearer_auth(access_token),
            )
            .await?;
        serde_json::from_str(&body)
            .map_err(|e| StarterError::Serialization(format!("Failed to parse user: {}", e)))
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> StarterResult<()> {
        let result = self
            .send(
                self.post("/logout")
                    .query(&[("scope", "global")])
                    .bearer_auth(access_token),
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            // Session already gone provider-side
            Err(StarterError::Provider {
                status: Some(401 | 403 | 404),
                ..
            }) => {
                warn!("Sign-out for an unknown or expired session");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// GoTrue API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct GoTrueSession {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    user: Option<User>,
}

impl GoTrueSession {
    fn into_session(self) -> AuthSession {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| Utc::now().timestamp() + secs));

        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
            user: self.user,
        }
    }
}

/// Error bodies differ between GoTrue versions
#[derive(Debug, Deserialize)]
struct GoTrueError {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl GoTrueError {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.error_description)
            .or(self.message)
            .or(self.error)
    }
}
