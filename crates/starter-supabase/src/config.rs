//! # Supabase Configuration
//!
//! Project URL and anon key, loaded from environment variables.

use reqwest::Url;
use starter_core::StarterError;
use std::env;

/// Supabase project configuration
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL (https://<ref>.supabase.co)
    pub url: String,

    /// Public anon key, sent as `apikey` on every request
    pub anon_key: String,

    /// Seconds before a provider call is abandoned
    pub timeout_secs: u64,
}

impl SupabaseConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `SUPABASE_URL`
    /// - `SUPABASE_ANON_KEY`
    pub fn from_env() -> Result<Self, StarterError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, StarterError> {
        let url = var("SUPABASE_URL")
            .ok_or_else(|| StarterError::Configuration("SUPABASE_URL not set".to_string()))?;

        let anon_key = var("SUPABASE_ANON_KEY")
            .ok_or_else(|| StarterError::Configuration("SUPABASE_ANON_KEY not set".to_string()))?;

        let config = Self::new(url, anon_key);
        config.validate()?;
        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            timeout_secs: 30,
        }
    }

    fn validate(&self) -> Result<(), StarterError> {
        let parsed = Url::parse(&self.url).map_err(|e| {
            StarterError::Configuration(format!("SUPABASE_URL is not a valid URL: {}", e))
        })?;
        if parsed.host_str().is_none() {
            return Err(StarterError::Configuration(
                "SUPABASE_URL must include a host".to_string(),
            ));
        }
        if self.anon_key.is_empty() {
            return Err(StarterError::Configuration(
                "SUPABASE_ANON_KEY is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Project ref: first DNS label of the project host
    pub fn project_ref(&self) -> String {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.split('.').next().unwrap_or(h).to_string()))
            .unwrap_or_else(|| "local".to_string())
    }

    /// Name of the cookie holding the session
    pub fn session_cookie_name(&self) -> String {
        format!("sb-{}-auth-token", self.project_ref())
    }

    /// Full URL of a GoTrue endpoint
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }
}
