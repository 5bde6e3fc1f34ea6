//! # Authentication Types
//!
//! User/session types and the `AuthProvider` trait implemented by hosted
//! identity providers. The provider owns credential storage and password
//! hashing; this side only moves tokens around.

use crate::error::{StarterError, StarterResult};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Minimum password length accepted on sign-up
pub const MIN_PASSWORD_LEN: usize = 6;

/// Shown when either form field is empty
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields";

/// Shown when the sign-up password is too short
pub const SHORT_PASSWORD_MESSAGE: &str = "Password must be at least 6 characters";

/// A signed-in user as resolved by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Provider user ID
    pub id: String,

    /// Email address (absent for phone-only accounts)
    #[serde(default)]
    pub email: Option<String>,

    /// Account creation timestamp, as reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Last sign-in timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sign_in_at: Option<String>,
}

impl User {
    /// Email or an empty string, for display
    pub fn display_email(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }
}

/// Provider session carried in the session cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) when the access token expires
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// User the session belongs to (not persisted in the cookie)
    #[serde(default, skip_serializing)]
    pub user: Option<User>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl AuthSession {
    /// Access tokens are treated as expired slightly early to avoid racing the provider
    const EXPIRY_MARGIN_SECS: i64 = 10;

    /// Check whether the access token needs a refresh
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => exp - Self::EXPIRY_MARGIN_SECS <= Utc::now().timestamp(),
            None => false,
        }
    }
}

/// Email/password pair submitted by a form
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Field-presence check shared by sign-in and sign-up
    pub fn validate_present(&self) -> StarterResult<()> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(StarterError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        }
        Ok(())
    }

    /// Sign-up rules: fields present and password long enough
    pub fn validate_for_sign_up(&self) -> StarterResult<()> {
        self.validate_present()?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(StarterError::Validation(SHORT_PASSWORD_MESSAGE.to_string()));
        }
        Ok(())
    }
}

/// Core trait for hosted authentication providers.
///
/// Implementations talk to the provider over HTTP. Cookie handling is
/// not part of this trait; see the session bridge in the provider crate.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new account.
    ///
    /// Returns `None` when the provider requires email confirmation before
    /// issuing a session.
    async fn sign_up(&self, credentials: &Credentials) -> StarterResult<Option<AuthSession>>;

    /// Exchange email/password for a session
    async fn sign_in_with_password(&self, credentials: &Credentials) -> StarterResult<AuthSession>;

    /// Exchange a refresh token for a new session
    async fn refresh_session(&self, refresh_token: &str) -> StarterResult<AuthSession>;

    /// Resolve an access token to its user
    async fn get_user(&self, access_token: &str) -> StarterResult<User>;

    /// Revoke the session behind an access token
    async fn sign_out(&self, access_token: &str) -> StarterResult<()>;

    /// Get the provider name (for logging and cookie naming)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared auth provider (dynamic dispatch)
pub type BoxedAuthProvider = Arc<dyn AuthProvider>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields() {
        for creds in [
            Credentials::new("", "secret123"),
            Credentials::new("a@b.co", ""),
            Credentials::default(),
        ] {
            let err = creds.validate_present().unwrap_err();
            assert_eq!(err.to_string(), MISSING_FIELDS_MESSAGE);
        }
    }

    #[test]
    fn test_sign_up_password_length() {
        let err = Credentials::new("a@b.co", "12345")
            .validate_for_sign_up()
            .unwrap_err();
        assert_eq!(err.to_string(), SHORT_PASSWORD_MESSAGE);

        assert!(Credentials::new("a@b.co", "123456").validate_for_sign_up().is_ok());
    }

    #[test]
    fn test_sign_in_does_not_check_length() {
        assert!(Credentials::new("a@b.co", "1").validate_present().is_ok());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("a@b.co", "hunter22");
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("hunter22"));
        assert!(printed.contains("a@b.co"));
    }

    #[test]
    fn test_session_expiry() {
        let mut session = AuthSession {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            expires_at: Some(Utc::now().timestamp() + 3600),
            token_type: "bearer".into(),
            user: None,
        };
        assert!(!session.is_expired());

        session.expires_at = Some(Utc::now().timestamp() - 1);
        assert!(session.is_expired());

        session.expires_at = None;
        assert!(!session.is_expired());
    }

    #[test]
    fn test_session_serialization_drops_user() {
        let session = AuthSession {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            expires_at: Some(1),
            token_type: "bearer".into(),
            user: Some(User {
                id: "u1".into(),
                email: Some("a@b.co".into()),
                created_at: None,
                last_sign_in_at: None,
            }),
        };
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("user").is_none());
        assert_eq!(json["access_token"], "at");
    }
}
