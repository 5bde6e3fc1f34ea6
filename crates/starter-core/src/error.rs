//! # Error Types
//!
//! Typed error handling shared by every layer of the starter.
//! All provider and validation paths return `Result<T, StarterError>`.

use thiserror::Error;

/// Generic body returned to clients when an error must not be shown verbatim.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Core error type for auth, checkout and webhook operations
#[derive(Debug, Error)]
pub enum StarterError {
    /// Missing or malformed user input, shown to the user as-is
    #[error("{0}")]
    Validation(String),

    /// No session cookie present; callers treat this as "logged out"
    #[error("Auth session missing!")]
    SessionMissing,

    /// Provider answered and rejected the request
    #[error("Provider error [{provider}]: {message}")]
    Provider {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    /// Network/HTTP error communicating with a provider
    #[error("Network error: {0}")]
    Network(String),

    /// Provider response could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Webhook signature or timestamp check failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerification(String),

    /// Missing keys, malformed URLs
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StarterError {
    /// Build a provider rejection
    pub fn provider(
        provider: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        StarterError::Provider {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StarterError::Validation(_) => 400,
            StarterError::SessionMissing => 401,
            StarterError::Provider { status, .. } => match status {
                Some(code) if (400..500).contains(code) => *code,
                _ => 502,
            },
            StarterError::Network(_) => 503,
            StarterError::Serialization(_) => 502,
            StarterError::WebhookVerification(_) => 400,
            StarterError::Configuration(_) => 500,
            StarterError::Internal(_) => 500,
        }
    }

    /// Message safe to put in a response body.
    ///
    /// Validation messages and provider rejections are forwarded; transport,
    /// decoding and configuration details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            StarterError::Validation(message) => message.clone(),
            StarterError::SessionMissing => "Not signed in".to_string(),
            StarterError::Provider { message, .. } => message.clone(),
            StarterError::Network(_) | StarterError::Serialization(_) => {
                "Provider unavailable, please try again".to_string()
            }
            StarterError::WebhookVerification(_) => {
                "Webhook signature verification failed".to_string()
            }
            StarterError::Configuration(_) | StarterError::Internal(_) => {
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        }
    }

    /// True for input problems the user can fix by resubmitting
    pub fn is_validation(&self) -> bool {
        matches!(self, StarterError::Validation(_))
    }
}

/// Result type alias for starter operations
pub type StarterResult<T> = Result<T, StarterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(StarterError::Validation("x".into()).status_code(), 400);
        assert_eq!(
            StarterError::provider("supabase", Some(400), "Invalid login credentials").status_code(),
            400
        );
        assert_eq!(
            StarterError::provider("stripe", Some(500), "boom").status_code(),
            502
        );
        assert_eq!(StarterError::provider("stripe", None, "boom").status_code(), 502);
        assert_eq!(StarterError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_public_message_hides_transport_detail() {
        let err = StarterError::Network("connect to 10.0.0.3:443 refused".into());
        assert!(!err.public_message().contains("10.0.0.3"));

        let err = StarterError::Configuration("STRIPE_SECRET_KEY not set".into());
        assert_eq!(err.public_message(), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_public_message_forwards_user_facing_text() {
        let err = StarterError::Validation("Please fill in all fields".into());
        assert_eq!(err.public_message(), "Please fill in all fields");

        let err = StarterError::provider("supabase", Some(400), "User already registered");
        assert_eq!(err.public_message(), "User already registered");
    }

    #[test]
    fn test_session_missing_display() {
        assert_eq!(StarterError::SessionMissing.to_string(), "Auth session missing!");
    }
}
