//! # Session Cookie Codec
//!
//! Serializes an [`AuthSession`] into the cookie the browser carries between
//! requests. The value format is `base64-<base64url(JSON)>`, the same layout
//! the Supabase SSR helpers use, so sessions survive a switch between stacks.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use cookie::{time::Duration, Cookie, SameSite};
use starter_core::{AuthSession, StarterError, StarterResult};

const BASE64_PREFIX: &str = "base64-";

/// Browsers cap cookie lifetime at 400 days
const MAX_AGE_DAYS: i64 = 400;

/// Builds and reads the session cookie
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
}

impl SessionCookie {
    /// `secure` should be true whenever the app is served over https
    pub fn new(name: impl Into<String>, secure: bool) -> Self {
        Self {
            name: name.into(),
            secure,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie carrying `session`
    pub fn encode(&self, session: &AuthSession) -> StarterResult<Cookie<'static>> {
        let json = serde_json::to_vec(session)
            .map_err(|e| StarterError::Serialization(format!("Failed to encode session: {}", e)))?;
        let value = format!("{}{}", BASE64_PREFIX, URL_SAFE_NO_PAD.encode(json));

        Ok(Cookie::build((self.name.clone(), value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(Duration::days(MAX_AGE_DAYS))
            .build())
    }

    /// Parse a cookie value back into a session.
    ///
    /// Plain JSON values (no `base64-` prefix) are accepted too.
    pub fn decode(value: &str) -> StarterResult<AuthSession> {
        let json = match value.strip_prefix(BASE64_PREFIX) {
            Some(encoded) => URL_SAFE_NO_PAD.decode(encoded).map_err(|e| {
                StarterError::Serialization(format!("Session cookie is not base64: {}", e))
            })?,
            None => value.as_bytes().to_vec(),
        };

        serde_json::from_slice(&json)
            .map_err(|e| StarterError::Serialization(format!("Session cookie is not a session: {}", e)))
    }

    /// Cookie that makes the browser drop the session
    pub fn removal(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.name.clone(), ""))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build();
        cookie.make_removal();
        cookie
    }
}
