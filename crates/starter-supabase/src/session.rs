//! # Session Bridge
//!
//! Binds the auth provider to one request's cookie jar. Handlers build a
//! bridge per request, call the auth operations, then copy
//! [`SessionBridge::set_cookie_headers`] onto the response.

use crate::session_cookie::SessionCookie;
use cookie::{Cookie, CookieJar};
use starter_core::{
    AuthSession, BoxedAuthProvider, Credentials, StarterError, StarterResult, User,
};
use tracing::{debug, error, info, instrument, warn};

/// Build a jar from raw `Cookie` request header values.
///
/// Unparseable pairs are skipped.
pub fn jar_from_cookie_headers<'a>(values: impl IntoIterator<Item = &'a str>) -> CookieJar {
    let mut jar = CookieJar::new();
    for header in values {
        for cookie in Cookie::split_parse(header).flatten() {
            jar.add_original(cookie.into_owned());
        }
    }
    jar
}

/// Request-scoped auth operations over a cookie jar
pub struct SessionBridge {
    provider: BoxedAuthProvider,
    cookie: SessionCookie,
    jar: CookieJar,
}

impl SessionBridge {
    pub fn new(provider: BoxedAuthProvider, cookie: SessionCookie, jar: CookieJar) -> Self {
        Self {
            provider,
            cookie,
            jar,
        }
    }

    /// Register and, when the provider issues one, store the new session.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn sign_up(&mut self, credentials: &Credentials) -> StarterResult<()> {
        credentials.validate_for_sign_up()?;

        match self.provider.sign_up(credentials).await? {
            Some(session) => self.store(&session)?,
            None => info!("Sign-up accepted, awaiting email confirmation"),
        }
        Ok(())
    }

    /// Exchange credentials for a session and store it.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn sign_in(&mut self, credentials: &Credentials) -> StarterResult<()> {
        credentials.validate_present()?;

        let session = self.provider.sign_in_with_password(credentials).await?;
        self.store(&session)
    }

    /// Revoke the provider session if there is one and always clear the cookie.
    #[instrument(skip(self))]
    pub async fn sign_out(&mut self) {
        if let Ok(session) = self.stored_session() {
            if let Err(e) = self.provider.sign_out(&session.access_token).await {
                warn!("Provider sign-out failed: {}", e);
            }
        }
        self.clear();
    }

    /// Resolve the session cookie to a user.
    ///
    /// Every failure reads as "logged out"; only unexpected ones are logged as errors.
    #[instrument(skip(self))]
    pub async fn current_user(&mut self) -> Option<User> {
        let session = match self.stored_session() {
            Ok(session) => session,
            Err(StarterError::SessionMissing) => {
                debug!("No session cookie");
                return None;
            }
            Err(e) => {
                warn!("Discarding unreadable session cookie: {}", e);
                self.clear();
                return None;
            }
        };

        let session = if session.is_expired() {
            match self.refresh(&session).await {
                Some(fresh) => fresh,
                None => return None,
            }
        } else {
            session
        };

        match self.provider.get_user(&session.access_token).await {
            Ok(user) => Some(user),
            Err(StarterError::SessionMissing) => None,
            Err(e) => {
                error!("Error getting current user: {}", e);
                None
            }
        }
    }

    /// Whether the request carries a resolvable session
    pub async fn is_authenticated(&mut self) -> bool {
        self.current_user().await.is_some()
    }

    /// `Set-Cookie` values for every cookie changed during this request
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.jar.delta().map(|c| c.to_string()).collect()
    }

    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }

    async fn refresh(&mut self, session: &AuthSession) -> Option<AuthSession> {
        match self.provider.refresh_session(&session.refresh_token).await {
            Ok(fresh) => {
                debug!("Refreshed expired session");
                if let Err(e) = self.store(&fresh) {
                    error!("Failed to store refreshed session: {}", e);
                }
                Some(fresh)
            }
            Err(e) => {
                // Only a provider rejection invalidates the refresh token
                if matches!(
                    e,
                    StarterError::Provider {
                        status: Some(400..=499),
                        ..
                    }
                ) {
                    self.clear();
                }
                warn!("Session refresh failed: {}", e);
                None
            }
        }
    }

    fn stored_session(&self) -> StarterResult<AuthSession> {
        let cookie = self
            .jar
            .get(self.cookie.name())
            .filter(|c| !c.value().is_empty())
            .ok_or(StarterError::SessionMissing)?;
        SessionCookie::decode(cookie.value())
    }

    fn store(&mut self, session: &AuthSession) -> StarterResult<()> {
        let cookie = self.cookie.encode(session)?;
        self.jar.add(cookie);
        Ok(())
    }

    fn clear(&mut self) {
        self.jar.add(self.cookie.removal());
    }
}
