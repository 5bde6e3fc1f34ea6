//! # Request Session
//!
//! Extractor that hands each handler a [`SessionBridge`] over the
//! request's cookies, and writes the bridge's cookie changes back out.

use crate::state::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue},
    response::{IntoResponse, Response},
};
use starter_supabase::{jar_from_cookie_headers, SessionBridge};
use std::convert::Infallible;
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// Per-request session bridge
pub struct Session(SessionBridge);

impl Session {
    /// Attach every cookie change made during this request to `response`
    pub fn respond(&self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        for value in self.0.set_cookie_headers() {
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(e) => warn!("Dropping unencodable Set-Cookie header: {}", e),
            }
        }
        response
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = jar_from_cookie_headers(
            parts
                .headers
                .get_all(header::COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok()),
        );
        Ok(Session(state.session_bridge(jar)))
    }
}

impl Deref for Session {
    type Target = SessionBridge;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
