//! # starter-supabase
//!
//! Supabase authentication for saas-starter-rs.
//!
//! - **SupabaseAuthClient** - `AuthProvider` over the GoTrue REST API
//! - **SessionCookie** - session <-> cookie codec
//! - **SessionBridge** - per-request sign-up / sign-in / sign-out / current user
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use starter_supabase::{jar_from_cookie_headers, SessionBridge, SessionCookie, SupabaseAuthClient};
//!
//! let client = Arc::new(SupabaseAuthClient::from_env()?);
//! let cookie = SessionCookie::new(client.config().session_cookie_name(), true);
//!
//! // Per request:
//! let mut bridge = SessionBridge::new(client.clone(), cookie.clone(), jar_from_cookie_headers(raw_cookie_headers));
//! let user = bridge.current_user().await;
//! // copy bridge.set_cookie_headers() onto the response
//! ```

pub mod client;
pub mod config;
pub mod session;
pub mod session_cookie;

// Re-exports
pub use client::SupabaseAuthClient;
pub use config::SupabaseConfig;
pub use session::{jar_from_cookie_headers, SessionBridge};
pub use session_cookie::SessionCookie;

pub use cookie::CookieJar;
