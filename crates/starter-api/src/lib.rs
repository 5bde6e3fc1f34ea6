//! # starter-api
//!
//! HTTP layer for saas-starter-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Cookie-backed sign-up, login and logout against Supabase
//! - Checkout and subscription endpoints backed by Stripe
//! - Webhook intake for payment events
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET/POST | `/auth/signup`, `/auth/login` | Auth forms and actions |
//! | GET | `/auth/logout` | Sign out |
//! | GET | `/dashboard` | Signed-in users only |
//! | POST | `/api/create-checkout` | Create checkout session |
//! | POST | `/api/create-subscription` | Create subscription session |
//! | POST | `/api/webhook` | Stripe webhook |

pub mod error;
pub mod handlers;
pub mod pages;
pub mod routes;
pub mod session;
pub mod state;

#[cfg(test)]
mod test_support;

pub use routes::create_router;
pub use state::{AppConfig, AppState, LogFormat};
