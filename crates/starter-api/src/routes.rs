//! # Routes
//!
//! Axum router configuration for the starter app.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the main application router
///
/// Routes:
/// - Pages:
///   - GET /, /health, /dashboard (gated), /payment, /success, /cancel
///
/// - Auth:
///   - GET/POST /auth/signup - Sign-up form and action
///   - GET/POST /auth/login - Login form and action
///   - GET /auth/logout - Clear the session and go home
///
/// - API:
///   - POST /api/create-checkout - One-time payment session
///   - POST /api/create-subscription - Subscription session
///   - POST /api/webhook - Stripe webhook handler
pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", get(handlers::signup_page).post(handlers::sign_up))
        .route("/login", get(handlers::login_page).post(handlers::sign_in))
        .route("/logout", get(handlers::sign_out));

    let api_routes = Router::new()
        .route("/create-checkout", post(handlers::create_checkout))
        .route("/create-subscription", post(handlers::create_subscription))
        // Raw body, verified against the signature header
        .route("/webhook", post(handlers::stripe_webhook));

    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        .route("/dashboard", get(handlers::dashboard))
        .route("/payment", get(handlers::payment_page))
        .route("/success", get(handlers::checkout_success))
        .route("/cancel", get(handlers::checkout_cancel))
        .nest("/auth", auth_routes)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
