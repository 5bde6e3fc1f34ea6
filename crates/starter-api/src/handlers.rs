//! # Request Handlers
//!
//! Axum handlers for pages, auth form actions, checkout and webhooks.
//! Input validation happens here; the provider clients never see bad input.

use crate::error::{ApiError, INVALID_REQUEST_BODY, MISSING_REQUIRED_FIELDS};
use crate::pages::{self, AuthForm};
use crate::session::Session;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use starter_core::{
    initiate_checkout, initiate_subscription, CheckoutRequest, CheckoutResult, Credentials,
    StarterError, SubscriptionRequest,
};
use starter_stripe::{dispatch_webhook_event, LoggingWebhookHandler};
use std::collections::HashMap;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request Types
// =============================================================================

/// Body of `POST /api/create-checkout`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutBody {
    #[serde(default)]
    pub price_in_cents: Option<i64>,
    #[serde(default)]
    pub product_name: Option<String>,
}

impl CreateCheckoutBody {
    /// Positive price and non-blank name, or a validation error
    fn validate(self) -> Result<(i64, String), ApiError> {
        match (self.price_in_cents, self.product_name) {
            (Some(price), Some(name)) if price > 0 && !name.trim().is_empty() => Ok((price, name)),
            _ => Err(ApiError::bad_request(MISSING_REQUIRED_FIELDS)),
        }
    }
}

/// Body of `POST /api/create-subscription`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionBody {
    #[serde(default)]
    pub price_id: String,
}

fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!("Rejected request body: {}", e);
        ApiError::bad_request(INVALID_REQUEST_BODY)
    })
}

// =============================================================================
// Pages
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "saas-starter",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn home(mut session: Session) -> Response {
    let user = session.current_user().await;
    session.respond(pages::home(user.as_ref()))
}

/// Gated page: anonymous visitors are sent to the login form
pub async fn dashboard(mut session: Session) -> Response {
    match session.current_user().await {
        Some(user) => session.respond(pages::dashboard(&user)),
        None => session.respond(Redirect::to("/auth/login")),
    }
}

pub async fn payment_page(State(state): State<AppState>) -> impl IntoResponse {
    pages::payment(state.publishable_key.as_deref())
}

/// Checkout success page
pub async fn checkout_success(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    pages::success(params.get("session_id").map(String::as_str))
}

/// Checkout cancel page
pub async fn checkout_cancel() -> impl IntoResponse {
    pages::cancel()
}

// =============================================================================
// Auth Actions
// =============================================================================

pub async fn signup_page() -> impl IntoResponse {
    pages::auth_form(AuthForm::SignUp, None, "")
}

pub async fn login_page() -> impl IntoResponse {
    pages::auth_form(AuthForm::Login, None, "")
}

/// Validation failures re-render with 400, provider rejections with 401
fn auth_failure(form: AuthForm, err: &StarterError, email: &str) -> Response {
    let status = match err {
        StarterError::Provider { .. } => StatusCode::UNAUTHORIZED,
        other => StatusCode::from_u16(other.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    };
    (status, pages::auth_form(form, Some(&err.public_message()), email)).into_response()
}

#[instrument(skip_all)]
pub async fn sign_up(mut session: Session, Form(credentials): Form<Credentials>) -> Response {
    match session.sign_up(&credentials).await {
        Ok(()) => {
            info!("Signed up");
            session.respond(Redirect::to("/dashboard"))
        }
        Err(e) => {
            if !e.is_validation() {
                warn!("Sign-up rejected: {}", e);
            }
            auth_failure(AuthForm::SignUp, &e, &credentials.email)
        }
    }
}

#[instrument(skip_all)]
pub async fn sign_in(mut session: Session, Form(credentials): Form<Credentials>) -> Response {
    match session.sign_in(&credentials).await {
        Ok(()) => {
            info!("Signed in");
            session.respond(Redirect::to("/dashboard"))
        }
        Err(e) => {
            if !e.is_validation() {
                warn!("Sign-in rejected: {}", e);
            }
            auth_failure(AuthForm::Login, &e, &credentials.email)
        }
    }
}

/// Always clears the session cookie, whatever the provider says
pub async fn sign_out(mut session: Session) -> Response {
    session.sign_out().await;
    session.respond(Redirect::to("/"))
}

// =============================================================================
// API
// =============================================================================

/// Start a one-time payment for a single product
#[instrument(skip(state, body))]
pub async fn create_checkout(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CheckoutResult>, ApiError> {
    let (price_in_cents, product_name) = parse_json::<CreateCheckoutBody>(&body)?.validate()?;

    let request = CheckoutRequest::new(
        price_in_cents,
        product_name,
        state.success_url(),
        state.cancel_url(),
    );

    info!(
        "Creating checkout: product={}, amount={}",
        request.product_name,
        request.line_item().currency.display_amount(price_in_cents)
    );

    match initiate_checkout(state.payments.as_ref(), &request).await {
        CheckoutResult::Error(message) => {
            Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message))
        }
        result => Ok(Json(result)),
    }
}

/// Start a subscription for a provider price, prefilled with the signed-in email
#[instrument(skip(state, session, body))]
pub async fn create_subscription(
    State(state): State<AppState>,
    mut session: Session,
    body: Bytes,
) -> Response {
    let body = match parse_json::<CreateSubscriptionBody>(&body) {
        Ok(body) if body.price_id.trim().is_empty() => {
            return ApiError::bad_request(MISSING_REQUIRED_FIELDS).into_response()
        }
        Ok(body) => body,
        Err(e) => return e.into_response(),
    };

    // May rotate the session; every response below must carry the new cookie
    let customer_email = session.current_user().await.and_then(|user| user.email);

    let request = SubscriptionRequest {
        price_id: body.price_id,
        customer_email,
        success_url: state.success_url(),
        cancel_url: state.cancel_url(),
    };

    match initiate_subscription(state.payments.as_ref(), &request).await {
        CheckoutResult::Error(message) => {
            session.respond(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message))
        }
        result => session.respond(Json(result)),
    }
}

/// Handle Stripe webhook
#[instrument(skip(state, headers, body))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("Missing Stripe-Signature header"))?;

    let event = state
        .payments
        .verify_webhook(&body, signature)
        .await
        .map_err(|e| {
            warn!("Webhook rejected: {}", e);
            match e {
                StarterError::WebhookVerification(_) => ApiError::from(e),
                _ => ApiError::bad_request(INVALID_REQUEST_BODY),
            }
        })?;

    info!(
        "Received webhook: type={:?}, id={}",
        event.event_type, event.event_id
    );

    // Stripe redelivers on 5xx; a malformed event never becomes processable
    dispatch_webhook_event(&LoggingWebhookHandler, event).map_err(|e| {
        error!("Webhook handler error: {}", e);
        ApiError::bad_request(INVALID_REQUEST_BODY)
    })?;

    Ok(Json(serde_json::json!({ "received": true })))
}
