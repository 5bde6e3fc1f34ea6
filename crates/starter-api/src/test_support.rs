//! In-memory providers for handler tests.

use crate::state::{AppConfig, AppState};
use async_trait::async_trait;
use chrono::Utc;
use starter_core::{
    AuthProvider, AuthSession, CheckoutMode, CheckoutRequest, CheckoutSession, Credentials,
    PaymentStrategy, StarterError, StarterResult, Subscription, SubscriptionRequest, User,
    WebhookEvent, WebhookEventType,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const COOKIE_NAME: &str = "sb-test-auth-token";
pub const VALID_PASSWORD: &str = "correct-horse";

const ACCESS_TOKEN: &str = "access-ada";
const REFRESH_TOKEN: &str = "refresh-ada";

pub fn user() -> User {
    User {
        id: "user-ada".to_string(),
        email: Some("ada@example.com".to_string()),
        created_at: None,
        last_sign_in_at: None,
    }
}

pub fn session() -> AuthSession {
    AuthSession {
        access_token: ACCESS_TOKEN.to_string(),
        refresh_token: REFRESH_TOKEN.to_string(),
        expires_at: Some(Utc::now().timestamp() + 3600),
        token_type: "bearer".to_string(),
        user: Some(user()),
    }
}

pub fn test_state(auth: Arc<FakeAuth>, payments: Arc<FakePayments>) -> AppState {
    AppState::with_providers(AppConfig::default(), auth, payments, COOKIE_NAME)
}

/// `name=value` for a cookie holding a live session
pub fn session_cookie_header(state: &AppState) -> String {
    let cookie = state.session_cookie.encode(&session()).unwrap();
    format!("{}={}", cookie.name(), cookie.value())
}

/// `name=value` for a cookie whose access token has expired but can be refreshed
pub fn expired_session_cookie_header(state: &AppState) -> String {
    let expired = AuthSession {
        access_token: "access-stale".to_string(),
        expires_at: Some(Utc::now().timestamp() - 60),
        ..session()
    };
    let cookie = state.session_cookie.encode(&expired).unwrap();
    format!("{}={}", cookie.name(), cookie.value())
}

/// Accepts [`VALID_PASSWORD`] for any email and knows one user
#[derive(Default)]
pub struct FakeAuth {
    calls: AtomicUsize,
    sign_outs: AtomicUsize,
    fail_sign_out: bool,
}

impl FakeAuth {
    pub fn failing_sign_out() -> Self {
        Self {
            fail_sign_out: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn sign_up(&self, _credentials: &Credentials) -> StarterResult<Option<AuthSession>> {
        self.hit();
        Ok(Some(session()))
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> StarterResult<AuthSession> {
        self.hit();
        if credentials.password == VALID_PASSWORD {
            Ok(session())
        } else {
            Err(StarterError::provider(
                "supabase",
                Some(400),
                "Invalid login credentials",
            ))
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> StarterResult<AuthSession> {
        self.hit();
        if refresh_token == REFRESH_TOKEN {
            Ok(session())
        } else {
            Err(StarterError::provider("supabase", Some(400), "Invalid Refresh Token"))
        }
    }

    async fn get_user(&self, access_token: &str) -> StarterResult<User> {
        self.hit();
        if access_token == ACCESS_TOKEN {
            Ok(user())
        } else {
            Err(StarterError::provider("supabase", Some(401), "invalid JWT"))
        }
    }

    async fn sign_out(&self, _access_token: &str) -> StarterResult<()> {
        self.hit();
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out {
            Err(StarterError::Network("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake-auth"
    }
}

/// Records requests; verifies webhooks whose signature is the literal `valid`.
/// The signature `no-object-id` yields a checkout event missing its session id.
#[derive(Default)]
pub struct FakePayments {
    calls: AtomicUsize,
    fail: bool,
    last_checkout: Mutex<Option<CheckoutRequest>>,
    last_subscription: Mutex<Option<SubscriptionRequest>>,
}

impl FakePayments {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Number of checkout sessions requested
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_checkout(&self) -> Option<CheckoutRequest> {
        self.last_checkout.lock().unwrap().clone()
    }

    pub fn last_subscription(&self) -> Option<SubscriptionRequest> {
        self.last_subscription.lock().unwrap().clone()
    }

    fn session(&self, mode: CheckoutMode) -> StarterResult<CheckoutSession> {
        if self.fail {
            return Err(StarterError::provider(
                "stripe",
                Some(401),
                "Invalid API Key provided",
            ));
        }
        Ok(CheckoutSession {
            session_id: "cs_test_1".to_string(),
            provider: "fake".to_string(),
            checkout_url: "https://checkout.stripe.com/c/pay/cs_test_1".to_string(),
            mode,
            expires_at: None,
            created_at: Utc::now(),
        })
    }

    fn subscription(id: &str, status: &str) -> Subscription {
        Subscription {
            id: id.to_string(),
            status: status.to_string(),
            customer: None,
            cancel_at_period_end: false,
            current_period_end: None,
        }
    }
}

#[async_trait]
impl PaymentStrategy for FakePayments {
    async fn create_checkout(&self, request: &CheckoutRequest) -> StarterResult<CheckoutSession> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_checkout.lock().unwrap() = Some(request.clone());
        self.session(CheckoutMode::Payment)
    }

    async fn create_subscription_checkout(
        &self,
        request: &SubscriptionRequest,
    ) -> StarterResult<CheckoutSession> {
        *self.last_subscription.lock().unwrap() = Some(request.clone());
        self.session(CheckoutMode::Subscription)
    }

    async fn get_subscription(&self, subscription_id: &str) -> StarterResult<Subscription> {
        Ok(Self::subscription(subscription_id, "active"))
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> StarterResult<Subscription> {
        Ok(Self::subscription(subscription_id, "canceled"))
    }

    async fn verify_webhook(&self, _payload: &[u8], signature: &str) -> StarterResult<WebhookEvent> {
        let raw_data = match signature {
            "valid" => serde_json::json!({ "id": "cs_test_1", "payment_status": "paid" }),
            "no-object-id" => serde_json::json!({ "payment_status": "paid" }),
            _ => {
                return Err(StarterError::WebhookVerification(
                    "Signature mismatch".to_string(),
                ))
            }
        };
        Ok(WebhookEvent {
            event_id: "evt_test".to_string(),
            event_type: WebhookEventType::CheckoutCompleted,
            provider: "fake".to_string(),
            session_id: Some("cs_test_1".to_string()),
            payment_intent_id: None,
            customer_email: Some("ada@example.com".to_string()),
            amount_paid: Some(1000),
            raw_data: Some(raw_data),
            timestamp: Utc::now(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
