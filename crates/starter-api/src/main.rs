//! # SaaS Starter
//!
//! Auth and payments starter server.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export SUPABASE_URL=https://<project-ref>.supabase.co
//! export SUPABASE_ANON_KEY=eyJ...
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//!
//! # Run the server
//! saas-starter
//! ```

use starter_api::{routes, AppConfig, AppState, LogFormat};
use starter_stripe::REQUIRED_WEBHOOK_EVENTS;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    init_tracing(config.log_format);

    // Print banner
    print_banner();

    // Initialize application state
    let state = AppState::new(config)?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!(
        "Providers: auth={}, payments={}",
        state.auth.provider_name(),
        state.payments.provider_name()
    );

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("🚀 SaaS Starter listening on http://{}", addr);

    if !is_prod {
        info!("🔐 Login: http://{}/auth/login", addr);
        info!("💳 Checkout: POST http://{}/api/create-checkout", addr);
        info!("🔔 Webhook: POST http://{}/api/webhook", addr);
        info!("   Events: {}", REQUIRED_WEBHOOK_EVENTS.join(", "));
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

fn print_banner() {
    println!(
        r#"
  SaaS Starter
  ━━━━━━━━━━━━━━━━━━━━━━━
  Supabase auth + Stripe payments
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
