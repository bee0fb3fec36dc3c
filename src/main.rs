//! Inquiry relay server
//!
//! Run with: cargo run
//!
//! Environment variables (a `.env` file is read when present):
//! - HOST: Bind address (default: 0.0.0.0)
//! - PORT: Port number (default: 6666)
//! - APP_NAME: Site name used in subjects and the confirmation mail
//! - MAIL_TO: Site owner address receiving inquiries
//! - CORS_ORIGIN: Allowed browser origin (default: any)
//! - RATE_LIMIT_WINDOW_MINUTES / RATE_LIMIT_MAX: Per-client limit (default: 1 per 5 minutes)
//! - MAIL_HOST, MAIL_PORT, MAIL_SECURE, MAIL_AUTH_USER, MAIL_AUTH_PASS, MAIL_FROM: SMTP relay
//! - RUST_LOG: Log level (default: info)

use courier::api::{run_server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courier=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        e
    })?;

    tracing::info!("Inquiry relay configuration:");
    tracing::info!("  Listen: {}:{}", config.host, config.port);
    tracing::info!("  App name: {}", config.app_name);
    tracing::info!("  Owner address: {}", config.owner_address);
    tracing::info!(
        "  CORS origin: {}",
        config.cors_origin.as_deref().unwrap_or("*")
    );
    tracing::info!(
        "  Rate limit: {} request(s) per {:?}",
        config.rate_limit.max_requests,
        config.rate_limit.window
    );
    tracing::info!("  Mail relay: {}:{}", config.mail.host, config.mail.port);

    run_server(config).await
}
