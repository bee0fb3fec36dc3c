//! Budget alert relay
//!
//! Accepts pushed budget notifications on `POST /` and mails them to MAIL_TO.
//!
//! Environment variables:
//! - HOST / PORT: Bind address (default: 0.0.0.0:8080)
//! - MAIL_TO: Alert recipient
//! - ALERT_SUBJECT: Mail subject (default: "Budget Email Alert")
//! - MAIL_HOST, MAIL_PORT, MAIL_SECURE, MAIL_AUTH_USER, MAIL_AUTH_PASS, MAIL_FROM: SMTP relay
//! - RUST_LOG: Log level (default: info)

use courier::alerts::{run_server, AlertRelayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courier=info,alert_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AlertRelayConfig::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        e
    })?;

    tracing::info!(
        recipient = %config.recipient,
        relay = %config.mail.host,
        "Alert relay configured"
    );

    run_server(config).await
}
