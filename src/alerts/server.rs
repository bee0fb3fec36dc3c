use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::config::AlertRelayConfig;
use super::notifier::AlertNotifier;
use crate::api::handlers::health_check;
use crate::api::server::shutdown_signal;
use crate::mail::SmtpMailer;

/// Receive one pushed event
///
/// Always acknowledges with 204 so the platform never redelivers; failures
/// are logged and the event is dropped.
async fn receive_event(
    State(notifier): State<Arc<AlertNotifier>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let event_id = headers
        .get("ce-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    if let Err(e) = notifier.relay(&body).await {
        tracing::error!(event_id = %event_id, error = %e, "Dropping budget alert event");
    }

    StatusCode::NO_CONTENT
}

/// Build the alert relay router
pub fn build_router(notifier: Arc<AlertNotifier>) -> Router {
    Router::new()
        .route("/", post(receive_event))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(notifier)
}

/// Run the alert relay
pub async fn run_server(config: AlertRelayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mailer = Arc::new(SmtpMailer::new(&config.mail)?);
    let notifier = Arc::new(AlertNotifier::new(
        mailer,
        config.recipient.clone(),
        config.subject.clone(),
    ));

    let app = build_router(notifier);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Starting alert relay on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Alert relay stopped");
    Ok(())
}
