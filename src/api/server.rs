use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::config::ServerConfig;
use super::handlers::{health_check, send_email, AppState};
use super::rate_limit::{enforce_rate_limit, RateLimiter};
use crate::mail::SmtpMailer;

fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, Box<dyn std::error::Error>> {
    let allow_origin = match origin {
        Some(origin) => AllowOrigin::exact(HeaderValue::from_str(origin)?),
        None => AllowOrigin::any(),
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any))
}

/// Build the application router
///
/// Only `/send-email` is rate limited.
pub fn build_router(state: Arc<AppState>, limiter: Arc<RateLimiter>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/send-email",
            post(send_email).route_layer(middleware::from_fn_with_state(
                limiter,
                enforce_rate_limit,
            )),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mailer = Arc::new(SmtpMailer::new(&config.mail)?);
    let state = Arc::new(AppState::new(
        mailer,
        config.owner_address.clone(),
        config.app_name.clone(),
    ));
    let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));

    let app = build_router(state, limiter, cors_layer(config.cors_origin.as_deref())?);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Server running at http://{}/", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl-C
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::{RateLimitConfig, DEFAULT_RATE_LIMIT_MESSAGE};
    use crate::mail::mailer::tests::RecordingMailer;
    use crate::mail::Template;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use std::time::Duration;
    use tower::util::ServiceExt;

    const OWNER: &str = "owner@example.com";

    fn create_test_app(mailer: Arc<RecordingMailer>, state_hook: impl FnOnce(&mut AppState)) -> Router {
        let mut state = AppState::new(mailer, OWNER, "Portfolio");
        state_hook(&mut state);

        let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
            window: Duration::from_secs(300),
            max_requests: 1,
            message: DEFAULT_RATE_LIMIT_MESSAGE.to_string(),
        }));

        build_router(Arc::new(state), limiter, cors_layer(None).unwrap())
    }

    fn inquiry(body: serde_json::Value, client: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/send-email")
            .header("content-type", "application/json")
            .header("x-real-ip", client)
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    }

    fn valid_body() -> serde_json::Value {
        serde_json::json!({
            "mail_to": "ada@example.com",
            "message": "<p>I would like a quote.</p>",
            "name": "Ada"
        })
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_test_app(Arc::new(RecordingMailer::default()), |_| {});

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_send_email_success() {
        let mailer = Arc::new(RecordingMailer::default());
        let app = create_test_app(mailer.clone(), |_| {});

        let response = app.oneshot(inquiry(valid_body(), "10.0.0.1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "message": "Email sent" })
        );

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);

        assert_eq!(sent[0].to, OWNER);
        assert_eq!(sent[0].subject, "Inquiry from Portfolio visitor - Ada");
        assert_eq!(sent[0].html, "<p>I would like a quote.</p>");
        assert_eq!(sent[0].reply_to.as_deref(), Some("ada@example.com"));

        assert_eq!(sent[1].to, "ada@example.com");
        assert_eq!(sent[1].subject, "We have received your inquiry - Portfolio");
        assert!(sent[1].html.contains("Ada"));
        assert!(sent[1].html.contains("Portfolio"));
    }

    #[tokio::test]
    async fn test_missing_name_rejected() {
        let mailer = Arc::new(RecordingMailer::default());
        let app = create_test_app(mailer.clone(), |_| {});

        let body = serde_json::json!({
            "mail_to": "ada@example.com",
            "message": "Hello"
        });
        let response = app.oneshot(inquiry(body, "10.0.0.1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({
                "message": "Invalid request",
                "error": "Missing required fields"
            })
        );
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unparsable_body_rejected() {
        let app = create_test_app(Arc::new(RecordingMailer::default()), |_| {});

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/send-email")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_second_request_rate_limited() {
        let app = create_test_app(Arc::new(RecordingMailer::default()), |_| {});

        let first = app
            .clone()
            .oneshot(inquiry(valid_body(), "10.0.0.1"))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .clone()
            .oneshot(inquiry(valid_body(), "10.0.0.1"))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            json_body(second).await,
            serde_json::json!({ "message": DEFAULT_RATE_LIMIT_MESSAGE })
        );

        // A different client key is still allowed
        let other = app
            .oneshot(inquiry(valid_body(), "10.0.0.2"))
            .await
            .unwrap();
        assert_eq!(other.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_not_rate_limited() {
        let app = create_test_app(Arc::new(RecordingMailer::default()), |_| {});

        for _ in 0..3 {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/health")
                        .header("x-real-ip", "10.0.0.1")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_owner_failure_skips_confirmation() {
        let mailer = Arc::new(RecordingMailer::failing_for(OWNER));
        let app = create_test_app(mailer.clone(), |_| {});

        let response = app.oneshot(inquiry(valid_body(), "10.0.0.1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "message": "Error sending email to site owner" })
        );
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_user_failure_after_owner_notified() {
        let mailer = Arc::new(RecordingMailer::failing_for("ada@example.com"));
        let app = create_test_app(mailer.clone(), |_| {});

        let response = app.oneshot(inquiry(valid_body(), "10.0.0.1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "message": "Error sending confirmation email to user" })
        );
        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(mailer.sent()[0].to, OWNER);
    }

    #[tokio::test]
    async fn test_template_failure() {
        let mailer = Arc::new(RecordingMailer::default());
        let app = create_test_app(mailer.clone(), |state| {
            state.confirmation = Template::new("broken", "Hi {{ missing }}");
        });

        let response = app.oneshot(inquiry(valid_body(), "10.0.0.1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "message": "Error rendering email template" })
        );
        assert!(mailer.sent().is_empty());
    }
}
