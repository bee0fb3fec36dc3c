//! Per-client sliding-window rate limiting
//!
//! Each client key owns a log of recent request instants. Keys expire from
//! the moka cache once idle for a full window, so abandoned clients do not
//! accumulate.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use moka::sync::Cache;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::config::RateLimitConfig;

type Hits = Arc<Mutex<VecDeque<Instant>>>;

/// Sliding-window limiter shared by all request handlers
pub struct RateLimiter {
    windows: Cache<String, Hits>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: Cache::builder().time_to_idle(config.window).build(),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Record a request for `key`, returning false when it exceeds the limit
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let hits = self
            .windows
            .get_with(key.to_string(), || Arc::new(Mutex::new(VecDeque::new())));
        let mut hits = hits.lock();

        while let Some(&oldest) = hits.front() {
            if now.saturating_duration_since(oldest) >= self.config.window {
                hits.pop_front();
            } else {
                break;
            }
        }

        if hits.len() >= self.config.max_requests as usize {
            return false;
        }

        hits.push_back(now);
        true
    }
}

/// Identify the client: X-Real-IP, then the first X-Forwarded-For hop,
/// then the peer address
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(real_ip) = header_value(headers, "x-real-ip") {
        return real_ip.to_string();
    }

    if let Some(first) = header_value(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Middleware rejecting requests over the limit
pub async fn enforce_rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let key = client_key(request.headers(), peer);

    if !limiter.check(&key) {
        tracing::warn!(client = %key, "Rate limit exceeded");
        let body = serde_json::json!({ "message": limiter.config().message });
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }

    next.run(request).await
}
