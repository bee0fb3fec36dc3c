//! Inquiry relay configuration

use std::time::Duration;

use crate::config::{self, ConfigError, Lookup};
use crate::mail::MailConfig;

pub const DEFAULT_RATE_LIMIT_MESSAGE: &str = "You've already sent a request, please try again later.";

/// Sliding-window limit applied per client key
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window: Duration,
    /// Requests allowed per window; zero rejects everything
    pub max_requests: u32,
    /// Body `message` of the rejection response
    pub message: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(5 * 60),
            max_requests: 1,
            message: DEFAULT_RATE_LIMIT_MESSAGE.to_string(),
        }
    }
}

/// Inquiry relay settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Site owner receiving every inquiry
    pub owner_address: String,
    pub app_name: String,
    /// Allowed CORS origin; any origin when unset
    pub cors_origin: Option<String>,
    pub rate_limit: RateLimitConfig,
    pub mail: MailConfig,
}

impl ServerConfig {
    /// Environment variables:
    /// - HOST (default 0.0.0.0), PORT (default 6666)
    /// - MAIL_TO, APP_NAME (required)
    /// - CORS_ORIGIN (optional)
    /// - RATE_LIMIT_WINDOW_MINUTES (default 5), RATE_LIMIT_MAX (default 1)
    /// - RATE_LIMIT_MESSAGE
    /// - MAIL_* (see [`MailConfig`])
    pub fn from_lookup(env: Lookup<'_>) -> Result<Self, ConfigError> {
        let window_minutes: f64 = config::parse_or(env, "RATE_LIMIT_WINDOW_MINUTES", 5.0)?;
        if !(window_minutes.is_finite() && window_minutes > 0.0) {
            return Err(ConfigError::Invalid {
                key: "RATE_LIMIT_WINDOW_MINUTES",
                value: window_minutes.to_string(),
                reason: "must be a positive number of minutes".to_string(),
            });
        }

        let rate_limit = RateLimitConfig {
            window: Duration::from_secs_f64(window_minutes * 60.0),
            max_requests: config::parse_or(env, "RATE_LIMIT_MAX", 1)?,
            message: config::optional(env, "RATE_LIMIT_MESSAGE")
                .unwrap_or_else(|| DEFAULT_RATE_LIMIT_MESSAGE.to_string()),
        };

        Ok(Self {
            host: config::optional(env, "HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: config::parse_or(env, "PORT", 6666)?,
            owner_address: config::required(env, "MAIL_TO")?,
            app_name: config::required(env, "APP_NAME")?,
            cors_origin: config::optional(env, "CORS_ORIGIN"),
            rate_limit,
            mail: MailConfig::from_lookup(env)?,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&config::process_env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::lookup;

    const BASE: &[(&str, &str)] = &[
        ("MAIL_HOST", "smtp.example.com"),
        ("MAIL_FROM", "noreply@example.com"),
        ("MAIL_TO", "owner@example.com"),
        ("APP_NAME", "Portfolio"),
    ];

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(&lookup(BASE)).unwrap();
        assert_eq!(config.port, 6666);
        assert_eq!(config.rate_limit.window, Duration::from_secs(300));
        assert_eq!(config.rate_limit.max_requests, 1);
        assert_eq!(config.rate_limit.message, DEFAULT_RATE_LIMIT_MESSAGE);
        assert!(config.cors_origin.is_none());
    }

    #[test]
    fn test_rate_limit_overrides() {
        let mut pairs = BASE.to_vec();
        pairs.push(("RATE_LIMIT_WINDOW_MINUTES", "0.5"));
        pairs.push(("RATE_LIMIT_MAX", "3"));
        let config = ServerConfig::from_lookup(&lookup(&pairs)).unwrap();
        assert_eq!(config.rate_limit.window, Duration::from_secs(30));
        assert_eq!(config.rate_limit.max_requests, 3);
    }

    #[test]
    fn test_rejects_non_positive_window() {
        let mut pairs = BASE.to_vec();
        pairs.push(("RATE_LIMIT_WINDOW_MINUTES", "0"));
        assert!(matches!(
            ServerConfig::from_lookup(&lookup(&pairs)),
            Err(ConfigError::Invalid { key: "RATE_LIMIT_WINDOW_MINUTES", .. })
        ));
    }

    #[test]
    fn test_app_name_required() {
        let pairs: Vec<_> = BASE.iter().copied().filter(|(k, _)| *k != "APP_NAME").collect();
        assert!(matches!(
            ServerConfig::from_lookup(&lookup(&pairs)),
            Err(ConfigError::Missing("APP_NAME"))
        ));
    }
}
