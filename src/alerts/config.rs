//! Alert relay configuration

use crate::config::{self, ConfigError, Lookup};
use crate::mail::MailConfig;

/// Alert relay settings
#[derive(Debug, Clone)]
pub struct AlertRelayConfig {
    pub host: String,
    pub port: u16,
    /// Fixed recipient of every alert mail
    pub recipient: String,
    pub subject: String,
    pub mail: MailConfig,
}

impl AlertRelayConfig {
    /// HOST=0.0.0.0
    /// PORT=8080
    /// MAIL_TO=ops@example.com
    /// ALERT_SUBJECT="Budget Email Alert"
    pub fn from_lookup(env: Lookup<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: config::optional(env, "HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: config::parse_or(env, "PORT", 8080)?,
            recipient: config::required(env, "MAIL_TO")?,
            subject: config::optional(env, "ALERT_SUBJECT")
                .unwrap_or_else(|| "Budget Email Alert".to_string()),
            mail: MailConfig::from_lookup(env)?,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&config::process_env)
    }
}
