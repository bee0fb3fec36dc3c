//! Environment-driven configuration helpers
//!
//! Every component builds its typed config through a lookup function so the
//! same parsing runs against the process environment or a test map.

use std::str::FromStr;

/// Lookup function for configuration keys
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Read from the process environment, treating blank values as unset
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Configuration errors, reported at startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Fetch a required value
pub fn required(env: Lookup<'_>, key: &'static str) -> Result<String, ConfigError> {
    env(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

/// Fetch an optional value
pub fn optional(env: Lookup<'_>, key: &'static str) -> Option<String> {
    env(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an optional value, falling back to `default` when unset
pub fn parse_or<T>(env: Lookup<'_>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(env, key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Parse a `true`/`false` flag
pub fn flag(env: Lookup<'_>, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match optional(env, key) {
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key,
                value: raw,
                reason: "expected true or false".to_string(),
            }),
        },
        None => Ok(default),
    }
}
