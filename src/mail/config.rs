use crate::config::{self, ConfigError, Lookup};

/// SMTP relay settings shared by every component
#[derive(Clone)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS when set, opportunistic STARTTLS otherwise
    pub secure: bool,
    pub credentials: Option<(String, String)>,
    pub from: String,
}

impl MailConfig {
    /// Read mail settings
    ///
    /// MAIL_HOST, MAIL_FROM are required.
    /// MAIL_PORT defaults to 465 when MAIL_SECURE=true, otherwise 587.
    /// MAIL_AUTH_USER and MAIL_AUTH_PASS must be given together.
    pub fn from_lookup(env: Lookup<'_>) -> Result<Self, ConfigError> {
        let host = config::required(env, "MAIL_HOST")?;
        let secure = config::flag(env, "MAIL_SECURE", false)?;
        let port: u16 = config::parse_or(env, "MAIL_PORT", if secure { 465 } else { 587 })?;
        let from = config::required(env, "MAIL_FROM")?;

        let credentials = match (
            config::optional(env, "MAIL_AUTH_USER"),
            env("MAIL_AUTH_PASS"),
        ) {
            (Some(user), Some(pass)) => Some((user, pass)),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("MAIL_AUTH_PASS")),
            (None, Some(_)) => return Err(ConfigError::Missing("MAIL_AUTH_USER")),
        };

        Ok(Self {
            host,
            port,
            secure,
            credentials,
            from,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&config::process_env)
    }
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("user", &self.credentials.as_ref().map(|(user, _)| user))
            .field("from", &self.from)
            .finish()
    }
}
