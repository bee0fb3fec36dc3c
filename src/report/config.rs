use std::path::PathBuf;

use crate::config::{self, ConfigError, Lookup};

pub const DEFAULT_REPORT_PATH: &str = "Database_Tables_Info.xlsx";

/// Connection settings for the database server
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Size reporter settings
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    pub database: DatabaseConfig,
    /// Schemas to analyze, in order
    pub databases: Vec<String>,
    pub output_path: PathBuf,
}

impl ReporterConfig {
    /// DB_HOST, DB_USER, DATABASES are required; DATABASES is comma-separated.
    /// DB_PORT defaults to 3306, DB_PASSWORD to empty, REPORT_PATH to
    /// `Database_Tables_Info.xlsx`.
    pub fn from_lookup(env: Lookup<'_>) -> Result<Self, ConfigError> {
        let databases = parse_database_list(&config::required(env, "DATABASES")?);
        if databases.is_empty() {
            return Err(ConfigError::Invalid {
                key: "DATABASES",
                value: env("DATABASES").unwrap_or_default(),
                reason: "no database names given".to_string(),
            });
        }

        Ok(Self {
            database: DatabaseConfig {
                host: config::required(env, "DB_HOST")?,
                port: config::parse_or(env, "DB_PORT", 3306)?,
                user: config::required(env, "DB_USER")?,
                password: env("DB_PASSWORD").unwrap_or_default(),
            },
            databases,
            output_path: config::optional(env, "REPORT_PATH")
                .unwrap_or_else(|| DEFAULT_REPORT_PATH.to_string())
                .into(),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&config::process_env)
    }
}

/// Split a comma-separated list, dropping blank entries
pub fn parse_database_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}
