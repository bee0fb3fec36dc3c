//! Alert relay: budget notifications delivered by push, relayed as mail

pub mod config;
pub mod notifier;
pub mod payload;
pub mod server;

pub use config::AlertRelayConfig;
pub use notifier::AlertNotifier;
pub use payload::BudgetAlertPayload;
pub use server::{build_router, run_server};

use crate::mail::{MailError, TemplateError};

/// Reasons an alert event produced no mail
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("Malformed push envelope: {0}")]
    Envelope(serde_json::Error),

    #[error("Push message carried no data")]
    MissingData,

    #[error("Message data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Message data is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid budget payload: {source}; raw data: {raw}")]
    Payload {
        source: serde_json::Error,
        raw: String,
    },

    #[error("Failed to render alert template: {0}")]
    Template(#[from] TemplateError),

    #[error("Failed to send alert mail: {0}")]
    Mail(#[from] MailError),
}
