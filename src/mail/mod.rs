//! Outbound mail: SMTP configuration, the `Mailer` seam and HTML templates

pub mod config;
pub mod mailer;
pub mod template;

pub use config::MailConfig;
pub use mailer::{MailError, Mailer, OutgoingMail, SmtpMailer};
pub use template::{Template, TemplateContext, TemplateError};
