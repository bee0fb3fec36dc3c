//! Courier: small mail and reporting services
//!
//! Three independent components share this crate:
//!
//! - **Inquiry relay** ([`api`]): `POST /send-email` forwards a visitor's
//!   inquiry to the site owner and mails the visitor a confirmation, behind a
//!   per-client sliding-window rate limit.
//! - **Alert relay** ([`alerts`]): receives pushed budget notifications,
//!   decodes the base64 JSON payload and mails an HTML alert.
//! - **Size reporter** ([`report`]): walks a list of MySQL databases,
//!   refreshes table statistics and writes table sizes to an .xlsx workbook.
//!
//! # Example
//!
//! ```
//! use courier::report::format_size_with_unit;
//!
//! assert_eq!(format_size_with_unit(2048.0), "2.00 MiB");
//! assert_eq!(format_size_with_unit(0.5), "512.00 B");
//! ```

pub mod alerts;
pub mod api;
pub mod config;
pub mod mail;
pub mod report;

// Re-export commonly used types
pub use config::ConfigError;
pub use mail::{MailConfig, MailError, Mailer, OutgoingMail, SmtpMailer};
