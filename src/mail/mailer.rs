//! SMTP delivery

use futures::future::BoxFuture;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::config::MailConfig;

/// A single HTML email
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub reply_to: Option<String>,
}

impl OutgoingMail {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
            reply_to: None,
        }
    }

    /// Set the Reply-To address
    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }
}

/// Something that can deliver an [`OutgoingMail`]
///
/// Returns the relay's response line on success.
pub trait Mailer: Send + Sync {
    fn send<'a>(&'a self, mail: &'a OutgoingMail) -> BoxFuture<'a, Result<String, MailError>>;
}

/// Mailer backed by an SMTP relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the transport. No connection is opened until the first send.
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| MailError::Transport(e.to_string()))?
        } else {
            let tls = TlsParameters::new(config.host.clone())
                .map_err(|e| MailError::Transport(e.to_string()))?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .tls(Tls::Opportunistic(tls))
        };

        let mut builder = builder.port(config.port);
        if let Some((user, pass)) = &config.credentials {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let from = parse_mailbox(&config.from)?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, mail: &OutgoingMail) -> Result<Message, MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&mail.to)?)
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_HTML);

        if let Some(reply_to) = &mail.reply_to {
            builder = builder.reply_to(parse_mailbox(reply_to)?);
        }

        builder
            .body(mail.html.clone())
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

impl Mailer for SmtpMailer {
    fn send<'a>(&'a self, mail: &'a OutgoingMail) -> BoxFuture<'a, Result<String, MailError>> {
        Box::pin(async move {
            let message = self.build_message(mail)?;
            let response = self
                .transport
                .send(message)
                .await
                .map_err(|e| MailError::Transport(e.to_string()))?;

            let text = response
                .message()
                .map(|line| line.to_string())
                .collect::<Vec<String>>()
                .join(" ");
            Ok(format!("{} {}", response.code(), text))
        })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse()
        .map_err(|_| MailError::InvalidAddress(address.to_string()))
}

/// Mail errors
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Records every mail and fails for the configured recipients
    #[derive(Default)]
    pub(crate) struct RecordingMailer {
        pub sent: Mutex<Vec<OutgoingMail>>,
        pub failing: Vec<String>,
    }

    impl RecordingMailer {
        pub(crate) fn failing_for(recipient: &str) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                failing: vec![recipient.to_string()],
            }
        }

        pub(crate) fn sent(&self) -> Vec<OutgoingMail> {
            self.sent.lock().clone()
        }
    }

    impl Mailer for RecordingMailer {
        fn send<'a>(&'a self, mail: &'a OutgoingMail) -> BoxFuture<'a, Result<String, MailError>> {
            Box::pin(async move {
                if self.failing.contains(&mail.to) {
                    return Err(MailError::Transport("connection refused".to_string()));
                }
                self.sent.lock().push(mail.clone());
                Ok("250 OK".to_string())
            })
        }
    }

    fn test_config() -> MailConfig {
        MailConfig {
            host: "localhost".to_string(),
            port: 2525,
            secure: false,
            credentials: Some(("relay".to_string(), "secret".to_string())),
            from: "Site <noreply@example.com>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_build_message_with_reply_to() {
        let mailer = SmtpMailer::new(&test_config()).unwrap();
        let mail = OutgoingMail::new("owner@example.com", "Hello", "<p>Hi</p>")
            .with_reply_to("visitor@example.com");

        let message = mailer.build_message(&mail).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("To: owner@example.com"));
        assert!(raw.contains("Reply-To: visitor@example.com"));
        assert!(raw.contains("Subject: Hello"));
        assert!(raw.contains("text/html"));
    }

    #[tokio::test]
    async fn test_invalid_recipient() {
        let mailer = SmtpMailer::new(&test_config()).unwrap();
        let mail = OutgoingMail::new("not an address", "Hello", "<p>Hi</p>");

        let result = mailer.send(&mail).await;
        assert!(matches!(result, Err(MailError::InvalidAddress(_))));
    }

    #[test]
    fn test_invalid_sender_rejected_at_startup() {
        let mut config = test_config();
        config.from = "nobody".to_string();
        assert!(matches!(
            SmtpMailer::new(&config),
            Err(MailError::InvalidAddress(_))
        ));
    }
}
