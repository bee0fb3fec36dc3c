//! Turns budget notifications into alert mail

use std::sync::Arc;

use super::payload::BudgetAlertPayload;
use super::AlertError;
use crate::mail::{Mailer, OutgoingMail, Template};

pub const BUDGET_ALERT_TEMPLATE: Template =
    Template::new("budget_alert", include_str!("../templates/budget_alert.html"));

/// Renders and sends one alert mail per delivered notification
pub struct AlertNotifier {
    mailer: Arc<dyn Mailer>,
    recipient: String,
    subject: String,
    template: Template,
}

impl AlertNotifier {
    pub fn new(mailer: Arc<dyn Mailer>, recipient: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            mailer,
            recipient: recipient.into(),
            subject: subject.into(),
            template: BUDGET_ALERT_TEMPLATE,
        }
    }

    /// Use a different template
    pub fn with_template(mut self, template: Template) -> Self {
        self.template = template;
        self
    }

    /// Handle one raw push delivery
    ///
    /// Nothing is sent unless the payload decodes and the template renders.
    pub async fn relay(&self, body: &[u8]) -> Result<String, AlertError> {
        let payload = BudgetAlertPayload::from_push_body(body)?;
        self.notify(&payload).await
    }

    /// Render and send the alert for a decoded payload
    pub async fn notify(&self, payload: &BudgetAlertPayload) -> Result<String, AlertError> {
        let html = self.template.render(&payload.to_context())?;
        let mail = OutgoingMail::new(&self.recipient, &self.subject, html);

        let info = self.mailer.send(&mail).await?;

        tracing::info!(
            budget = %payload.budget_display_name,
            recipient = %self.recipient,
            response = %info,
            "Budget alert sent"
        );

        Ok(info)
    }
}
