//! Budget notification payload and its push envelope

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::AlertError;
use crate::mail::TemplateContext;

/// Push delivery envelope wrapping a published message
#[derive(Debug, Deserialize)]
pub struct PushEnvelope {
    pub message: Option<PushMessage>,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    /// Base64-encoded JSON body
    pub data: Option<String>,
    #[serde(default, alias = "message_id")]
    pub message_id: Option<String>,
    #[serde(default, alias = "publish_time")]
    pub publish_time: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// Budget threshold notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAlertPayload {
    #[serde(alias = "displayName")]
    pub budget_display_name: String,
    pub cost_amount: f64,
    pub cost_interval_start: String,
    pub budget_amount: f64,
    pub budget_amount_type: String,
    /// Absent until a configured threshold is crossed
    #[serde(default)]
    pub alert_threshold_exceeded: Option<f64>,
    #[serde(default)]
    pub forecast_threshold_exceeded: Option<f64>,
    pub currency_code: String,
}

impl BudgetAlertPayload {
    /// Decode the payload carried by a raw push request body
    pub fn from_push_body(body: &[u8]) -> Result<Self, AlertError> {
        let envelope: PushEnvelope = serde_json::from_slice(body).map_err(AlertError::Envelope)?;
        let message = envelope.message.ok_or(AlertError::MissingData)?;
        let data = message
            .data
            .filter(|d| !d.is_empty())
            .ok_or(AlertError::MissingData)?;

        Self::from_base64(&data)
    }

    /// Decode base64 text into a payload
    pub fn from_base64(data: &str) -> Result<Self, AlertError> {
        let raw = B64.decode(data.trim())?;
        let text = String::from_utf8(raw)?;
        serde_json::from_str(&text).map_err(|source| AlertError::Payload { source, raw: text })
    }

    /// Template values, keyed the way the alert template expects
    pub fn to_context(&self) -> TemplateContext {
        TemplateContext::new()
            .with("budget_display_name", &self.budget_display_name)
            .with("cost_amount", self.cost_amount)
            .with("cost_interval_start", &self.cost_interval_start)
            .with("budget_amount", self.budget_amount)
            .with("budget_amount_type", &self.budget_amount_type)
            .with("alert_threshold_exceeded", threshold(self.alert_threshold_exceeded))
            .with("forecast_threshold_exceeded", threshold(self.forecast_threshold_exceeded))
            .with("currency_code", &self.currency_code)
    }
}

fn threshold(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE: &str = r#"{
        "budgetDisplayName": "Production budget",
        "costAmount": 140.32,
        "costIntervalStart": "2024-03-01T08:00:00Z",
        "budgetAmount": 100,
        "budgetAmountType": "SPECIFIED_AMOUNT",
        "alertThresholdExceeded": 1.0,
        "currencyCode": "USD"
    }"#;

    pub(crate) fn push_body(json: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "message": {
                "data": B64.encode(json),
                "messageId": "136969346945"
            },
            "subscription": "projects/demo/subscriptions/billing"
        }))
        .unwrap()
    }

    #[test]
    fn test_decode_push_body() {
        let payload = BudgetAlertPayload::from_push_body(&push_body(SAMPLE)).unwrap();
        assert_eq!(payload.budget_display_name, "Production budget");
        assert_eq!(payload.cost_amount, 140.32);
        assert_eq!(payload.alert_threshold_exceeded, Some(1.0));
        assert_eq!(payload.forecast_threshold_exceeded, None);
    }

    #[test]
    fn test_display_name_alias() {
        let json = SAMPLE.replace("budgetDisplayName", "displayName");
        let payload = BudgetAlertPayload::from_base64(&B64.encode(json)).unwrap();
        assert_eq!(payload.budget_display_name, "Production budget");
    }

    #[test]
    fn test_missing_data() {
        let body = br#"{"message": {"messageId": "1"}}"#;
        assert!(matches!(
            BudgetAlertPayload::from_push_body(body),
            Err(AlertError::MissingData)
        ));

        let body = br#"{"subscription": "s"}"#;
        assert!(matches!(
            BudgetAlertPayload::from_push_body(body),
            Err(AlertError::MissingData)
        ));
    }

    #[test]
    fn test_bad_base64_and_bad_json() {
        assert!(matches!(
            BudgetAlertPayload::from_base64("%%% not base64 %%%"),
            Err(AlertError::Base64(_))
        ));
        assert!(matches!(
            BudgetAlertPayload::from_base64(&B64.encode("{not json")),
            Err(AlertError::Payload { .. })
        ));
        assert!(matches!(
            BudgetAlertPayload::from_push_body(b"garbage"),
            Err(AlertError::Envelope(_))
        ));
    }

    #[test]
    fn test_context_marks_absent_thresholds() {
        let payload: BudgetAlertPayload = serde_json::from_str(SAMPLE).unwrap();
        let context = payload.to_context();
        assert_eq!(context.get("alert_threshold_exceeded"), Some("1"));
        assert_eq!(context.get("forecast_threshold_exceeded"), Some("N/A"));
        assert_eq!(context.get("budget_amount"), Some("100"));
    }
}
