use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::mail::{Mailer, OutgoingMail, Template, TemplateContext};

pub const CONFIRMATION_TEMPLATE: Template = Template::new(
    "inquiry_confirmation",
    include_str!("../templates/inquiry_confirmation.html"),
);

/// Application state shared across handlers
pub struct AppState {
    pub mailer: Arc<dyn Mailer>,
    /// Site owner receiving the raw inquiry
    pub owner_address: String,
    pub app_name: String,
    pub confirmation: Template,
}

impl AppState {
    pub fn new(mailer: Arc<dyn Mailer>, owner_address: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            mailer,
            owner_address: owner_address.into(),
            app_name: app_name.into(),
            confirmation: CONFIRMATION_TEMPLATE,
        }
    }
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Send Email
// ============================================================================

/// Body of `POST /send-email`, before validation
#[derive(Debug, Deserialize)]
pub struct InquiryRequest {
    #[serde(default)]
    pub mail_to: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A fully populated inquiry
#[derive(Debug, Clone, PartialEq)]
pub struct Inquiry {
    pub recipient_address: String,
    pub message: String,
    pub sender_name: String,
}

impl InquiryRequest {
    /// Every field must be present and non-empty
    pub fn validate(self) -> Result<Inquiry, ApiError> {
        fn present(field: Option<String>) -> Option<String> {
            field.filter(|v| !v.trim().is_empty())
        }

        match (present(self.mail_to), present(self.message), present(self.name)) {
            (Some(recipient_address), Some(message), Some(sender_name)) => Ok(Inquiry {
                recipient_address,
                message,
                sender_name,
            }),
            _ => Err(ApiError::MissingFields),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Relay an inquiry to the site owner, then confirm receipt to the sender
///
/// The owner notification goes first; if it fails the sender receives no
/// confirmation.
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InquiryRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = payload
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejecting unreadable inquiry body");
            ApiError::MissingFields
        })?
        .0;
    let inquiry = request.validate()?;

    tracing::info!(
        name = %inquiry.sender_name,
        mail_to = %inquiry.recipient_address,
        "Inquiry received"
    );

    let context = TemplateContext::new()
        .with("name", &inquiry.sender_name)
        .with("app_name", &state.app_name);
    let confirmation = state.confirmation.render(&context).map_err(|e| {
        tracing::error!(error = %e, "Error rendering email template");
        ApiError::Template
    })?;

    let owner_mail = OutgoingMail::new(
        &state.owner_address,
        format!(
            "Inquiry from {} visitor - {}",
            state.app_name, inquiry.sender_name
        ),
        &inquiry.message,
    )
    .with_reply_to(&inquiry.recipient_address);

    match state.mailer.send(&owner_mail).await {
        Ok(info) => tracing::info!(to = %state.owner_address, response = %info, "Owner notification sent"),
        Err(e) => {
            tracing::error!(to = %state.owner_address, error = %e, "Error sending email to site owner");
            return Err(ApiError::OwnerDelivery);
        }
    }

    let user_mail = OutgoingMail::new(
        &inquiry.recipient_address,
        format!("We have received your inquiry - {}", state.app_name),
        confirmation,
    );

    match state.mailer.send(&user_mail).await {
        Ok(info) => tracing::info!(to = %inquiry.recipient_address, response = %info, "Confirmation sent"),
        Err(e) => {
            tracing::error!(to = %inquiry.recipient_address, error = %e, "Error sending confirmation email to user");
            return Err(ApiError::UserDelivery);
        }
    }

    Ok(Json(MessageResponse {
        message: "Email sent",
    }))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, PartialEq)]
pub enum ApiError {
    MissingFields,
    Template,
    OwnerDelivery,
    UserDelivery,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::MissingFields => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "message": "Invalid request",
                    "error": "Missing required fields",
                }),
            ),
            ApiError::Template => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "message": "Error rendering email template" }),
            ),
            ApiError::OwnerDelivery => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "message": "Error sending email to site owner" }),
            ),
            ApiError::UserDelivery => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "message": "Error sending confirmation email to user" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
