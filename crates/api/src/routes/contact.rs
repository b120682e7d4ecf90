//! Contact form route

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub message: String,
}

/// Relay a contact-form message to the support inbox
///
/// Public but throttled; here delivery *is* the operation, so a gateway
/// failure is surfaced rather than swallowed.
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> ApiResult<Json<ContactResponse>> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.message.trim().is_empty() {
        return Err(ApiError::Validation(
            "Name, email and message are required".to_string(),
        ));
    }

    state
        .mailer
        .send_contact_message(req.name.trim(), req.email.trim(), req.message.trim())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "contact: Relay failed");
            ApiError::Notification(
                "Your message could not be sent. Please try again later.".to_string(),
            )
        })?;

    Ok(Json(ContactResponse {
        message: "Thanks for reaching out. We'll get back to you soon.".to_string(),
    }))
}
