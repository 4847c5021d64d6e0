use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, instrument};
use utoipa::ToSchema;

use super::{
    auth::utils::{normalize_email, valid_email},
    ErrorResponse,
};
use crate::api::contact::{ContactMessage, ContactSender};

const MAX_NAME_CHARS: usize = 100;
const MIN_MESSAGE_CHARS: usize = 10;
const MAX_MESSAGE_CHARS: usize = 5000;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ContactAccepted {
    pub status: String,
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("{0}")]
    Validation(String),
    #[error("Failed to send message")]
    Delivery(#[source] anyhow::Error),
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Delivery(err) => {
                error!("Contact delivery failed: {err:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

impl ContactRequest {
    /// Trim and check the submission, producing the message to deliver.
    ///
    /// # Errors
    /// Returns `ContactError::Validation` for the first invalid field.
    pub fn into_message(self) -> Result<ContactMessage, ContactError> {
        let name = self.name.trim();
        let name_len = name.chars().count();
        if name_len == 0 || name_len > MAX_NAME_CHARS {
            return Err(ContactError::Validation(format!(
                "Name must be between 1 and {MAX_NAME_CHARS} characters"
            )));
        }

        let email = normalize_email(&self.email);
        if !valid_email(&email) {
            return Err(ContactError::Validation("Invalid email address".to_string()));
        }

        let message = self.message.trim();
        let message_len = message.chars().count();
        if !(MIN_MESSAGE_CHARS..=MAX_MESSAGE_CHARS).contains(&message_len) {
            return Err(ContactError::Validation(format!(
                "Message must be between {MIN_MESSAGE_CHARS} and {MAX_MESSAGE_CHARS} characters"
            )));
        }

        let company = self
            .company
            .map(|company| company.trim().to_string())
            .filter(|company| !company.is_empty());

        Ok(ContactMessage {
            name: name.to_string(),
            email,
            company,
            message: message.to_string(),
        })
    }
}

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 202, description = "Message accepted for delivery", body = ContactAccepted),
        (status = 400, description = "Invalid submission", body = ErrorResponse),
        (status = 500, description = "Delivery failed", body = ErrorResponse)
    ),
    tag = "contact"
)]
#[instrument(skip_all)]
pub async fn contact(
    sender: Extension<Arc<dyn ContactSender>>,
    payload: Option<Json<ContactRequest>>,
) -> Result<(StatusCode, Json<ContactAccepted>), ContactError> {
    let Some(Json(request)) = payload else {
        return Err(ContactError::Validation("Missing payload".to_string()));
    };
    let message = request.into_message()?;
    sender.send(&message).await.map_err(ContactError::Delivery)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ContactAccepted {
            status: "accepted".to_string(),
        }),
    ))
}
