//! HTTP handlers and the shared error body.

pub mod auth;
pub mod contact;
pub mod content;
pub mod health;
pub mod login_page;
pub mod root;
pub mod settings;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JSON body returned with every 4xx/5xx produced by a handler.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
