//! Admin content management: case studies and testimonials.

pub mod case_studies;
pub(crate) mod storage;
pub mod testimonials;
pub(crate) mod types;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use super::{auth::Principal, ErrorResponse};

pub use storage::{ContentStore, MemoryContentStore, PgContentStore};
pub use types::{CaseStudy, CaseStudyInput, DashboardResponse, Testimonial, TestimonialInput};

pub type SharedContentStore = Arc<dyn ContentStore>;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{0}")]
    Validation(String),
    #[error("Not found")]
    NotFound,
    #[error("Missing payload")]
    MissingPayload,
    #[error("storage failure")]
    Storage(#[source] anyhow::Error),
}

impl ContentError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::MissingPayload => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ContentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err)
    }
}

impl IntoResponse for ContentError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Storage(err) => {
                error!("Content storage error: {err:#}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (self.status(), Json(ErrorResponse::new(message))).into_response()
    }
}

#[utoipa::path(
    get,
    path = "/admin",
    responses(
        (status = 200, description = "Content counts for the admin dashboard", body = DashboardResponse),
        (status = 307, description = "Not signed in as an administrator; redirects to the login page")
    ),
    tag = "content"
)]
pub async fn dashboard(
    principal: Extension<Principal>,
    store: Extension<SharedContentStore>,
) -> Result<Json<DashboardResponse>, ContentError> {
    let (case_studies, testimonials) =
        tokio::try_join!(store.count_case_studies(), store.count_testimonials())?;

    Ok(Json(DashboardResponse {
        email: principal.email.clone(),
        case_studies,
        testimonials,
    }))
}
