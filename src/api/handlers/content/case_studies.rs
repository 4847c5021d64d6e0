use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use super::{
    types::{CaseStudy, CaseStudyInput},
    ContentError, SharedContentStore,
};
use crate::api::handlers::ErrorResponse;

#[utoipa::path(
    get,
    path = "/api/case-studies",
    responses(
        (status = 200, description = "Published case studies, newest first", body = [CaseStudy])
    ),
    tag = "content"
)]
pub async fn public_list(
    store: Extension<SharedContentStore>,
) -> Result<Json<Vec<CaseStudy>>, ContentError> {
    Ok(Json(store.list_case_studies().await?))
}

#[utoipa::path(
    get,
    path = "/admin/case-studies",
    responses(
        (status = 200, description = "All case studies, newest first", body = [CaseStudy])
    ),
    tag = "content"
)]
pub async fn list(
    store: Extension<SharedContentStore>,
) -> Result<Json<Vec<CaseStudy>>, ContentError> {
    Ok(Json(store.list_case_studies().await?))
}

#[utoipa::path(
    post,
    path = "/admin/case-studies",
    request_body = CaseStudyInput,
    responses(
        (status = 201, description = "Case study created", body = CaseStudy),
        (status = 400, description = "Invalid case study", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn create(
    store: Extension<SharedContentStore>,
    payload: Option<Json<CaseStudyInput>>,
) -> Result<(StatusCode, Json<CaseStudy>), ContentError> {
    let Some(Json(input)) = payload else {
        return Err(ContentError::MissingPayload);
    };
    let created = store.create_case_study(input.validate()?).await?;
    info!(id = %created.id, "Case study created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/admin/case-studies/{id}",
    params(("id" = Uuid, Path, description = "Case study id")),
    request_body = CaseStudyInput,
    responses(
        (status = 200, description = "Case study updated", body = CaseStudy),
        (status = 400, description = "Invalid case study", body = ErrorResponse),
        (status = 404, description = "No case study with this id", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn update(
    Path(id): Path<Uuid>,
    store: Extension<SharedContentStore>,
    payload: Option<Json<CaseStudyInput>>,
) -> Result<Json<CaseStudy>, ContentError> {
    let Some(Json(input)) = payload else {
        return Err(ContentError::MissingPayload);
    };
    store
        .update_case_study(id, input.validate()?)
        .await?
        .map(Json)
        .ok_or(ContentError::NotFound)
}

#[utoipa::path(
    delete,
    path = "/admin/case-studies/{id}",
    params(("id" = Uuid, Path, description = "Case study id")),
    responses(
        (status = 204, description = "Case study deleted"),
        (status = 404, description = "No case study with this id", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn delete(
    Path(id): Path<Uuid>,
    store: Extension<SharedContentStore>,
) -> Result<StatusCode, ContentError> {
    if store.delete_case_study(id).await? {
        info!(%id, "Case study deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ContentError::NotFound)
    }
}
