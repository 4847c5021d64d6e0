use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use super::{
    types::{Testimonial, TestimonialInput},
    ContentError, SharedContentStore,
};
use crate::api::handlers::ErrorResponse;

#[utoipa::path(
    get,
    path = "/api/testimonials",
    responses(
        (status = 200, description = "Published testimonials, newest first", body = [Testimonial])
    ),
    tag = "content"
)]
pub async fn public_list(
    store: Extension<SharedContentStore>,
) -> Result<Json<Vec<Testimonial>>, ContentError> {
    Ok(Json(store.list_testimonials().await?))
}

#[utoipa::path(
    get,
    path = "/admin/testimonials",
    responses(
        (status = 200, description = "All testimonials, newest first", body = [Testimonial])
    ),
    tag = "content"
)]
pub async fn list(
    store: Extension<SharedContentStore>,
) -> Result<Json<Vec<Testimonial>>, ContentError> {
    Ok(Json(store.list_testimonials().await?))
}

#[utoipa::path(
    post,
    path = "/admin/testimonials",
    request_body = TestimonialInput,
    responses(
        (status = 201, description = "Testimonial created", body = Testimonial),
        (status = 400, description = "Invalid testimonial", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn create(
    store: Extension<SharedContentStore>,
    payload: Option<Json<TestimonialInput>>,
) -> Result<(StatusCode, Json<Testimonial>), ContentError> {
    let Some(Json(input)) = payload else {
        return Err(ContentError::MissingPayload);
    };
    let created = store.create_testimonial(input.validate()?).await?;
    info!(id = %created.id, "Testimonial created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/admin/testimonials/{id}",
    params(("id" = Uuid, Path, description = "Testimonial id")),
    request_body = TestimonialInput,
    responses(
        (status = 200, description = "Testimonial updated", body = Testimonial),
        (status = 400, description = "Invalid testimonial", body = ErrorResponse),
        (status = 404, description = "No testimonial with this id", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn update(
    Path(id): Path<Uuid>,
    store: Extension<SharedContentStore>,
    payload: Option<Json<TestimonialInput>>,
) -> Result<Json<Testimonial>, ContentError> {
    let Some(Json(input)) = payload else {
        return Err(ContentError::MissingPayload);
    };
    store
        .update_testimonial(id, input.validate()?)
        .await?
        .map(Json)
        .ok_or(ContentError::NotFound)
}

#[utoipa::path(
    delete,
    path = "/admin/testimonials/{id}",
    params(("id" = Uuid, Path, description = "Testimonial id")),
    responses(
        (status = 204, description = "Testimonial deleted"),
        (status = 404, description = "No testimonial with this id", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn delete(
    Path(id): Path<Uuid>,
    store: Extension<SharedContentStore>,
) -> Result<StatusCode, ContentError> {
    if store.delete_testimonial(id).await? {
        info!(%id, "Testimonial deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ContentError::NotFound)
    }
}
