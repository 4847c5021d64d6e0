//! Admin settings: password change for the signed-in account.

use axum::{extract::Extension, http::StatusCode, Json};
use std::sync::Arc;
use tracing::instrument;

use super::auth::{types::ChangePasswordRequest, AuthError, AuthState, PasswordChange, Principal};
use super::ErrorResponse;

#[utoipa::path(
    post,
    path = "/admin/settings/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Too short, mismatched confirmation or missing payload", body = ErrorResponse),
        (status = 401, description = "Current password is wrong", body = ErrorResponse),
        (status = 307, description = "No admin session; redirected to the login page")
    ),
    tag = "settings"
)]
#[instrument(skip_all)]
pub async fn change_password(
    auth_state: Extension<Arc<AuthState>>,
    principal: Option<Extension<Principal>>,
    payload: Option<Json<ChangePasswordRequest>>,
) -> Result<StatusCode, AuthError> {
    let Some(Extension(principal)) = principal else {
        return Err(AuthError::Unauthorized);
    };
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    auth_state
        .change_password(
            &principal.email,
            PasswordChange {
                current: &request.current_password,
                new: &request.new_password,
                confirm: &request.confirm_password,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
