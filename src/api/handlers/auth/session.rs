//! Session endpoints: login, logout and session introspection.

use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, AUTHORIZATION, COOKIE, LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Form, Json,
};
use std::sync::Arc;
use tracing::{error, instrument};

use super::{
    error::AuthError,
    principal::Principal,
    state::{AuthConfig, AuthState},
    types::{LoginRequest, SessionResponse},
};
use crate::api::handlers::ErrorResponse;

pub const SESSION_COOKIE_NAME: &str = "cedarcore_session";

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in; redirects to the admin root and sets the session cookie"),
        (status = 400, description = "Malformed email or password", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    form: Option<Form<LoginRequest>>,
) -> Result<Response, AuthError> {
    let Some(Form(form)) = form else {
        return Err(AuthError::Validation("Email and password are required".to_string()));
    };

    let issued = auth_state
        .authenticate(&form.email, &form.password)
        .await?;

    let cookie = session_cookie(auth_state.config(), &issued.token).map_err(|err| {
        error!("Failed to build session cookie: {err}");
        AuthError::Storage(err.into())
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    headers.insert(
        LOCATION,
        HeaderValue::from_str(auth_state.gate().admin_prefix())
            .map_err(|err| AuthError::Storage(err.into()))?,
    );

    Ok((StatusCode::SEE_OTHER, headers).into_response())
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 303, description = "Session cookie cleared; redirects to the login page")
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    // Tokens are stateless: signing out only drops the cookie.
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(auth_state.config()) {
        headers.insert(SET_COOKIE, cookie);
    }
    if let Ok(location) = HeaderValue::from_str(auth_state.gate().login_path()) {
        headers.insert(LOCATION, location);
    }
    (StatusCode::SEE_OTHER, headers)
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(principal: Option<Extension<Principal>>) -> Response {
    // The gate has already verified the token; absence means "no session".
    match principal {
        Some(Extension(principal)) => (
            StatusCode::OK,
            Json(SessionResponse {
                email: principal.email,
                role: principal.role,
                expires_at: principal.expires_at,
            }),
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Build a secure `HttpOnly` cookie for the session token.
pub(crate) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Session token from the bearer header, falling back to the session cookie.
pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let Some((key, val)) = pair.trim().split_once('=') else {
                continue;
            };
            if key.trim() == SESSION_COOKIE_NAME && !val.trim().is_empty() {
                return Some(val.trim().to_string());
            }
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; cedarcore_session=abc.def.ghi; other=1"),
        );
        assert_eq!(
            extract_session_token(&headers),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("cedarcore_session=cookie"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer header"));
        assert_eq!(extract_session_token(&headers), Some("header".to_string()));
    }

    #[test]
    fn missing_or_empty_token_is_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("cedarcore_session="));
        assert_eq!(extract_session_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_session_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_session_token(&headers), None);
    }

    #[test]
    fn session_cookie_flags() -> anyhow::Result<()> {
        let secure = session_cookie(&AuthConfig::default().with_session_ttl_seconds(60), "tok")?;
        assert_eq!(
            secure.to_str()?,
            "cedarcore_session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=60; Secure"
        );

        let plain = AuthConfig::new("http://localhost:3000".to_string());
        let cleared = clear_session_cookie(&plain)?;
        assert_eq!(
            cleared.to_str()?,
            "cedarcore_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
        );
        Ok(())
    }
}
