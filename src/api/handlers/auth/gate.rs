//! Request gate for the admin section.
//!
//! Flow Overview:
//! 1) Read the session token from the cookie or bearer header.
//! 2) Verify it at the current time; any failure counts as "no session".
//! 3) Classify the path and decide: allow, or redirect to the login path.
//! 4) On allow, attach a [`Principal`] to the request for downstream handlers.
//!
//! Missing, malformed, expired and wrongly signed tokens all produce the same
//! redirect so callers cannot tell which condition failed.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

use super::{
    principal::{Principal, Role},
    session::extract_session_token,
    state::AuthState,
    token::{now_unix_seconds, SessionClaims},
};

/// Root of the protected section.
pub const ADMIN_PREFIX: &str = "/admin";
/// Login surface; public even though it lives under [`ADMIN_PREFIX`].
pub const LOGIN_PATH: &str = "/admin/login";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathClass {
    Public,
    Login,
    Protected,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectTo(String),
}

#[derive(Clone, Debug)]
pub struct Gate {
    admin_prefix: String,
    login_path: String,
}

impl Default for Gate {
    fn default() -> Self {
        Self::new(ADMIN_PREFIX, LOGIN_PATH)
    }
}

impl Gate {
    #[must_use]
    pub fn new(admin_prefix: &str, login_path: &str) -> Self {
        Self {
            admin_prefix: normalize_path(admin_prefix),
            login_path: normalize_path(login_path),
        }
    }

    #[must_use]
    pub fn admin_prefix(&self) -> &str {
        &self.admin_prefix
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Classify a request path. Matching is per segment, so `/administrator`
    /// is not part of `/admin`.
    #[must_use]
    pub fn classify(&self, path: &str) -> PathClass {
        if path
            .split('/')
            .any(|segment| segment == "." || segment == "..")
        {
            return PathClass::Protected;
        }

        let normalized = normalize_path(path);
        if normalized == self.login_path {
            PathClass::Login
        } else if normalized == self.admin_prefix
            || normalized
                .strip_prefix(self.admin_prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
        {
            PathClass::Protected
        } else {
            PathClass::Public
        }
    }

    /// Decide whether a request may proceed. `claims` must already be verified.
    #[must_use]
    pub fn authorize(&self, path: &str, claims: Option<&SessionClaims>) -> GateDecision {
        match self.classify(path) {
            PathClass::Public | PathClass::Login => GateDecision::Allow,
            PathClass::Protected => match claims.map(|claims| claims.role) {
                Some(Role::Admin) => GateDecision::Allow,
                Some(Role::User) | None => GateDecision::RedirectTo(self.login_path.clone()),
            },
        }
    }
}

/// Collapse repeated slashes and drop the trailing one (`//admin/` -> `/admin`).
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Middleware enforcing the gate on every request.
pub async fn require_admin(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = extract_session_token(request.headers()).and_then(|token| {
        match auth_state.signer().verify(&token, now_unix_seconds()) {
            Ok(claims) => Some(claims),
            Err(err) => {
                debug!("Ignoring session token: {err}");
                None
            }
        }
    });

    match auth_state
        .gate()
        .authorize(request.uri().path(), claims.as_ref())
    {
        GateDecision::Allow => {
            if let Some(claims) = claims {
                request.extensions_mut().insert(Principal::from(claims));
            }
            next.run(request).await
        }
        GateDecision::RedirectTo(location) => {
            debug!("Gate redirecting {} to {}", request.uri().path(), location);
            Redirect::temporary(&location).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> SessionClaims {
        SessionClaims {
            sub: "a@b.com".to_string(),
            role,
            iat: 0,
            exp: i64::MAX,
            jti: "jti".to_string(),
        }
    }

    #[test]
    fn classify_paths() {
        let gate = Gate::default();
        assert_eq!(gate.classify("/"), PathClass::Public);
        assert_eq!(gate.classify("/api/case-studies"), PathClass::Public);
        assert_eq!(gate.classify("/administrator"), PathClass::Public);
        assert_eq!(gate.classify("/Admin"), PathClass::Public);
        assert_eq!(gate.classify("/admin"), PathClass::Protected);
        assert_eq!(gate.classify("/admin/"), PathClass::Protected);
        assert_eq!(gate.classify("/admin/testimonials"), PathClass::Protected);
        assert_eq!(gate.classify("//admin//case-studies"), PathClass::Protected);
        assert_eq!(gate.classify("/admin/login"), PathClass::Login);
        assert_eq!(gate.classify("/admin/login/"), PathClass::Login);
        assert_eq!(gate.classify("/admin/login-help"), PathClass::Protected);
        assert_eq!(gate.classify("/admin/login/extra"), PathClass::Protected);
    }

    #[test]
    fn dot_segments_are_never_public() {
        let gate = Gate::default();
        assert_eq!(gate.classify("/admin/login/.."), PathClass::Protected);
        assert_eq!(gate.classify("/public/../admin"), PathClass::Protected);
        assert_eq!(gate.classify("/./admin/login"), PathClass::Protected);
    }

    #[test]
    fn public_and_login_paths_always_allowed() {
        let gate = Gate::default();
        for path in ["/", "/health", "/admin/login"] {
            assert_eq!(gate.authorize(path, None), GateDecision::Allow);
            assert_eq!(
                gate.authorize(path, Some(&claims(Role::User))),
                GateDecision::Allow
            );
        }
    }

    #[test]
    fn protected_paths_require_admin_role() {
        let gate = Gate::default();
        let redirect = GateDecision::RedirectTo("/admin/login".to_string());
        assert_eq!(gate.authorize("/admin", None), redirect);
        assert_eq!(
            gate.authorize("/admin/case-studies", Some(&claims(Role::User))),
            redirect
        );
        assert_eq!(
            gate.authorize("/admin/case-studies", Some(&claims(Role::Admin))),
            GateDecision::Allow
        );
    }

    #[test]
    fn custom_prefix_is_normalized() {
        let gate = Gate::new("/backoffice/", "//backoffice/sign-in");
        assert_eq!(gate.admin_prefix(), "/backoffice");
        assert_eq!(gate.login_path(), "/backoffice/sign-in");
        assert_eq!(gate.classify("/backoffice/sign-in"), PathClass::Login);
        assert_eq!(gate.classify("/backoffice/users"), PathClass::Protected);
        assert_eq!(gate.classify("/admin"), PathClass::Public);
    }
}
