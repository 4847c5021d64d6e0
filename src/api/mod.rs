use crate::api::handlers::{
    auth::{self, require_admin, AuthState, PgCredentialStore, ADMIN_PREFIX, LOGIN_PATH},
    contact as contact_handler,
    content::{self, case_studies, testimonials, PgContentStore, SharedContentStore},
    health, login_page, root, settings, ErrorResponse,
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa_swagger_ui::SwaggerUi;

pub mod contact;
pub mod handlers;
mod openapi;

pub use openapi::openapi;

use self::contact::{ContactSender, LogContactSender};


/// Build the application router.
///
/// The request gate wraps every route, so anything under the admin prefix
/// (apart from the login page) needs an admin session.
pub fn app(
    auth_state: Arc<AuthState>,
    content_store: SharedContentStore,
    contact_sender: Arc<dyn ContactSender>,
) -> Router {
    let admin = |path: &str| format!("{ADMIN_PREFIX}{path}");

    Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::health).options(health::health))
        .route("/api/auth/login", post(auth::session::login))
        .route("/api/auth/logout", post(auth::session::logout))
        .route("/api/auth/session", get(auth::session::session))
        .route("/api/case-studies", get(case_studies::public_list))
        .route("/api/testimonials", get(testimonials::public_list))
        .route("/api/contact", post(contact_handler::contact))
        .route(LOGIN_PATH, get(login_page::login_page))
        .route(ADMIN_PREFIX, get(content::dashboard))
        .route(
            &admin("/case-studies"),
            get(case_studies::list).post(case_studies::create),
        )
        .route(
            &admin("/case-studies/:id"),
            put(case_studies::update).delete(case_studies::delete),
        )
        .route(
            &admin("/testimonials"),
            get(testimonials::list).post(testimonials::create),
        )
        .route(
            &admin("/testimonials/:id"),
            put(testimonials::update).delete(testimonials::delete),
        )
        .route(
            &admin("/settings/password"),
            post(settings::change_password),
        )
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi()))
        .fallback(not_found)
        .layer(from_fn_with_state(auth_state.clone(), require_admin))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(auth_state))
                .layer(Extension(content_store))
                .layer(Extension(contact_sender)),
        )
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found")))
}

/// Start the server
/// # Errors
/// Return error if the database is unreachable or the listener fails
pub async fn new(
    port: u16,
    dsn: SecretString,
    auth_config: auth::AuthConfig,
    signer: auth::SessionSigner,
) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn.expose_secret())
        .await
        .context("Failed to connect to database")?;

    let auth_state = Arc::new(AuthState::new(
        auth_config,
        signer,
        Arc::new(PgCredentialStore::new(pool.clone())),
    ));
    let content_store: SharedContentStore = Arc::new(PgContentStore::new(pool));
    let contact_sender: Arc<dyn ContactSender> = Arc::new(LogContactSender);

    let app = app(auth_state, content_store, contact_sender);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Gracefully shutdown");
            }
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
