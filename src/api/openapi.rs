use super::handlers::{
    auth::{self, session},
    contact,
    content::{self, case_studies, testimonials},
    health, login_page, settings, ErrorResponse,
};
use utoipa::{
    openapi::{Contact, InfoBuilder, License},
    OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        session::login,
        session::logout,
        session::session,
        login_page::login_page,
        settings::change_password,
        content::dashboard,
        case_studies::public_list,
        case_studies::list,
        case_studies::create,
        case_studies::update,
        case_studies::delete,
        testimonials::public_list,
        testimonials::list,
        testimonials::create,
        testimonials::update,
        testimonials::delete,
        contact::contact,
    ),
    components(schemas(ErrorResponse, auth::Role)),
    tags(
        (name = "health", description = "Service and database status"),
        (name = "auth", description = "Admin login, logout and session introspection"),
        (name = "settings", description = "Admin account settings"),
        (name = "content", description = "Case studies and testimonials"),
        (name = "contact", description = "Public contact form")
    )
)]
struct ApiDoc;

/// The `OpenAPI` document served at `/api-docs/openapi.json`.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();

    // Use Cargo.toml metadata instead of the derive defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();
    info.contact = cargo_contact();
    info.license = optional_str(env!("CARGO_PKG_LICENSE")).map(|identifier| {
        let mut license = License::new(identifier);
        license.identifier = Some(identifier.to_string());
        license
    });
    doc.info = info;

    doc
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let primary = env!("CARGO_PKG_AUTHORS").split(';').next().map(str::trim)?;
    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn optional_str(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|v| !v.is_empty())
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    match author.split_once('<') {
        Some((name, email)) => (
            optional_str(name),
            optional_str(email.trim_end_matches('>')),
        ),
        None => (optional_str(author), None),
    }
}
