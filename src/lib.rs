//! # cedarcore
//!
//! Backend for the Cedar Core marketing site and its content admin panel.
//!
//! ## Authentication
//!
//! Admin accounts are credential records (`email`, Argon2id `password_hash`,
//! `role`). A successful login mints a stateless HS256 session token carrying the
//! email and role claims; it travels in the `cedarcore_session` cookie (or an
//! `Authorization: Bearer` header) and expires by time only.
//!
//! "Unknown email" and "wrong password" are reported identically.
//!
//! ## Request Gate
//!
//! Every request passes the gate before routing. Paths under `/admin` (except
//! `/admin/login`) require a valid, unexpired token whose role is `admin`;
//! anything else is redirected to the login path. Admitted requests carry a
//! [`api::handlers::auth::Principal`] in their extensions.
//!
//! ## Content
//!
//! Case studies and testimonials are edited under `/admin` and published
//! read-only under `/api`.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
