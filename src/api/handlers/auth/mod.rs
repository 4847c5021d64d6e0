//! Auth handlers and supporting modules.
//!
//! This module covers credential login, stateless session tokens, the admin
//! request gate and password changes.
//!
//! ## Session tokens
//!
//! Tokens are HS256 JWS strings signed with the `--session-secret`. They carry
//! the account email (`sub`), its `role`, `iat`, `exp` and a `jti`. Nothing is
//! stored server side, so rotating the secret signs everybody out.

mod authenticator;
mod error;
pub(crate) mod gate;
mod password;
pub(crate) mod principal;
pub(crate) mod session;
mod state;
pub(crate) mod storage;
pub(crate) mod token;
pub(crate) mod types;
pub(crate) mod utils;

pub use authenticator::PasswordChange;
pub use error::AuthError;
pub use gate::{require_admin, Gate, GateDecision, PathClass, ADMIN_PREFIX, LOGIN_PATH};
pub use principal::{Principal, Role};
pub use state::{AuthConfig, AuthState};
pub use storage::{CredentialRecord, CredentialStore, MemoryCredentialStore, PgCredentialStore};
pub use token::{now_unix_seconds, IssuedSession, SessionClaims, SessionSigner, TokenError};

#[cfg(test)]
pub(crate) use password::hash_password;
