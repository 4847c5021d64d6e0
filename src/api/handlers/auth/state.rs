//! Auth state and configuration.

use std::sync::Arc;

use super::{gate::Gate, storage::CredentialStore, token::SessionSigner};

const DEFAULT_SESSION_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;
const DEFAULT_PUBLIC_BASE_URL: &str = "https://cedarcore.dev";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    public_base_url: String,
    session_ttl_seconds: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_BASE_URL.to_string())
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new(public_base_url: String) -> Self {
        Self {
            public_base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    /// Only mark cookies secure when the site is served over HTTPS.
    pub(crate) fn session_cookie_secure(&self) -> bool {
        self.public_base_url.starts_with("https://")
    }
}

/// Shared auth context handed to handlers and the gate.
pub struct AuthState {
    config: AuthConfig,
    signer: SessionSigner,
    store: Arc<dyn CredentialStore>,
    gate: Gate,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, signer: SessionSigner, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            config,
            signer,
            store,
            gate: Gate::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn signer(&self) -> &SessionSigner {
        &self.signer
    }

    #[must_use]
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn gate(&self) -> &Gate {
        &self.gate
    }
}
