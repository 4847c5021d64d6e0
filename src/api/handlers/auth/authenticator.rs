//! Session authenticator: credential checks, token issuance and password change.
//!
//! Flow Overview:
//! - `authenticate`: validate input shape (any non-empty password), load the record, verify the Argon2
//!   hash (a placeholder hash is verified when the record is missing), mint a
//!   session token for the stored email and role.
//! - `change_password`: validate the new password and its confirmation, verify
//!   the current password, store the new hash. Nothing else on the record changes.
//!
//! The read-then-write in `change_password` is not serialized here; concurrent
//! changes for one account rely on the store's own row consistency.

use tracing::{debug, info};

use super::{
    error::AuthError,
    password::{hash_password_blocking, verify_password_blocking},
    state::AuthState,
    token::{now_unix_seconds, IssuedSession},
    utils::{normalize_email, valid_email, valid_password, MIN_PASSWORD_LENGTH},
};

/// Inputs for a password change; `confirm` must repeat `new`.
pub struct PasswordChange<'a> {
    pub current: &'a str,
    pub new: &'a str,
    pub confirm: &'a str,
}

fn password_too_short() -> AuthError {
    AuthError::Validation(format!(
        "Password must be at least {MIN_PASSWORD_LENGTH} characters"
    ))
}

impl AuthState {
    /// Verify credentials and mint a session token.
    ///
    /// # Errors
    /// `Validation` for malformed input, `InvalidCredentials` for an unknown
    /// email or wrong password, `Storage` when the store or hasher fails.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IssuedSession, AuthError> {
        self.authenticate_at(email, password, now_unix_seconds())
            .await
    }

    /// [`AuthState::authenticate`] with an explicit issue time.
    ///
    /// # Errors
    /// See [`AuthState::authenticate`].
    pub async fn authenticate_at(
        &self,
        email: &str,
        password: &str,
        now_unix_seconds: i64,
    ) -> Result<IssuedSession, AuthError> {
        let email = normalize_email(email);
        if !valid_email(&email) {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        let record = self
            .store()
            .find_by_email(&email)
            .await
            .map_err(AuthError::Storage)?;

        let verified = verify_password_blocking(
            password.to_string(),
            record.as_ref().map(|record| record.password_hash.clone()),
        )
        .await
        .map_err(AuthError::Storage)?;

        let Some(record) = record.filter(|_| verified) else {
            debug!("Login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let issued = self
            .signer()
            .issue(
                &record.email,
                record.role,
                self.config().session_ttl_seconds(),
                now_unix_seconds,
            )
            .map_err(|err| AuthError::Storage(err.into()))?;

        info!(role = %record.role, "Session issued");

        Ok(issued)
    }

    /// Replace the password of `email` after checking the current one.
    ///
    /// # Errors
    /// `Validation` when the new password is too short, `PasswordMismatch` when
    /// the confirmation differs, `InvalidCredentials` when the account is
    /// missing or `current` is wrong, `Storage` on store failures. On any error
    /// the stored hash is left untouched.
    pub async fn change_password(
        &self,
        email: &str,
        change: PasswordChange<'_>,
    ) -> Result<(), AuthError> {
        if !valid_password(change.new) {
            return Err(password_too_short());
        }
        if change.new != change.confirm {
            return Err(AuthError::PasswordMismatch);
        }

        let email = normalize_email(email);
        let record = self
            .store()
            .find_by_email(&email)
            .await
            .map_err(AuthError::Storage)?;

        let verified = verify_password_blocking(
            change.current.to_string(),
            record.as_ref().map(|record| record.password_hash.clone()),
        )
        .await
        .map_err(AuthError::Storage)?;

        let Some(record) = record.filter(|_| verified) else {
            debug!("Password change rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let new_hash = hash_password_blocking(change.new.to_string())
            .await
            .map_err(AuthError::Storage)?;

        let updated = self
            .store()
            .update_password_hash(&record.email, &new_hash)
            .await
            .map_err(AuthError::Storage)?;

        if !updated {
            // Record disappeared between read and write.
            return Err(AuthError::InvalidCredentials);
        }

        info!("Password changed");

        Ok(())
    }
}
