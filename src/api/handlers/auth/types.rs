//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use super::principal::Role;

#[derive(ToSchema, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "identifier")]
    pub email: String,
    #[serde(alias = "secret")]
    #[schema(format = Password)]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Deserialize)]
pub struct ChangePasswordRequest {
    #[schema(format = Password)]
    pub current_password: String,
    #[schema(format = Password)]
    pub new_password: String,
    #[schema(format = Password)]
    pub confirm_password: String,
}

impl fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangePasswordRequest")
            .field("current_password", &"***")
            .field("new_password", &"***")
            .field("confirm_password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub email: String,
    pub role: Role,
    /// Unix seconds.
    pub expires_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn login_request_accepts_field_aliases() -> Result<()> {
        let request: LoginRequest =
            serde_json::from_str(r#"{"identifier":"a@b.com","secret":"secret1"}"#)?;
        assert_eq!(request.email, "a@b.com");
        assert_eq!(request.password, "secret1");

        let request: LoginRequest =
            serde_json::from_str(r#"{"email":"a@b.com","password":"secret1"}"#)?;
        assert_eq!(request.email, "a@b.com");
        Ok(())
    }

    #[test]
    fn login_request_debug_redacts_password() -> Result<()> {
        let request: LoginRequest =
            serde_json::from_str(r#"{"email":"a@b.com","password":"hunter22"}"#)?;
        assert!(!format!("{request:?}").contains("hunter22"));
        Ok(())
    }
}
