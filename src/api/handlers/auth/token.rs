//! HS256 session tokens (compact JWS).
//!
//! Flow Overview:
//! 1) Encode header and claims as base64url JSON.
//! 2) MAC `header.claims` with HMAC-SHA256 keyed by the session secret.
//! 3) On verify, check the algorithm, the MAC (constant time) and then `exp`.
//!
//! Tokens are stateless: there is no revocation list, only expiry.

use anyhow::{anyhow, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use time::OffsetDateTime;
use ulid::Ulid;

use super::principal::Role;

type HmacSha256 = Hmac<Sha256>;

const ALG: &str = "HS256";
const TYP: &str = "JWT";

/// Minimum session secret length in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Account email.
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// A freshly minted token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub claims: SessionClaims,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token format")]
    Format,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("invalid token ttl")]
    InvalidTtl,
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, TokenError> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| TokenError::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Current time as unix seconds.
#[must_use]
pub fn now_unix_seconds() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Signs and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct SessionSigner {
    mac: HmacSha256,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").field("mac", &"***").finish()
    }
}

impl SessionSigner {
    /// Build a signer from the session secret.
    ///
    /// # Errors
    /// Returns an error if the secret is shorter than [`MIN_SECRET_BYTES`].
    pub fn new(secret: &SecretString) -> Result<Self> {
        let key = secret.expose_secret().as_bytes();
        if key.len() < MIN_SECRET_BYTES {
            return Err(anyhow!(
                "session secret must be at least {MIN_SECRET_BYTES} bytes"
            ));
        }
        let mac = HmacSha256::new_from_slice(key).map_err(|_| anyhow!("invalid session secret"))?;
        Ok(Self { mac })
    }

    /// Mint a token for `email` with `role`, valid for `ttl_seconds` from `now_unix_seconds`.
    ///
    /// # Errors
    /// Returns an error if the ttl is not positive or the claims cannot be encoded.
    pub fn issue(
        &self,
        email: &str,
        role: Role,
        ttl_seconds: i64,
        now_unix_seconds: i64,
    ) -> Result<IssuedSession, TokenError> {
        if ttl_seconds <= 0 {
            return Err(TokenError::InvalidTtl);
        }
        let claims = SessionClaims {
            sub: email.to_string(),
            role,
            iat: now_unix_seconds,
            exp: now_unix_seconds.saturating_add(ttl_seconds),
            jti: Ulid::new().to_string(),
        };
        let header = TokenHeader {
            alg: ALG.to_string(),
            typ: TYP.to_string(),
        };
        let signing_input = format!("{}.{}", b64e_json(&header)?, b64e_json(&claims)?);

        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        let signature = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

        Ok(IssuedSession {
            token: format!("{signing_input}.{signature}"),
            claims,
        })
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    /// Returns an error if the token is malformed, uses another algorithm, has a
    /// bad signature, or `exp <= now_unix_seconds`.
    pub fn verify(&self, token: &str, now_unix_seconds: i64) -> Result<SessionClaims, TokenError> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(TokenError::Format)?;
        let claims_b64 = parts.next().ok_or(TokenError::Format)?;
        let sig_b64 = parts.next().ok_or(TokenError::Format)?;
        if parts.next().is_some() {
            return Err(TokenError::Format);
        }

        let header: TokenHeader = b64d_json(header_b64)?;
        if header.alg != ALG || header.typ != TYP {
            return Err(TokenError::UnsupportedAlg(header.alg));
        }

        let signature = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| TokenError::Base64)?;
        let mut mac = self.mac.clone();
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: SessionClaims = b64d_json(claims_b64)?;
        if claims.exp <= now_unix_seconds {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";
    const NOW: i64 = 1_700_000_000;

    fn signer() -> SessionSigner {
        SessionSigner::new(&SecretString::from(SECRET)).unwrap()
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(SessionSigner::new(&SecretString::from("too-short")).is_err());
    }

    #[test]
    fn issued_token_verifies_with_claims() {
        let signer = signer();
        let issued = signer.issue("a@b.com", Role::Admin, 60, NOW).unwrap();
        let claims = signer.verify(&issued.token, NOW + 1).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.sub, "a@b.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp, NOW + 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = signer();
        let issued = signer.issue("a@b.com", Role::Admin, 60, NOW).unwrap();
        assert!(matches!(
            signer.verify(&issued.token, NOW + 60),
            Err(TokenError::Expired)
        ));
        assert!(matches!(
            signer.verify(&issued.token, NOW + 3600),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        assert!(matches!(
            signer().issue("a@b.com", Role::User, 0, NOW),
            Err(TokenError::InvalidTtl)
        ));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let other = SessionSigner::new(&SecretString::from("fedcba9876543210fedcba9876543210")).unwrap();
        let issued = other.issue("a@b.com", Role::Admin, 60, NOW).unwrap();
        assert!(matches!(
            signer().verify(&issued.token, NOW),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn tampered_role_is_rejected() {
        let signer = signer();
        let issued = signer.issue("a@b.com", Role::User, 60, NOW).unwrap();
        let mut parts: Vec<String> = issued.token.split('.').map(str::to_string).collect();
        let mut claims = issued.claims.clone();
        claims.role = Role::Admin;
        parts[1] = b64e_json(&claims).unwrap();
        let forged = parts.join(".");
        assert!(matches!(
            signer.verify(&forged, NOW),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn alg_none_is_rejected() {
        let signer = signer();
        let issued = signer.issue("a@b.com", Role::Admin, 60, NOW).unwrap();
        let header = TokenHeader {
            alg: "none".to_string(),
            typ: TYP.to_string(),
        };
        let mut parts: Vec<String> = issued.token.split('.').map(str::to_string).collect();
        parts[0] = b64e_json(&header).unwrap();
        parts[2] = String::new();
        assert!(matches!(
            signer.verify(&parts.join("."), NOW),
            Err(TokenError::UnsupportedAlg(alg)) if alg == "none"
        ));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let signer = signer();
        assert!(matches!(signer.verify("", NOW), Err(TokenError::Format)));
        assert!(matches!(signer.verify("a.b", NOW), Err(TokenError::Format)));
        assert!(matches!(signer.verify("a.b.c.d", NOW), Err(TokenError::Format)));
        assert!(matches!(
            signer.verify("!!!.b.c", NOW),
            Err(TokenError::Base64)
        ));
    }
}
