//! Credential record storage.
//!
//! The authenticator only needs two operations: look a record up by email and
//! overwrite its password hash. `PgCredentialStore` backs them with the `users`
//! table; `MemoryCredentialStore` keeps records in process.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info_span, Instrument};

use super::{principal::Role, utils::normalize_email};

/// Stored identifier + secret hash + role for one account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialRecord {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a record by its normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>>;

    /// Replace the password hash; returns `false` when no record matched.
    async fn update_password_hash(&self, email: &str, password_hash: &str) -> Result<bool>;

    /// Check the backing store is reachable.
    async fn ping(&self) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>> {
        let query = "SELECT email, password_hash, role FROM users WHERE email = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup credential record")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let role: String = row.try_get("role")?;
        Ok(Some(CredentialRecord {
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: role.parse().context("invalid role on credential record")?,
        }))
    }

    async fn update_password_hash(&self, email: &str, password_hash: &str) -> Result<bool> {
        let query = "UPDATE users SET password_hash = $1 WHERE email = $2";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(password_hash)
            .bind(email)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to update password hash")?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<()> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("failed to acquire database connection")?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("failed to ping database")
    }
}

/// In-process credential store keyed by normalized email.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    records: RwLock<HashMap<String, CredentialRecord>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new(records: impl IntoIterator<Item = CredentialRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|mut record| {
                record.email = normalize_email(&record.email);
                (record.email.clone(), record)
            })
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>> {
        Ok(self.records.read().await.get(email).cloned())
    }

    async fn update_password_hash(&self, email: &str, password_hash: &str) -> Result<bool> {
        let mut records = self.records.write().await;
        Ok(records.get_mut(email).is_some_and(|record| {
            record.password_hash = password_hash.to_string();
            true
        }))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
