/**
 * Token Revocation
 *
 * Revoked tokens are recorded until the moment the token service would stop
 * accepting them, which is their `exp` plus the clock skew. An expired record counts as absent: lookups delete it, and the
 * periodic sweep started by the server removes the rest in bulk.
 */

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Length of the token prefix written to logs
const TOKEN_PREVIEW_LENGTH: usize = 10;

/// A revoked token entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokedToken {
    pub revoked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RevokedToken {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

#[derive(Debug, Error)]
pub enum RevocationError {
    #[error("revocation storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Records and answers token revocations
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Whether the token has been revoked and the record is still live
    async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError>;

    /// Revoke a token until `expires_at`
    ///
    /// Returns `false` if a live record already existed; the first record is kept.
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<bool, RevocationError>;

    /// Delete expired records, returning how many were removed
    async fn purge_expired(&self) -> Result<u64, RevocationError>;
}

pub(crate) fn token_preview(token: &str) -> String {
    let preview: String = token.chars().take(TOKEN_PREVIEW_LENGTH).collect();
    format!("{preview}...")
}

/// Revocation store backed by the `revoked_tokens` table
#[derive(Clone)]
pub struct PgRevocationStore {
    pool: PgPool,
}

impl PgRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocationStore for PgRevocationStore {
    async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError> {
        let now = Utc::now();
        let expires_at: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            SELECT expires_at
            FROM revoked_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        match expires_at {
            None => Ok(false),
            Some(expires_at) if expires_at < now => {
                sqlx::query("DELETE FROM revoked_tokens WHERE token = $1 AND expires_at < $2")
                    .bind(token)
                    .bind(now)
                    .execute(&self.pool)
                    .await?;
                Ok(false)
            }
            Some(_) => Ok(true),
        }
    }

    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<bool, RevocationError> {
        let result = sqlx::query(
            r#"
            INSERT INTO revoked_tokens (id, token, revoked_at, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (token) DO UPDATE
                SET revoked_at = EXCLUDED.revoked_at, expires_at = EXCLUDED.expires_at
                WHERE revoked_tokens.expires_at < EXCLUDED.revoked_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(token)
        .bind(Utc::now())
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected() > 0;
        if inserted {
            tracing::debug!("Token revoked until {}", expires_at);
        } else {
            tracing::debug!("Token already revoked: {}", token_preview(token));
        }
        Ok(inserted)
    }

    async fn purge_expired(&self) -> Result<u64, RevocationError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Revocation store held in memory
#[derive(Default)]
pub struct InMemoryRevocationStore {
    entries: RwLock<HashMap<String, RevokedToken>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Look up the record for a token without applying expiry
    pub async fn get(&self, token: &str) -> Option<RevokedToken> {
        self.entries.read().await.get(token).cloned()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError> {
        let now = Utc::now();
        let expired = match self.entries.read().await.get(token) {
            None => return Ok(false),
            Some(entry) => entry.is_expired(now),
        };

        if !expired {
            return Ok(true);
        }

        // A concurrent revoke may have replaced the record since the read
        let mut entries = self.entries.write().await;
        match entries.get(token) {
            Some(entry) if !entry.is_expired(now) => Ok(true),
            Some(_) => {
                entries.remove(token);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<bool, RevocationError> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        if entries.get(token).is_some_and(|entry| !entry.is_expired(now)) {
            tracing::debug!("Token already revoked: {}", token_preview(token));
            return Ok(false);
        }

        entries.insert(
            token.to_string(),
            RevokedToken {
                revoked_at: now,
                expires_at,
            },
        );
        tracing::debug!("Token revoked until {}", expires_at);
        Ok(true)
    }

    async fn purge_expired(&self) -> Result<u64, RevocationError> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        Ok((before - entries.len()) as u64)
    }
}
