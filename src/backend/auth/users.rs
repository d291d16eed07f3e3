/**
 * User Identities
 *
 * This module resolves token subjects to user identities. The PostgreSQL
 * loader reads the `users` table; the in-memory loader backs tests and
 * database-less development runs.
 */

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Authority granted to every registered user
pub const ROLE_USER: &str = "ROLE_USER";

/// Identity resolved from a token subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User ID (the token subject)
    pub id: String,
    /// User email address
    pub email: Option<String>,
    /// Username
    pub username: Option<String>,
    /// Granted authorities
    pub authorities: Vec<String>,
}

/// Identity lookup errors
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("user not found: {0}")]
    NotFound(String),
    #[error("identity storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Loads the identity behind a token subject
#[async_trait]
pub trait IdentityLoader: Send + Sync {
    async fn load(&self, subject: &str) -> Result<Identity, IdentityError>;
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    username: Option<String>,
}

impl From<UserRow> for Identity {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id.to_string(),
            email: Some(row.email),
            username: row.username,
            authorities: vec![ROLE_USER.to_string()],
        }
    }
}

/// Identity loader backed by the `users` table
#[derive(Clone)]
pub struct PgIdentityLoader {
    pool: PgPool,
}

impl PgIdentityLoader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityLoader for PgIdentityLoader {
    async fn load(&self, subject: &str) -> Result<Identity, IdentityError> {
        // Subjects are user UUIDs; anything else cannot name a user
        let id = Uuid::parse_str(subject).map_err(|_| IdentityError::NotFound(subject.to_string()))?;

        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, username
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| IdentityError::NotFound(subject.to_string()))?;

        Ok(user.into())
    }
}

/// Identity loader holding identities in memory
#[derive(Default)]
pub struct InMemoryIdentityLoader {
    identities: RwLock<HashMap<String, Identity>>,
}

impl InMemoryIdentityLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an identity
    pub async fn insert(&self, identity: Identity) {
        self.identities.write().await.insert(identity.id.clone(), identity);
    }

    /// Remove an identity, returning it if present
    pub async fn remove(&self, subject: &str) -> Option<Identity> {
        self.identities.write().await.remove(subject)
    }
}

#[async_trait]
impl IdentityLoader for InMemoryIdentityLoader {
    async fn load(&self, subject: &str) -> Result<Identity, IdentityError> {
        self.identities
            .read()
            .await
            .get(subject)
            .cloned()
            .ok_or_else(|| IdentityError::NotFound(subject.to_string()))
    }
}
