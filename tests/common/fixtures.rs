//! Test fixtures
//!
//! Identities, configurable collaborators and request builders shared by the
//! integration tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header::AUTHORIZATION, request::Parts, Method, Request};
use chrono::{DateTime, Duration, Utc};
use krawl::backend::auth::public_endpoints::PublicEndpoints;
use krawl::backend::auth::revocation::{RevocationError, RevocationStore};
use krawl::backend::auth::sessions::{Claims, TokenError, TokenType, TokenValidator};
use krawl::backend::auth::users::{Identity, IdentityLoader, InMemoryIdentityLoader, ROLE_USER};
use krawl::backend::auth::Authenticator;
use krawl::backend::server::config::AppConfig;

pub const TEST_SECRET: &str = "krawl-test-secret-0123456789abcdef";

pub fn test_config() -> AppConfig {
    AppConfig::builder(TEST_SECRET).build().unwrap()
}

pub fn identity(id: &str) -> Identity {
    Identity {
        id: id.to_string(),
        email: Some(format!("{}@krawl.test", id.to_lowercase())),
        username: Some(format!("user-{}", id.to_lowercase())),
        authorities: vec![ROLE_USER.to_string()],
    }
}

pub async fn identities(known: &[&str]) -> Arc<InMemoryIdentityLoader> {
    let loader = InMemoryIdentityLoader::new();
    for id in known {
        loader.insert(identity(id)).await;
    }
    Arc::new(loader)
}

pub fn in_one_hour() -> DateTime<Utc> {
    Utc::now() + Duration::hours(1)
}

/// Validator with a fixed table of token outcomes
///
/// Unknown tokens are malformed.
#[derive(Default)]
pub struct StubValidator {
    tokens: HashMap<String, Result<Claims, TokenError>>,
}

impl StubValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(mut self, token: &str, subject: &str) -> Self {
        let now = Utc::now().timestamp() as u64;
        let claims = Claims {
            sub: subject.to_string(),
            email: None,
            roles: vec![ROLE_USER.to_string()],
            token_type: TokenType::Access,
            jti: format!("jti-{token}"),
            iat: now,
            exp: now + 3600,
        };
        self.tokens.insert(token.to_string(), Ok(claims));
        self
    }

    pub fn reject(mut self, token: &str, error: TokenError) -> Self {
        self.tokens.insert(token.to_string(), Err(error));
        self
    }
}

impl TokenValidator for StubValidator {
    fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.tokens
            .get(token)
            .cloned()
            .unwrap_or_else(|| Err(TokenError::Malformed("unknown token".to_string())))
    }
}

pub struct PanickingValidator;

impl TokenValidator for PanickingValidator {
    fn validate(&self, _token: &str) -> Result<Claims, TokenError> {
        panic!("validator exploded")
    }
}

/// Revocation store whose backend is unreachable
pub struct FailingRevocationStore;

#[async_trait]
impl RevocationStore for FailingRevocationStore {
    async fn is_revoked(&self, _token: &str) -> Result<bool, RevocationError> {
        Err(RevocationError::Storage(sqlx::Error::PoolTimedOut))
    }

    async fn revoke(&self, _token: &str, _expires_at: DateTime<Utc>) -> Result<bool, RevocationError> {
        Err(RevocationError::Storage(sqlx::Error::PoolTimedOut))
    }

    async fn purge_expired(&self) -> Result<u64, RevocationError> {
        Err(RevocationError::Storage(sqlx::Error::PoolTimedOut))
    }
}

pub struct PanickingRevocationStore;

#[async_trait]
impl RevocationStore for PanickingRevocationStore {
    async fn is_revoked(&self, _token: &str) -> Result<bool, RevocationError> {
        panic!("revocation store exploded")
    }

    async fn revoke(&self, _token: &str, _expires_at: DateTime<Utc>) -> Result<bool, RevocationError> {
        panic!("revocation store exploded")
    }

    async fn purge_expired(&self) -> Result<u64, RevocationError> {
        panic!("revocation store exploded")
    }
}

pub fn authenticator(
    validator: impl TokenValidator + 'static,
    revocations: Arc<dyn RevocationStore>,
    identities: Arc<dyn IdentityLoader>,
) -> Authenticator {
    Authenticator::new(Arc::new(validator), revocations, identities, PublicEndpoints::default())
}

pub fn request(method: Method, path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn request_parts(method: Method, path: &str, token: Option<&str>) -> Parts {
    request(method, path, token).into_parts().0
}
