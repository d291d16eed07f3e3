/**
 * Session Tokens
 *
 * This module handles JWT generation and validation for user sessions.
 * Access tokens are presented as bearer credentials; refresh tokens are only
 * accepted by the refresh endpoint and carry `"type": "refresh"`.
 */

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::backend::auth::users::Identity;
use crate::backend::server::config::JwtConfig;

/// Kind of session token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Bearer credential for API requests
    #[default]
    Access,
    /// Long-lived token exchanged for a new token pair
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Granted roles
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    /// Token type; tokens without one are access tokens
    #[serde(rename = "type", default)]
    pub token_type: TokenType,
    /// Unique token ID
    #[serde(default)]
    pub jti: String,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl Claims {
    /// Expiration as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.exp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Token validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("token signature verification failed")]
    BadSignature,
    #[error("expected {expected:?} token, found {found:?}")]
    WrongType { expected: TokenType, found: TokenType },
    #[error("token service failure: {0}")]
    Internal(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::BadSignature,
            ErrorKind::InvalidKeyFormat => Self::Internal(err.to_string()),
            _ => Self::Malformed(err.to_string()),
        }
    }
}

/// Decodes bearer tokens into claims
///
/// Implementations must be cheap to call per request and must not log above
/// `debug`; the authentication pipeline owns failure logging.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HS256 token issuer and validator
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

impl JwtTokenService {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.clock_skew.as_secs();
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_ttl_secs: config.access_ttl.as_secs(),
            refresh_ttl_secs: config.refresh_ttl.as_secs(),
        }
    }

    /// Create an access token for an identity
    pub fn issue_access_token(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue(identity, TokenType::Access, self.access_ttl_secs)
    }

    /// Create a refresh token for an identity
    pub fn issue_refresh_token(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue(identity, TokenType::Refresh, self.refresh_ttl_secs)
    }

    /// Verify a refresh token
    pub fn validate_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.decode(token)?;
        expect_type(&claims, TokenType::Refresh)?;
        Ok(claims)
    }

    /// Instant until which a revocation of this token must be kept
    ///
    /// Tokens stay valid for the clock skew past their `exp`, so a record
    /// dropped at `exp` would let a revoked token authenticate again.
    pub fn revocation_expiry(&self, claims: &Claims) -> DateTime<Utc> {
        let skew = i64::try_from(self.validation.leeway)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        claims
            .expires_at()
            .checked_add_signed(skew)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn issue(&self, identity: &Identity, token_type: TokenType, ttl_secs: u64) -> Result<String, TokenError> {
        let now = unix_now();
        let claims = Claims {
            sub: identity.id.clone(),
            email: identity.email.clone(),
            roles: identity.authorities.clone(),
            token_type,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now.saturating_add(ttl_secs),
        };
        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Internal(e.to_string()))
    }

    fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        tracing::debug!(jti = %data.claims.jti, "JWT token validated");
        Ok(data.claims)
    }
}

impl TokenValidator for JwtTokenService {
    fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.decode(token)?;
        expect_type(&claims, TokenType::Access)?;
        Ok(claims)
    }
}

fn expect_type(claims: &Claims, expected: TokenType) -> Result<(), TokenError> {
    if claims.token_type == expected {
        Ok(())
    } else {
        Err(TokenError::WrongType { expected, found: claims.token_type })
    }
}

fn unix_now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}
