/**
 * Request Authentication Pipeline
 *
 * Resolves the identity behind a request's bearer token, if any:
 *
 * 1. Extract the token from `Authorization: Bearer <token>`
 * 2. Classify the endpoint as public or protected (log severity only)
 * 3. Reject revoked tokens
 * 4. Validate the token and load the subject's identity
 * 5. Build the security context
 *
 * Every failure degrades to an anonymous request. Known credential failures
 * log at `warn` on protected endpoints and `debug` on public ones; unexpected
 * failures, including collaborator panics, always log at `error`.
 */

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap, Method};
use futures_util::FutureExt;
use thiserror::Error;
use tracing::Level;

use crate::backend::auth::context::{RequestDetails, SecurityContext};
use crate::backend::auth::public_endpoints::{PublicEndpoints, Visibility};
use crate::backend::auth::revocation::{RevocationError, RevocationStore};
use crate::backend::auth::sessions::{TokenError, TokenValidator};
use crate::backend::auth::users::{IdentityError, IdentityLoader};

const BEARER_PREFIX: &str = "Bearer ";

/// Why a request ended up anonymous
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("no bearer credentials supplied")]
    NoCredentials,
    #[error("token has been revoked")]
    Revoked,
    #[error("token expired")]
    Expired,
    #[error("token is malformed: {0}")]
    Malformed(String),
    #[error("token signature is invalid")]
    BadSignature,
    #[error("no identity for token subject {0}")]
    IdentityNotFound(String),
    #[error("unexpected authentication failure: {0}")]
    Unexpected(String),
}

impl AuthFailure {
    /// Log level for this failure on an endpoint of the given visibility
    pub fn severity(&self, visibility: Visibility) -> Level {
        match (self, visibility) {
            (Self::NoCredentials, _) => Level::TRACE,
            (Self::Unexpected(_), _) => Level::ERROR,
            (_, Visibility::Protected) => Level::WARN,
            (_, Visibility::Public) => Level::DEBUG,
        }
    }
}

impl From<TokenError> for AuthFailure {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::Expired,
            TokenError::BadSignature => Self::BadSignature,
            TokenError::Malformed(reason) => Self::Malformed(reason),
            wrong @ TokenError::WrongType { .. } => Self::Malformed(wrong.to_string()),
            TokenError::Internal(reason) => Self::Unexpected(reason),
        }
    }
}

impl From<RevocationError> for AuthFailure {
    fn from(err: RevocationError) -> Self {
        Self::Unexpected(err.to_string())
    }
}

impl From<IdentityError> for AuthFailure {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotFound(subject) => Self::IdentityNotFound(subject),
            storage @ IdentityError::Storage(_) => Self::Unexpected(storage.to_string()),
        }
    }
}

/// Extract the bearer token from request headers
///
/// Returns `None` when the header is missing, is not valid text, uses another
/// scheme, or carries a blank token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.trim().is_empty())
}

/// Per-request identity resolution
pub struct Authenticator {
    validator: Arc<dyn TokenValidator>,
    revocations: Arc<dyn RevocationStore>,
    identities: Arc<dyn IdentityLoader>,
    public_endpoints: PublicEndpoints,
}

impl Authenticator {
    pub fn new(
        validator: Arc<dyn TokenValidator>,
        revocations: Arc<dyn RevocationStore>,
        identities: Arc<dyn IdentityLoader>,
        public_endpoints: PublicEndpoints,
    ) -> Self {
        Self {
            validator,
            revocations,
            identities,
            public_endpoints,
        }
    }

    pub fn public_endpoints(&self) -> &PublicEndpoints {
        &self.public_endpoints
    }

    /// Resolve the request's identity, or `None` for an anonymous request
    pub async fn authenticate(&self, parts: &Parts) -> Option<SecurityContext> {
        let method = &parts.method;
        let path = parts.uri.path();

        let Some(token) = bearer_token(&parts.headers) else {
            tracing::trace!(%method, path, "No bearer token on request");
            return None;
        };

        let visibility = self.public_endpoints.classify(method, path);
        let details = RequestDetails::from_parts(parts);

        let outcome = AssertUnwindSafe(self.resolve(token, details))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(AuthFailure::Unexpected(panic_message(panic.as_ref()))));

        match outcome {
            Ok(context) => {
                tracing::debug!(%method, path, subject = context.subject(), "Authenticated request");
                Some(context)
            }
            Err(failure) => {
                log_failure(&failure, visibility, method, path);
                None
            }
        }
    }

    async fn resolve(&self, token: &str, details: RequestDetails) -> Result<SecurityContext, AuthFailure> {
        // Revocation first: a revoked token never reaches signature checks
        if self.revocations.is_revoked(token).await? {
            return Err(AuthFailure::Revoked);
        }

        let claims = self.validator.validate(token)?;
        let identity = self.identities.load(&claims.sub).await?;

        Ok(SecurityContext::new(identity, details))
    }
}

fn log_failure(failure: &AuthFailure, visibility: Visibility, method: &Method, path: &str) {
    let public = visibility == Visibility::Public;
    let level = failure.severity(visibility);
    if level == Level::ERROR {
        tracing::error!(%method, path, public, "JWT authentication failed: {failure}");
    } else if level == Level::WARN {
        tracing::warn!(%method, path, public, "JWT authentication failed: {failure}");
    } else if level == Level::DEBUG {
        tracing::debug!(%method, path, public, "JWT authentication failed: {failure}");
    } else {
        tracing::trace!(%method, path, public, "JWT authentication failed: {failure}");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic during authentication".to_string()
    }
}
