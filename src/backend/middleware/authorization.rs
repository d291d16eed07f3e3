/**
 * Authorization Guards
 *
 * Checks that read the security context attached by the authentication
 * middleware. These run after authentication and are the only place a
 * request is rejected for missing credentials.
 *
 * `deny_anonymous` guards every route that no public endpoint rule covers,
 * unknown paths included. `require_authentication` guards a single route.
 */

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::backend::auth::context::SecurityContext;
use crate::backend::auth::pipeline::Authenticator;
use crate::backend::error::BackendError;

const AUTHENTICATION_REQUIRED: &str = "Authentication required";

/// Reject anonymous requests with `401 Unauthorized`
///
/// Apply as a route layer on protected routes:
///
/// ```rust,no_run
/// use axum::{middleware, routing::get, Router};
/// use krawl::backend::middleware::require_authentication;
///
/// let protected: Router = Router::new()
///     .route("/api/users/me", get(|| async { "me" }))
///     .route_layer(middleware::from_fn(require_authentication));
/// ```
pub async fn require_authentication(request: Request, next: Next) -> Result<Response, BackendError> {
    if request.extensions().get::<SecurityContext>().is_none() {
        tracing::debug!(path = request.uri().path(), "Rejected anonymous request to protected route");
        return Err(BackendError::unauthorized(AUTHENTICATION_REQUIRED));
    }
    Ok(next.run(request).await)
}

/// Reject anonymous requests to protected endpoints with `401 Unauthorized`
///
/// Endpoints are classified by the authenticator's public endpoint rules.
/// Anonymous requests to public endpoints pass through.
pub async fn deny_anonymous(
    State(authenticator): State<Arc<Authenticator>>,
    request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let anonymous = request.extensions().get::<SecurityContext>().is_none();
    if anonymous
        && !authenticator
            .public_endpoints()
            .is_public(request.method(), request.uri().path())
    {
        tracing::debug!(
            method = %request.method(),
            path = request.uri().path(),
            "Rejected anonymous request to protected endpoint"
        );
        return Err(BackendError::unauthorized(AUTHENTICATION_REQUIRED));
    }
    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated identity
///
/// Rejects with `401 Unauthorized` when the request is anonymous.
#[derive(Clone, Debug)]
pub struct AuthUser(pub SecurityContext);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| BackendError::unauthorized(AUTHENTICATION_REQUIRED))
    }
}
