/**
 * Authentication Middleware
 *
 * Runs the request authentication pipeline for every request and attaches
 * the resolved `SecurityContext` to the request extensions. Requests without
 * valid credentials continue anonymously; this middleware never rejects.
 */

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::backend::auth::context::SecurityContext;
use crate::backend::auth::pipeline::Authenticator;

/// Authentication middleware
///
/// 1. Removes any security context already present on the request
/// 2. Resolves the bearer token, if any, to an identity
/// 3. Attaches the identity for downstream handlers
///
/// Apply with `axum::middleware::from_fn_with_state(authenticator, authenticate_request)`.
pub async fn authenticate_request(
    State(authenticator): State<Arc<Authenticator>>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    // Only a context created below may reach the handlers
    parts.extensions.remove::<SecurityContext>();

    if let Some(context) = authenticator.authenticate(&parts).await {
        parts.extensions.insert(context);
    }

    next.run(Request::from_parts(parts, body)).await
}
