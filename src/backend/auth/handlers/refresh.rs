/**
 * Refresh Handler
 *
 * POST /api/auth/refresh exchanges a refresh token for a new token pair.
 * The presented refresh token is revoked as part of the exchange, so each
 * refresh token can be used once.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::{RefreshTokenRequest, RefreshTokenResponse};
use crate::backend::auth::revocation::token_preview;
use crate::backend::auth::users::IdentityError;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

const INVALID_REFRESH_TOKEN: &str = "Invalid refresh token";

/// Refresh handler
///
/// # Errors
///
/// * `400 Bad Request` - If the refresh token is missing or blank
/// * `401 Unauthorized` - If the token is invalid, expired, not a refresh
///   token, already revoked, or its user no longer exists
/// * `500 Internal Server Error` - If the revocation store or user lookup fails
///
/// # Example Request
///
/// ```http
/// POST /api/auth/refresh HTTP/1.1
/// Content-Type: application/json
///
/// { "refreshToken": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9..." }
/// ```
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<RefreshTokenResponse>, BackendError> {
    let token = request.refresh_token.trim();
    if token.is_empty() {
        return Err(BackendError::bad_request("refreshToken must not be blank"));
    }

    let claims = state.tokens.validate_refresh(token).map_err(|e| {
        tracing::debug!("Refresh rejected: {}", e);
        BackendError::from(e)
    })?;

    if state.revocations.is_revoked(token).await? {
        tracing::warn!("Attempted refresh with revoked token {}", token_preview(token));
        return Err(BackendError::unauthorized(INVALID_REFRESH_TOKEN));
    }

    let identity = match state.identities.load(&claims.sub).await {
        Ok(identity) => identity,
        Err(IdentityError::NotFound(subject)) => {
            tracing::warn!("Refresh token subject {} no longer exists", subject);
            return Err(BackendError::unauthorized(INVALID_REFRESH_TOKEN));
        }
        Err(e) => return Err(BackendError::internal(e.to_string())),
    };

    // Rotation: the presented token is spent before new tokens are issued.
    // Only the request that records the revocation may proceed.
    if !state.revocations.revoke(token, state.tokens.revocation_expiry(&claims)).await? {
        tracing::warn!("Concurrent refresh with token {}", token_preview(token));
        return Err(BackendError::unauthorized(INVALID_REFRESH_TOKEN));
    }

    let response = RefreshTokenResponse {
        access_token: state.tokens.issue_access_token(&identity)?,
        refresh_token: state.tokens.issue_refresh_token(&identity)?,
    };

    tracing::info!("Issued refreshed tokens for user {}", identity.id);
    Ok(Json(response))
}
