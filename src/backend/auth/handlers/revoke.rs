/**
 * Revoke Handler
 *
 * POST /api/auth/revoke revokes an access token and, optionally, a refresh
 * token, each until its own expiry plus the clock skew. The response is the
 * same whether or not the tokens were valid.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::{MessageResponse, RevokeTokenRequest};
use crate::backend::auth::sessions::{Claims, TokenError, TokenValidator};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

pub const TOKENS_REVOKED: &str = "Tokens revoked successfully";

/// Revoke handler
///
/// Invalid tokens are skipped silently. Only a revocation store failure
/// turns into an error response.
pub async fn revoke(
    State(state): State<AppState>,
    Json(request): Json<RevokeTokenRequest>,
) -> Result<Json<MessageResponse>, BackendError> {
    let access_token = request.access_token.trim();
    revoke_if_valid(&state, access_token, |token| state.tokens.validate(token)).await?;

    if let Some(refresh_token) = request.refresh_token.as_deref().map(str::trim) {
        revoke_if_valid(&state, refresh_token, |token| state.tokens.validate_refresh(token)).await?;
    }

    Ok(Json(MessageResponse::new(TOKENS_REVOKED)))
}

async fn revoke_if_valid(
    state: &AppState,
    token: &str,
    validate: impl Fn(&str) -> Result<Claims, TokenError>,
) -> Result<(), BackendError> {
    if token.is_empty() {
        return Ok(());
    }

    match validate(token) {
        Ok(claims) => {
            state.revocations.revoke(token, state.tokens.revocation_expiry(&claims)).await?;
            Ok(())
        }
        Err(e) => {
            tracing::debug!("Skipping revocation of invalid token: {}", e);
            Ok(())
        }
    }
}
