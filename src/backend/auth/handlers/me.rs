/**
 * Get Current User Handler
 *
 * GET /api/users/me returns the identity the authentication middleware
 * resolved for this request.
 */

use axum::response::Json;

use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::middleware::AuthUser;

/// Get current user handler
///
/// # Errors
///
/// * `401 Unauthorized` - If the request carries no valid, unrevoked token
///
/// # Example Response
///
/// ```json
/// {
///   "id": "123e4567-e89b-12d3-a456-426614174000",
///   "email": "user@example.com",
///   "username": "wanderer",
///   "authorities": ["ROLE_USER"]
/// }
/// ```
pub async fn get_me(AuthUser(context): AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(context.identity()))
}
