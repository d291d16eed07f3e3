/**
 * API Route Handlers
 *
 * # Routes
 *
 * ## Health
 * - `GET /actuator/health` - Liveness probe
 *
 * ## Authentication
 * - `POST /api/auth/refresh` - Exchange a refresh token for a new pair
 * - `POST /api/auth/revoke` - Revoke tokens (logout)
 *
 * ## Users
 * - `GET /api/users/me` - Current user (requires authentication)
 */

use axum::{
    http::Uri,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};

use crate::backend::auth::handlers::{get_me, refresh, revoke};
use crate::backend::error::BackendError;
use crate::backend::middleware::require_authentication;
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// Protected routes carry the `require_authentication` route layer; all
/// other routes accept anonymous requests.
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    let protected: Router<AppState> = Router::new()
        .route("/api/users/me", get(get_me))
        .route_layer(middleware::from_fn(require_authentication));

    router
        .route("/actuator/health", get(health))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/revoke", post(revoke))
        .merge(protected)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}

/// Fallback for unmatched routes
pub async fn not_found(uri: Uri) -> BackendError {
    BackendError::not_found(format!("No route for {}", uri.path()))
}
