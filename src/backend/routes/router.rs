/**
 * Router Configuration
 *
 * This module combines all route configurations into a single Axum router
 * and applies the middleware chain.
 *
 * # Middleware Order
 *
 * Outermost first:
 * 1. HTTP tracing (`TraceLayer`)
 * 2. CORS (`CorsLayer`), which answers preflight requests itself
 * 3. Request authentication (`authenticate_request`)
 * 4. Default deny for anonymous requests to protected endpoints (`deny_anonymous`)
 * 5. Route guards (`require_authentication`, protected routes only)
 */

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN},
        HeaderName, Method,
    },
    middleware, Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::backend::middleware::{authenticate_request, deny_anonymous};
use crate::backend::routes::api_routes::{configure_api_routes, not_found};
use crate::backend::server::config::CorsConfig;
use crate::backend::server::state::AppState;

const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");

/// Create the Axum router with all routes configured
///
/// Unknown routes fall back to a JSON `404`. The fallback runs behind the
/// same middleware as every other route, so an anonymous request to an
/// unknown protected path gets a `401` instead.
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_api_routes(Router::new()).fallback(not_found);

    apply_middleware(router, app_state.clone()).with_state(app_state)
}

/// Apply the global middleware chain
///
/// `Router::layer` wraps existing layers, so the last layer added runs first.
fn apply_middleware(router: Router<AppState>, app_state: AppState) -> Router<AppState> {
    let cors = cors_layer(&app_state.cors);
    router
        .layer(middleware::from_fn_with_state(app_state.clone(), deny_anonymous))
        .layer(middleware::from_fn_with_state(app_state, authenticate_request))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.origin_headers()))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, X_REQUESTED_WITH, ACCEPT, ORIGIN])
        .allow_credentials(true)
        .max_age(config.max_age)
}
