//! Middleware Module
//!
//! HTTP middleware for the backend server, applied in this order:
//!
//! 1. HTTP tracing and CORS (`tower-http`)
//! 2. **`auth`** - resolves the request's identity, never rejects
//! 3. **`authorization`** - guards that reject anonymous requests to
//!    protected endpoints
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{middleware, routing::get, Router};
//! use krawl::backend::middleware::{require_authentication, AuthUser};
//!
//! async fn me(AuthUser(context): AuthUser) -> String {
//!     context.subject().to_string()
//! }
//!
//! let router: Router = Router::new()
//!     .route("/api/users/me", get(me))
//!     .route_layer(middleware::from_fn(require_authentication));
//! ```

pub mod auth;

pub mod authorization;

pub use auth::authenticate_request;
pub use authorization::{deny_anonymous, require_authentication, AuthUser};
