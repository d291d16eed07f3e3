//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Router assembly and middleware chain
//! └── api_routes.rs   - API endpoints
//! ```
//!
//! # Routes
//!
//! - `GET /actuator/health` - Health check
//! - `POST /api/auth/refresh` - Token refresh with rotation
//! - `POST /api/auth/revoke` - Token revocation
//! - `GET /api/users/me` - Current user (protected)
//!
//! Every request passes through the authentication middleware, which
//! attaches the caller's identity when a valid bearer token is present.

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

pub use router::create_router;
