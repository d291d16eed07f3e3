//! Authentication Handlers Module
//!
//! HTTP handlers for the token lifecycle and the current user.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── types.rs    - Request and response types
//! ├── refresh.rs  - Token refresh with rotation
//! ├── revoke.rs   - Token revocation (logout)
//! └── me.rs       - Get current user handler
//! ```
//!
//! # Handlers
//!
//! - **`refresh`** - POST /api/auth/refresh
//! - **`revoke`** - POST /api/auth/revoke
//! - **`get_me`** - GET /api/users/me

/// Request and response types
pub mod types;

/// Refresh handler
pub mod refresh;

/// Revoke handler
pub mod revoke;

/// Get current user handler
pub mod me;

pub use types::{MessageResponse, RefreshTokenRequest, RefreshTokenResponse, RevokeTokenRequest, UserResponse};

pub use me::get_me;
pub use refresh::refresh;
pub use revoke::revoke;
