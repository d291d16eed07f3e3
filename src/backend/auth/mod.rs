//! Authentication Module
//!
//! This module resolves the identity behind each request and manages the
//! session token lifecycle.
//!
//! # Architecture
//!
//! - **`pipeline`** - Per-request authentication (`Authenticator`)
//! - **`public_endpoints`** - Public/protected endpoint classification
//! - **`sessions`** - JWT generation and validation
//! - **`revocation`** - Revoked token storage
//! - **`users`** - Identity model and loaders
//! - **`context`** - Per-request security context
//! - **`handlers`** - HTTP handlers for token and user endpoints
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs              - Module exports and documentation
//! ├── pipeline.rs         - Authentication pipeline and failure logging
//! ├── public_endpoints.rs - Endpoint rules
//! ├── sessions.rs         - JWT token management
//! ├── revocation.rs       - Revocation stores
//! ├── users.rs            - Identity loaders
//! ├── context.rs          - SecurityContext
//! └── handlers/           - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Extract**: read the `Authorization: Bearer` token, if any
//! 2. **Revocation**: revoked tokens are rejected before decoding
//! 3. **Validate**: signature, expiry and token type are checked
//! 4. **Load**: the token subject is resolved to an identity
//! 5. **Attach**: the security context is added to the request
//!
//! A failure at any step leaves the request anonymous. Protected routes
//! reject anonymous requests; public routes serve them.
//!
//! # Logging
//!
//! Credential failures log at `warn` on protected endpoints and at `debug`
//! on public ones. Unexpected failures always log at `error`.

/// Authentication pipeline
pub mod pipeline;

/// Public endpoint rules
pub mod public_endpoints;

/// JWT token generation and validation
pub mod sessions;

/// Token revocation
pub mod revocation;

/// Identity model and loaders
pub mod users;

/// Per-request security context
pub mod context;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use context::{RequestDetails, SecurityContext};
pub use pipeline::{AuthFailure, Authenticator};
pub use public_endpoints::{EndpointRule, PublicEndpoints, Visibility};
pub use revocation::{InMemoryRevocationStore, PgRevocationStore, RevocationError, RevocationStore};
pub use sessions::{Claims, JwtTokenService, TokenError, TokenType, TokenValidator};
pub use users::{Identity, IdentityError, IdentityLoader, InMemoryIdentityLoader, PgIdentityLoader};
