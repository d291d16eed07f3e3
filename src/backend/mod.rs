//! Backend Module
//!
//! Server-side code for the Krawl request authentication service: an Axum
//! HTTP server whose middleware resolves an authenticated identity for every
//! request, plus the token lifecycle endpoints.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, app creation
//! - **`routes`** - Route configuration and middleware chain
//! - **`auth`** - Authentication pipeline, tokens, revocation, identities
//! - **`middleware`** - Authentication middleware and route guards
//! - **`error`** - Backend error types and JSON error responses
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - krawl-server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! `AppState` holds the authenticator and its collaborators behind `Arc`.
//! The per-request `SecurityContext` lives in the request extensions and is
//! never shared between requests.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Authentication and session management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

pub use error::BackendError;
pub use server::create_app;
