//! Krawl - Request Authentication Service
//!
//! Krawl is the backend of a location-discovery and walking-tour app. This
//! crate provides its request authentication layer: every request passes
//! through a pipeline that resolves an optional bearer token to a user
//! identity without ever rejecting the request itself.
//!
//! # Overview
//!
//! - Bearer token extraction and JWT validation (HS256)
//! - Token revocation with expiry-bound records and a periodic sweep
//! - Identity loading from PostgreSQL or memory
//! - Public/protected endpoint classification driving log severity
//! - Token refresh with rotation, token revocation, current-user endpoint
//!
//! # Usage
//!
//! ```rust,no_run
//! use krawl::backend::server::{create_app, AppConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let app = create_app(&config).await;
//! let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.server_port)).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `AuthFailure` describes why a request stayed anonymous; it is logged,
//!   never returned
//! - `BackendError` is the HTTP error type of handlers and route guards
//! - `ConfigError` aborts startup

/// Backend server-side code
pub mod backend;
