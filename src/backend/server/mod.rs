//! Server Module
//!
//! Server-side setup: configuration, application state and app creation.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Environment configuration and database loading
//! └── init.rs         - App creation and background tasks
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `AppConfig::from_env` validates JWT and rule settings
//! 2. **Database**: optional PostgreSQL pool with migrations
//! 3. **State Creation**: authenticator, token service and stores
//! 4. **Background Tasks**: revocation sweep
//! 5. **Router Creation**: routes and middleware
//!
//! # Example
//!
//! ```rust,no_run
//! use krawl::backend::server::{create_app, AppConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let app = create_app(&config).await;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{AppConfig, ConfigError, JwtConfig};
pub use init::{create_app, spawn_revocation_sweep};
pub use state::AppState;
