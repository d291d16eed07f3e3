/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` holds the shared collaborators of the authentication layer:
 * - the request authenticator (used by the authentication middleware)
 * - the token service (issues and validates tokens in the handlers)
 * - the revocation store and identity loader
 * - the cross-origin settings applied by the router
 * - the optional database pool
 *
 * Collaborators sit behind `Arc<dyn Trait>`, so the PostgreSQL and in-memory
 * implementations are interchangeable and cloning the state is cheap.
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::backend::auth::pipeline::Authenticator;
use crate::backend::auth::public_endpoints::PublicEndpoints;
use crate::backend::auth::revocation::{InMemoryRevocationStore, PgRevocationStore, RevocationStore};
use crate::backend::auth::sessions::JwtTokenService;
use crate::backend::auth::users::{IdentityLoader, InMemoryIdentityLoader, PgIdentityLoader};
use crate::backend::server::config::{AppConfig, CorsConfig};

#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
    pub tokens: Arc<JwtTokenService>,
    pub revocations: Arc<dyn RevocationStore>,
    pub identities: Arc<dyn IdentityLoader>,
    pub cors: CorsConfig,
    /// `None` when running on in-memory stores
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// Build the state from configuration
    ///
    /// With a database pool the stores are PostgreSQL-backed; without one
    /// they are held in memory. The in-memory identity loader starts empty,
    /// so bearer tokens resolve to no identity until users are inserted.
    pub fn new(config: &AppConfig, db_pool: Option<PgPool>) -> Self {
        let (revocations, identities): (Arc<dyn RevocationStore>, Arc<dyn IdentityLoader>) = match &db_pool {
            Some(pool) => (
                Arc::new(PgRevocationStore::new(pool.clone())),
                Arc::new(PgIdentityLoader::new(pool.clone())),
            ),
            None => (
                Arc::new(InMemoryRevocationStore::new()),
                Arc::new(InMemoryIdentityLoader::new()),
            ),
        };

        let mut state = Self::with_stores(config, revocations, identities, config.public_endpoints.clone());
        state.db_pool = db_pool;
        state
    }

    /// Build the state around explicit stores
    pub fn with_stores(
        config: &AppConfig,
        revocations: Arc<dyn RevocationStore>,
        identities: Arc<dyn IdentityLoader>,
        public_endpoints: PublicEndpoints,
    ) -> Self {
        let tokens = Arc::new(JwtTokenService::new(&config.jwt));
        let authenticator = Arc::new(Authenticator::new(
            tokens.clone(),
            revocations.clone(),
            identities.clone(),
            public_endpoints,
        ));

        Self {
            authenticator,
            tokens,
            revocations,
            identities,
            cors: config.cors.clone(),
            db_pool: None,
        }
    }
}

impl FromRef<AppState> for Arc<Authenticator> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.authenticator.clone()
    }
}
