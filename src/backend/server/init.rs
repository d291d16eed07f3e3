/**
 * Server Initialization
 *
 * This module builds the Axum application from configuration.
 *
 * # Initialization Process
 *
 * 1. Connect to the database, if configured, and run migrations
 * 2. Create the application state (PostgreSQL or in-memory stores)
 * 3. Start the periodic revocation sweep
 * 4. Create the router with all routes and middleware
 */

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::task::JoinHandle;

use crate::backend::auth::revocation::RevocationStore;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, AppConfig};
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
///
/// A database that is configured but unreachable is logged and replaced by
/// in-memory stores; the server still starts.
pub async fn create_app(config: &AppConfig) -> Router<()> {
    tracing::info!("Initializing Krawl authentication server");

    let db_pool = load_database(config.database_url.as_deref()).await;
    let app_state = AppState::new(config, db_pool);

    spawn_revocation_sweep(app_state.revocations.clone(), config.revocation_sweep_interval);

    tracing::info!(
        public_rules = config.public_endpoints.len(),
        "Router configured with periodic revocation sweep"
    );

    create_router(app_state)
}

/// Shortest interval between sweeps
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically delete expired revocation records
///
/// The first sweep runs immediately. Store errors are logged and the next
/// tick tries again. A zero interval is raised to one second.
pub fn spawn_revocation_sweep(store: Arc<dyn RevocationStore>, every: Duration) -> JoinHandle<()> {
    let every = if every.is_zero() {
        tracing::warn!("Revocation sweep interval is zero, using {:?}", MIN_SWEEP_INTERVAL);
        MIN_SWEEP_INTERVAL
    } else {
        every
    };

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match store.purge_expired().await {
                Ok(purged) => tracing::info!("Purged {} expired revoked tokens", purged),
                Err(e) => tracing::error!("Failed to purge expired revoked tokens: {}", e),
            }
        }
    })
}
