use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod config;
mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;

use approvals::{ApprovalService, ApprovalStore, InMemoryApprovalStore};
use common::database::{DatabaseConfig, init_pool, run_migrations};
use tokio::net::TcpListener;

use crate::{
    config::{ApiConfig, StorageBackend},
    middleware::JwtVerifier,
    repositories::PgApprovalStore,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ApiConfig::load()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting approval service");

    let jwt_verifier = JwtVerifier::from_config(&config.auth)?;

    let (db_pool, store) = match config.storage.backend {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            // Check database connectivity
            if common::database::health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            run_migrations(&pool, &sqlx::migrate!("./migrations")).await?;

            let store: Arc<dyn ApprovalStore> = Arc::new(PgApprovalStore::new(pool.clone()));
            (Some(pool), store)
        }
        StorageBackend::Memory => {
            info!("Keeping approvals in memory");
            let store: Arc<dyn ApprovalStore> = Arc::new(InMemoryApprovalStore::new());
            (None, store)
        }
    };

    let app_state = AppState {
        db_pool,
        approval_service: ApprovalService::new(store),
        jwt_verifier,
    };

    info!("Approval service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Approval service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
