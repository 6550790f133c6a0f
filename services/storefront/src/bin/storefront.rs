//! services/storefront/src/bin/storefront.rs

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use storefront_core::ports::DatabaseService;
use storefront_lib::{
    adapters::{DbAdapter, HmacTokenService, LogMailer, MemoryAdapter},
    config::{Config, DatabaseBackend},
    error::ApiError,
    web::{router, state::AppState},
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Storage & Run Migrations ---
    let db: Arc<dyn DatabaseService> = match &config.database {
        DatabaseBackend::Postgres(url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            let purged = db_adapter.purge_expired_sessions().await?;
            info!("Purged {} expired visitor sessions.", purged);
            Arc::new(db_adapter)
        }
        DatabaseBackend::Memory => {
            warn!("Using in-memory storage; nothing will survive a restart.");
            Arc::new(MemoryAdapter::new())
        }
    };

    // --- 3. Initialize Service Adapters ---
    let mailer = Arc::new(LogMailer::new(config.mail_from.clone()));
    let tokens = Arc::new(
        HmacTokenService::new(&config.secret_key, config.activation_timeout)
            .map_err(|e| ApiError::Internal(format!("Invalid SECRET_KEY: {}", e)))?,
    );

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db,
        mailer,
        tokens,
        config: config.clone(),
    });

    // --- 5. Create the Web Router ---
    let app = router(app_state);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
