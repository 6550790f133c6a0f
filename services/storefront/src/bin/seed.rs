//! services/storefront/src/bin/seed.rs
//!
//! Loads a catalog fixture into the configured PostgreSQL database.
//!
//! Usage: `seed [path]`, where `path` defaults to `fixtures/catalog.json`.

use sqlx::postgres::PgPoolOptions;
use storefront_lib::{
    adapters::DbAdapter,
    config::{Config, DatabaseBackend},
    error::ApiError,
    seed::{seed_catalog, CatalogFixture},
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let DatabaseBackend::Postgres(url) = &config.database else {
        return Err(ApiError::Internal(
            "Seeding needs a PostgreSQL DATABASE_URL; in-memory storage does not outlive this process"
                .to_string(),
        ));
    };

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "fixtures/catalog.json".to_string());
    let raw = std::fs::read_to_string(&path)?;
    let fixture: CatalogFixture = serde_json::from_str(&raw)
        .map_err(|e| ApiError::Internal(format!("Invalid fixture {}: {}", path, e)))?;

    let db_pool = PgPoolOptions::new().max_connections(1).connect(url).await?;
    let db_adapter = DbAdapter::new(db_pool);
    db_adapter.run_migrations().await?;

    let report = seed_catalog(&db_adapter, fixture).await?;
    info!(
        categories_created = report.categories_created,
        categories_reused = report.categories_reused,
        books_created = report.books_created,
        "Seeded catalog from {}",
        path
    );
    Ok(())
}
