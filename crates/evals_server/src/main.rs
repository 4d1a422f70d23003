//! evals_server: standalone public API server.
//!
//! Configuration: see `evals_server::config`.

use std::sync::Arc;

use anyhow::Context;
use evals_core::ports::{ApiKeyVerifier, ProjectStore};
use evals_postgres::{ensure_schema, PgStores};
use evals_server::config::ServerConfig;
use evals_server::router::build_router;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,evals_server=debug,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    tracing::info!("Connected to database");

    if config.auto_migrate {
        ensure_schema(&pool).await.context("failed to apply schema")?;
    }

    let stores = PgStores::new(pool);
    let verifier: Arc<dyn ApiKeyVerifier> = Arc::new(stores.api_keys);
    let projects: Arc<dyn ProjectStore> = Arc::new(stores.projects);

    let app = build_router(verifier, projects);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    tracing::info!("evals_server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
