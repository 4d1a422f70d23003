//! Postgres adapters for the evals_core port traits.

mod sqlx_types;
pub mod store;

use sqlx::PgPool;

pub use store::{PgApiKeyVerifier, PgProjectStore, PgTemplateService};

const SCHEMA_SQL: &str = include_str!("../migrations/001_eval_templates.sql");

/// All adapters sharing one pool.
pub struct PgStores {
    pub projects: PgProjectStore,
    pub templates: PgTemplateService,
    pub api_keys: PgApiKeyVerifier,
}

impl PgStores {
    pub fn new(pool: PgPool) -> Self {
        Self {
            projects: PgProjectStore::new(pool.clone()),
            templates: PgTemplateService::new(pool.clone()),
            api_keys: PgApiKeyVerifier::new(pool),
        }
    }
}

/// Create the tables this crate reads and writes, if missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Applying eval templates schema");
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}
