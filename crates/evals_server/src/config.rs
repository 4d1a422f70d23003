//! Server configuration from environment variables.
//!
//!   EVALS_DATABASE_URL        Postgres connection string (falls back to DATABASE_URL)
//!   EVALS_BIND_ADDR           listen address (default: 0.0.0.0:3030)
//!   EVALS_DB_MAX_CONNECTIONS  pool size (default: 10)
//!   EVALS_AUTO_MIGRATE        create missing tables on startup (default: false)

use anyhow::{anyhow, Context, Result};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3030";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub auto_migrate: bool,
}

impl ServerConfig {
    /// Read from the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("EVALS_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .ok_or_else(|| anyhow!("EVALS_DATABASE_URL or DATABASE_URL must be set"))?;

        let bind_addr = lookup("EVALS_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());

        let max_connections = match lookup("EVALS_DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("EVALS_DB_MAX_CONNECTIONS is not a number: {v}"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let auto_migrate = lookup("EVALS_AUTO_MIGRATE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            auto_migrate,
        })
    }
}
