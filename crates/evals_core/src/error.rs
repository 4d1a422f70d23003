use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalsError {
    /// The caller is authenticated but its scope does not cover the request.
    /// Carries the message shown to the caller.
    #[error("{0}")]
    Forbidden(String),

    /// Failure raised by the persistence layer (driver, pool, query).
    #[error("database: {0}")]
    Database(String),

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

impl EvalsError {
    pub fn is_database(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}
