//! HTTP error responses.
//!
//! Bodies differ per status to stay compatible with existing public API
//! clients: client errors carry `message`, database failures carry `error`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use evals_core::{auth::AuthError, EvalsError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("database failure")]
    Database,

    #[error("internal failure")]
    Internal,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Database | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            Self::Unauthorized(message) | Self::Forbidden(message) => json!({ "message": message }),
            Self::MethodNotAllowed => json!({ "message": "Method not allowed" }),
            Self::Database => json!({ "error": "Internal Server Error" }),
            Self::Internal => json!({ "message": "Internal server error" }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        if let AuthError::Backend(detail) = &e {
            tracing::error!("api key verification failed: {detail}");
        }
        Self::Unauthorized(e.to_string())
    }
}

/// Detail is logged here and never reaches the response body.
impl From<EvalsError> for AppError {
    fn from(e: EvalsError) -> Self {
        if e.is_database() {
            tracing::error!(kind = "database", "request failed: {e}");
            return Self::Database;
        }
        match e {
            EvalsError::Forbidden(m) => Self::Forbidden(m),
            other => {
                tracing::error!(kind = "internal", "request failed: {other}");
                Self::Internal
            }
        }
    }
}
