//! Port traits implemented by evals_postgres (and by test doubles).
//! Core logic depends only on these traits.

use async_trait::async_trait;
use serde::Serialize;

use crate::auth::{AuthError, AuthScope, Credentials};
use crate::error::EvalsError;
use crate::types::{CreateTemplateRequest, EvalTemplate, EvaluatorRef, Project};

pub type Result<T> = std::result::Result<T, EvalsError>;

/// Error returned by the template operations consumed by the form.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(untagged)]
pub enum ServiceError {
    /// The server rejected the request and said why.
    #[error("{message}")]
    Rejected { message: String },

    /// Anything without a usable message (transport failures, odd payloads).
    #[error("{0}")]
    Unstructured(serde_json::Value),
}

impl ServiceError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Text shown to the user: the message verbatim, otherwise the raw
    /// error serialized as JSON.
    pub fn display_message(&self) -> String {
        match self {
            Self::Rejected { message } => message.clone(),
            Self::Unstructured(raw) => raw.to_string(),
        }
    }
}

impl From<EvalsError> for ServiceError {
    fn from(e: EvalsError) -> Self {
        match e {
            // Internal detail stays server-side.
            EvalsError::Database(_) | EvalsError::Internal(_) => {
                Self::rejected("Internal server error")
            }
            other => Self::rejected(other.to_string()),
        }
    }
}

/// Template operations consumed by the authoring form.
#[async_trait]
pub trait TemplateService: Send + Sync {
    /// Create a new template version. Atomic: on error nothing is created.
    /// With `ReferencedEvaluators::Update`, evaluators referencing the name
    /// are repointed to the created version in the same unit of work.
    async fn create_template(
        &self,
        req: CreateTemplateRequest,
    ) -> std::result::Result<EvalTemplate, ServiceError>;

    /// Active evaluator configurations referencing a template name.
    async fn evaluators_by_template_name(
        &self,
        project_id: &str,
        template_name: &str,
    ) -> std::result::Result<Vec<EvaluatorRef>, ServiceError>;
}

/// Read access to projects.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Projects with the given id, soft-deleted ones included. At most one.
    async fn find_projects(&self, project_id: &str) -> Result<Vec<Project>>;
}

/// Resolves API key credentials into an authorization scope.
#[async_trait]
pub trait ApiKeyVerifier: Send + Sync {
    async fn verify(&self, credentials: &Credentials) -> std::result::Result<AuthScope, AuthError>;

    /// Parse the raw header and verify it.
    async fn verify_header(
        &self,
        header: Option<&str>,
    ) -> std::result::Result<AuthScope, AuthError> {
        let credentials = crate::auth::parse_authorization_header(header)?;
        self.verify(&credentials).await
    }
}
