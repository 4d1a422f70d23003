//! /api/public/projects: the project an API key belongs to.
//!
//! Authentication runs before the method check, so an unauthenticated POST
//! gets 401 rather than 405.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::AUTHORIZATION, HeaderMap, Method},
    Json,
};
use evals_core::{
    auth::AuthError,
    ports::{ApiKeyVerifier, ProjectStore},
    types::Project,
};
use serde::Serialize;

use crate::error::AppError;

pub const PROJECTS_PATH: &str = "/api/public/projects";

/// Always a list, although the filter matches at most one project.
#[derive(Debug, Serialize)]
pub struct ProjectsResponse {
    pub data: Vec<Project>,
}

pub async fn projects(
    method: Method,
    headers: HeaderMap,
    Extension(verifier): Extension<Arc<dyn ApiKeyVerifier>>,
    Extension(store): Extension<Arc<dyn ProjectStore>>,
) -> Result<Json<ProjectsResponse>, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::MalformedHeader))
        .transpose()?;
    let scope = verifier.verify_header(header).await?;
    let project_id = scope.require_project()?;

    if method != Method::GET {
        tracing::error!("Method not allowed for {method} on {PROJECTS_PATH}");
        return Err(AppError::MethodNotAllowed);
    }

    // No rate limit here: clients call this as an auth check on startup.
    let data = store.find_projects(project_id).await?;
    Ok(Json(ProjectsResponse { data }))
}
