//! Postgres implementations of the evals_core port traits.
//!
//! Each adapter is a newtype wrapping PgPool. All SQL is runtime-checked
//! (sqlx::query_as, not sqlx::query!) to avoid a compile-time DB requirement.

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use evals_core::auth::{hash_secret_key, secret_key_matches, AuthError, AuthScope, Credentials};
use evals_core::error::EvalsError;
use evals_core::ports::{ApiKeyVerifier, ProjectStore, Result, ServiceError, TemplateService};
use evals_core::submit::validate_candidate;
use evals_core::types::{
    CreateTemplateRequest, EvalTemplate, EvaluatorRef, Project, ReferencedEvaluators,
};

use crate::sqlx_types::{PgApiKeyRow, PgEvalTemplateRow, PgEvaluatorRow, PgProjectRow};

fn db_err(e: sqlx::Error) -> EvalsError {
    EvalsError::Database(e.to_string())
}

// ── PgProjectStore ────────────────────────────────────────────

pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn find_projects(&self, project_id: &str) -> Result<Vec<Project>> {
        // No deleted_at filter: callers grey out deleted projects instead of
        // getting an empty list.
        let rows = sqlx::query_as::<_, PgProjectRow>(
            r#"
            SELECT id, name
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Project::from).collect())
    }
}

// ── PgApiKeyVerifier ──────────────────────────────────────────

pub struct PgApiKeyVerifier {
    pool: PgPool,
}

impl PgApiKeyVerifier {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lookup(&self, credentials: &Credentials) -> std::result::Result<Option<PgApiKeyRow>, sqlx::Error> {
        match credentials {
            Credentials::Bearer { secret_key } => {
                sqlx::query_as::<_, PgApiKeyRow>(
                    r#"
                    SELECT hashed_secret_key, scope, organization_id, project_id
                    FROM api_keys
                    WHERE hashed_secret_key = $1
                    "#,
                )
                .bind(hash_secret_key(secret_key))
                .fetch_optional(&self.pool)
                .await
            }
            Credentials::Basic { public_key, .. } => {
                sqlx::query_as::<_, PgApiKeyRow>(
                    r#"
                    SELECT hashed_secret_key, scope, organization_id, project_id
                    FROM api_keys
                    WHERE public_key = $1
                    "#,
                )
                .bind(public_key)
                .fetch_optional(&self.pool)
                .await
            }
        }
    }
}

#[async_trait]
impl ApiKeyVerifier for PgApiKeyVerifier {
    async fn verify(&self, credentials: &Credentials) -> std::result::Result<AuthScope, AuthError> {
        let row = self.lookup(credentials).await.map_err(|e| {
            tracing::error!("api key lookup failed: {e}");
            AuthError::Backend(e.to_string())
        })?;

        let Some(row) = row else {
            return Err(AuthError::InvalidCredentials);
        };
        if !secret_key_matches(credentials.secret_key(), &row.hashed_secret_key) {
            return Err(AuthError::InvalidCredentials);
        }

        AuthScope::try_from(row).map_err(|e| {
            tracing::error!("api key row rejected: {e}");
            AuthError::Backend(e)
        })
    }
}

// ── PgTemplateService ─────────────────────────────────────────

pub struct PgTemplateService {
    pool: PgPool,
}

impl PgTemplateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_version(&self, req: &CreateTemplateRequest) -> Result<EvalTemplate> {
        let model_params = serde_json::to_value(&req.model_params).map_err(|e| anyhow!(e))?;
        let output_schema = serde_json::to_value(&req.output_schema).map_err(|e| anyhow!(e))?;

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Serialise concurrent saves of the same name within a project.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1 || '/' || $2))")
            .bind(&req.project_id)
            .bind(&req.name)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let version: i32 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(MAX(version), 0) + 1
            FROM eval_templates
            WHERE project_id = $1 AND name = $2
            "#,
        )
        .bind(&req.project_id)
        .bind(&req.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        let id = Uuid::new_v4().to_string();
        let row = sqlx::query_as::<_, PgEvalTemplateRow>(
            r#"
            INSERT INTO eval_templates
                (id, project_id, name, version, prompt, provider, model,
                 model_params, vars, output_schema)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, project_id, name, version, prompt, provider, model,
                      model_params, vars, output_schema, created_at
            "#,
        )
        .bind(&id)
        .bind(&req.project_id)
        .bind(&req.name)
        .bind(version)
        .bind(&req.prompt)
        .bind(&req.provider)
        .bind(&req.model)
        .bind(&model_params)
        .bind(&req.vars)
        .bind(&output_schema)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        if req.referenced_evaluators == ReferencedEvaluators::Update {
            let moved = sqlx::query(
                r#"
                UPDATE job_configurations
                SET eval_template_id = $1, updated_at = now()
                WHERE project_id = $2
                  AND status = 'ACTIVE'
                  AND eval_template_id IN (
                      SELECT id FROM eval_templates
                      WHERE project_id = $2 AND name = $3 AND id <> $1
                  )
                "#,
            )
            .bind(&id)
            .bind(&req.project_id)
            .bind(&req.name)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?
            .rows_affected();
            tracing::info!(
                template_id = %id,
                evaluators = moved,
                "repointed evaluators to new template version"
            );
        }

        let template = EvalTemplate::try_from(row).map_err(|e| EvalsError::Internal(anyhow!(e)))?;
        tx.commit().await.map_err(db_err)?;
        Ok(template)
    }
}

#[async_trait]
impl TemplateService for PgTemplateService {
    async fn create_template(
        &self,
        req: CreateTemplateRequest,
    ) -> std::result::Result<EvalTemplate, ServiceError> {
        if req.name.is_empty() {
            return Err(ServiceError::rejected("name: Enter a name"));
        }
        validate_candidate(&req).map_err(|e| ServiceError::rejected(e.to_string()))?;

        self.insert_version(&req).await.map_err(|e| {
            tracing::error!(project_id = %req.project_id, name = %req.name, "create template failed: {e}");
            ServiceError::from(e)
        })
    }

    async fn evaluators_by_template_name(
        &self,
        project_id: &str,
        template_name: &str,
    ) -> std::result::Result<Vec<EvaluatorRef>, ServiceError> {
        let rows = sqlx::query_as::<_, PgEvaluatorRow>(
            r#"
            SELECT jc.id, jc.eval_template_id, jc.score_name
            FROM job_configurations jc
            JOIN eval_templates et ON et.id = jc.eval_template_id
            WHERE jc.project_id = $1
              AND et.name = $2
              AND jc.status = 'ACTIVE'
            ORDER BY jc.created_at
            "#,
        )
        .bind(project_id)
        .bind(template_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("evaluator lookup failed: {e}");
            ServiceError::from(db_err(e))
        })?;
        Ok(rows.into_iter().map(EvaluatorRef::from).collect())
    }
}
