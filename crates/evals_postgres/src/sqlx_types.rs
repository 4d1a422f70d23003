//! Row shapes returned by the queries in `store.rs` and their conversion into
//! core types.

use chrono::{DateTime, Utc};
use evals_core::auth::{AccessLevel, AuthScope};
use evals_core::model_params::ModelParams;
use evals_core::types::{EvalTemplate, EvaluatorRef, OutputSchema, Project};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PgProjectRow {
    pub id: String,
    pub name: String,
}

impl From<PgProjectRow> for Project {
    fn from(r: PgProjectRow) -> Self {
        Project {
            id: r.id,
            name: r.name,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PgApiKeyRow {
    pub hashed_secret_key: String,
    pub scope: String,
    pub organization_id: String,
    pub project_id: Option<String>,
}

impl TryFrom<PgApiKeyRow> for AuthScope {
    type Error = String;

    fn try_from(r: PgApiKeyRow) -> Result<Self, Self::Error> {
        let access_level = AccessLevel::parse(&r.scope)
            .ok_or_else(|| format!("unknown api key scope: {}", r.scope))?;
        Ok(AuthScope {
            access_level,
            organization_id: r.organization_id,
            project_id: r.project_id,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PgEvalTemplateRow {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub version: i32,
    pub prompt: String,
    pub provider: String,
    pub model: String,
    pub model_params: serde_json::Value,
    pub vars: Vec<String>,
    pub output_schema: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PgEvalTemplateRow> for EvalTemplate {
    type Error = String;

    fn try_from(r: PgEvalTemplateRow) -> Result<Self, Self::Error> {
        let model_params: ModelParams = serde_json::from_value(r.model_params)
            .map_err(|e| format!("eval template {}: bad model_params: {e}", r.id))?;
        let output_schema: OutputSchema = serde_json::from_value(r.output_schema)
            .map_err(|e| format!("eval template {}: bad output_schema: {e}", r.id))?;
        Ok(EvalTemplate {
            id: r.id,
            project_id: r.project_id,
            name: r.name,
            version: r.version,
            prompt: r.prompt,
            provider: r.provider,
            model: r.model,
            model_params,
            vars: r.vars,
            output_schema,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PgEvaluatorRow {
    pub id: String,
    pub eval_template_id: String,
    pub score_name: String,
}

impl From<PgEvaluatorRow> for EvaluatorRef {
    fn from(r: PgEvaluatorRow) -> Self {
        EvaluatorRef {
            id: r.id,
            eval_template_id: r.eval_template_id,
            score_name: r.score_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_row_to_scope() {
        let row = PgApiKeyRow {
            hashed_secret_key: "h".into(),
            scope: "project".into(),
            organization_id: "org-1".into(),
            project_id: Some("proj-1".into()),
        };
        let scope = AuthScope::try_from(row).unwrap();
        assert_eq!(scope, AuthScope::project("org-1", "proj-1"));
    }

    #[test]
    fn api_key_row_unknown_scope() {
        let row = PgApiKeyRow {
            hashed_secret_key: "h".into(),
            scope: "scores".into(),
            organization_id: "org-1".into(),
            project_id: None,
        };
        assert!(AuthScope::try_from(row).is_err());
    }

    #[test]
    fn template_row_decodes_json_columns() {
        let row = PgEvalTemplateRow {
            id: "tpl-1".into(),
            project_id: "proj-1".into(),
            name: "toxicity".into(),
            version: 3,
            prompt: "Is {generation} toxic?".into(),
            provider: "openai".into(),
            model: "gpt-4o".into(),
            model_params: serde_json::json!({ "temperature": 0.5, "max_tokens": 100 }),
            vars: vec!["generation".into()],
            output_schema: serde_json::json!({ "score": "0-1", "reasoning": "why" }),
            created_at: Utc::now(),
        };
        let t = EvalTemplate::try_from(row).unwrap();
        assert_eq!(t.version, 3);
        assert_eq!(t.model_params.temperature, Some(0.5));
        assert_eq!(t.model_params.max_tokens, Some(100));
        assert_eq!(t.output_schema.reasoning, "why");
    }

    #[test]
    fn template_row_with_bad_schema_fails() {
        let row = PgEvalTemplateRow {
            id: "tpl-1".into(),
            project_id: "proj-1".into(),
            name: "toxicity".into(),
            version: 1,
            prompt: "p".into(),
            provider: "openai".into(),
            model: "gpt-4o".into(),
            model_params: serde_json::json!({}),
            vars: vec![],
            output_schema: serde_json::json!("not an object"),
            created_at: Utc::now(),
        };
        let err = EvalTemplate::try_from(row).unwrap_err();
        assert!(err.contains("output_schema"));
    }
}
