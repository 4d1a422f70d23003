use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model_params::ModelParams;

/// A project as seen by the public API. Owned by project management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// Instructions telling the judge model how to phrase its verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSchema {
    pub score: String,
    pub reasoning: String,
}

/// What happens to evaluators pinned to the previous template version
/// when a new version is saved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencedEvaluators {
    /// Leave existing evaluators on their current version.
    #[default]
    Persist,
    /// Repoint every referencing evaluator at the new version.
    Update,
}

impl ReferencedEvaluators {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Persist => "persist",
            Self::Update => "update",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "persist" => Some(Self::Persist),
            "update" => Some(Self::Update),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReferencedEvaluators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted evaluation template version. Immutable; edits create a new
/// row with the same name and a higher `version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalTemplate {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub version: i32,
    pub prompt: String,
    pub provider: String,
    pub model: String,
    pub model_params: ModelParams,
    pub vars: Vec<String>,
    pub output_schema: OutputSchema,
    pub created_at: DateTime<Utc>,
}

/// Candidate record assembled by the form and handed to the
/// create-template operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub project_id: String,
    pub name: String,
    pub prompt: String,
    pub provider: String,
    pub model: String,
    pub model_params: ModelParams,
    pub vars: Vec<String>,
    pub output_schema: OutputSchema,
    #[serde(default)]
    pub referenced_evaluators: ReferencedEvaluators,
}

/// An active evaluator configuration that references a template by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatorRef {
    pub id: String,
    pub eval_template_id: String,
    pub score_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referenced_evaluators_defaults_to_persist() {
        assert_eq!(ReferencedEvaluators::default(), ReferencedEvaluators::Persist);
    }

    #[test]
    fn referenced_evaluators_wire_format() {
        assert_eq!(
            serde_json::to_value(ReferencedEvaluators::Update).unwrap(),
            serde_json::json!("update")
        );
        let parsed: ReferencedEvaluators = serde_json::from_str("\"persist\"").unwrap();
        assert_eq!(parsed, ReferencedEvaluators::Persist);
        assert_eq!(ReferencedEvaluators::parse("UPDATE"), Some(ReferencedEvaluators::Update));
        assert_eq!(ReferencedEvaluators::parse("keep"), None);
    }

    #[test]
    fn create_request_without_policy_persists() {
        let json = serde_json::json!({
            "projectId": "p1",
            "name": "toxicity",
            "prompt": "Is {output} toxic?",
            "provider": "openai",
            "model": "gpt-4o",
            "modelParams": {},
            "vars": ["output"],
            "outputSchema": { "score": "0-1", "reasoning": "one sentence" }
        });
        let req: CreateTemplateRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.referenced_evaluators, ReferencedEvaluators::Persist);
        assert_eq!(req.vars, vec!["output"]);
    }
}
