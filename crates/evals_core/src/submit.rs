//! Submission of the template form to the create-template operation.

use std::sync::Arc;

use thiserror::Error;

use crate::form::{TemplateForm, ValidationErrors};
use crate::ports::{ServiceError, TemplateService};
use crate::referenced_evaluators::Notice;
use crate::types::{CreateTemplateRequest, EvalTemplate, OutputSchema, ReferencedEvaluators};

pub const NEW_FORM_SUBMIT_EVENT: &str = "eval_templates:new_form_submit";
pub const UPDATE_FORM_SUBMIT_EVENT: &str = "eval_templates:update_form_submit";

/// First problem found in an assembled candidate record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct CandidateError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    /// The form is read-only; nothing was sent.
    #[error("form is not being edited")]
    NotEditing,

    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Candidate(CandidateError),

    #[error(transparent)]
    Service(ServiceError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub template: EvalTemplate,
    /// Detail view of the created template, unless redirection is suppressed.
    pub redirect: Option<String>,
    pub confirmation: Option<Notice>,
}

/// Stricter check on the record about to be sent: a model must be selected
/// and its parameters must be well formed.
pub fn validate_candidate(req: &CreateTemplateRequest) -> Result<(), CandidateError> {
    if req.provider.is_empty() {
        return Err(CandidateError {
            path: "provider".into(),
            message: "Select a provider".into(),
        });
    }
    if req.model.is_empty() {
        return Err(CandidateError {
            path: "model".into(),
            message: "Select a model".into(),
        });
    }
    req.model_params.validate().map_err(|e| CandidateError {
        path: e.path,
        message: e.message,
    })
}

pub fn template_detail_path(project_id: &str, template_id: &str) -> String {
    format!("/project/{project_id}/evals/templates/{template_id}")
}

pub struct TemplateSubmitter {
    service: Arc<dyn TemplateService>,
}

impl TemplateSubmitter {
    pub fn new(service: Arc<dyn TemplateService>) -> Self {
        Self { service }
    }

    /// Ask how many evaluators reference the template being edited and
    /// apply the result to the form. No-op for new templates.
    pub async fn load_evaluator_count(
        &self,
        form: &mut TemplateForm,
    ) -> Result<usize, ServiceError> {
        let Some(existing) = form.existing() else {
            return Ok(0);
        };
        let evaluators = self
            .service
            .evaluators_by_template_name(form.project_id(), &existing.name)
            .await?;
        let count = evaluators.len();
        form.apply_evaluator_count(count);
        Ok(count)
    }

    /// Validate, assemble and create. Errors are also written to the form
    /// (field errors or the top-level form error); the form is only reset
    /// after the template was created.
    pub async fn submit(&self, form: &mut TemplateForm) -> Result<SubmitOutcome, SubmitError> {
        if form.disabled() {
            return Err(SubmitError::NotEditing);
        }
        let event = if form.existing().is_some() {
            UPDATE_FORM_SUBMIT_EVENT
        } else {
            NEW_FORM_SUBMIT_EVENT
        };
        tracing::info!(event, project_id = form.project_id(), "template form submitted");

        form.clear_form_error();

        let values = match form.validate() {
            Ok(v) => v,
            Err(errors) => {
                form.set_field_errors(errors.clone());
                return Err(SubmitError::Validation(errors));
            }
        };
        form.set_field_errors(ValidationErrors::default());

        let params = form.model_params();
        let req = CreateTemplateRequest {
            project_id: form.project_id().to_string(),
            name: values.name,
            prompt: values.prompt,
            provider: params.provider().to_string(),
            model: params.model().to_string(),
            model_params: params.final_params(),
            vars: values.vars,
            output_schema: OutputSchema {
                score: values.output_score,
                reasoning: values.output_reasoning,
            },
            referenced_evaluators: values.referenced_evaluators,
        };

        if let Err(e) = validate_candidate(&req) {
            form.set_form_error(e.to_string());
            return Err(SubmitError::Candidate(e));
        }

        let policy = req.referenced_evaluators;
        let template = match self.service.create_template(req).await {
            Ok(t) => t,
            Err(e) => {
                if let ServiceError::Unstructured(raw) = &e {
                    tracing::error!(error = %raw, "create template failed");
                }
                form.set_form_error(e.display_message());
                return Err(SubmitError::Service(e));
            }
        };

        let confirmation = match (policy, form.existing()) {
            (ReferencedEvaluators::Update, Some(_)) => Some(Notice::evaluators_updated()),
            _ => None,
        };
        let redirect = (!form.props().prevent_redirect)
            .then(|| template_detail_path(&template.project_id, &template.id));

        form.reset();
        form.set_editing(false);

        tracing::debug!(
            template_id = %template.id,
            version = template.version,
            "template created"
        );

        Ok(SubmitOutcome {
            template,
            redirect,
            confirmation,
        })
    }
}
