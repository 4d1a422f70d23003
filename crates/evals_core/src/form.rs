//! Template authoring form as an explicit view-model.
//!
//! Event handlers receive `&mut TemplateForm`. Derived data (the prompt
//! variables) is recomputed on every read and never stored.

use std::fmt;

use serde::Serialize;

use crate::managed::{find_managed_template, ManagedTemplate};
use crate::model_params::{ModelParams, UiModelParams};
use crate::referenced_evaluators::ReferencedEvaluatorsChoice;
use crate::types::{EvalTemplate, OutputSchema, ReferencedEvaluators};
use crate::variables::{preview_variables, validate_prompt_variables};

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedModel {
    pub provider: String,
    pub model: String,
    pub model_params: ModelParams,
}

/// Values a form starts from: a managed template or a stored one.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateFormPrefill {
    pub name: String,
    pub prompt: String,
    pub vars: Vec<String>,
    pub output_schema: OutputSchema,
    pub selected_model: Option<SelectedModel>,
}

impl TemplateFormPrefill {
    pub fn from_managed(template: &ManagedTemplate) -> Self {
        Self {
            name: template.name.to_lowercase(),
            prompt: template.prompt.trim().to_string(),
            vars: Vec::new(),
            output_schema: OutputSchema {
                score: template.output_score.trim().to_string(),
                reasoning: template.output_reasoning.trim().to_string(),
            },
            selected_model: None,
        }
    }

    pub fn from_existing(template: &EvalTemplate) -> Self {
        Self {
            name: template.name.clone(),
            prompt: template.prompt.clone(),
            vars: template.vars.clone(),
            output_schema: template.output_schema.clone(),
            selected_model: Some(SelectedModel {
                provider: template.provider.clone(),
                model: template.model.clone(),
                model_params: template.model_params.clone(),
            }),
        }
    }
}

/// The template being edited, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingTemplate {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormProps {
    pub project_id: String,
    pub existing: Option<ExistingTemplate>,
    pub prefill: Option<TemplateFormPrefill>,
    pub is_editing: bool,
    pub prevent_redirect: bool,
}

impl FormProps {
    pub fn new_template(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            is_editing: true,
            ..Default::default()
        }
    }

    pub fn edit_existing(template: &EvalTemplate) -> Self {
        Self {
            project_id: template.project_id.clone(),
            existing: Some(ExistingTemplate {
                id: template.id.clone(),
                name: template.name.clone(),
            }),
            prefill: Some(TemplateFormPrefill::from_existing(template)),
            is_editing: false,
            prevent_redirect: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Name,
    Prompt,
    OutputScore,
    OutputReasoning,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Prompt => "prompt",
            Self::OutputScore => "outputScore",
            Self::OutputReasoning => "outputReasoning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

/// Field-level errors; submission is blocked while any are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: FormField, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field.as_str(), e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Clone, Default, PartialEq)]
struct FormValues {
    name: String,
    prompt: String,
    output_score: String,
    output_reasoning: String,
    referenced_evaluators: ReferencedEvaluators,
}

/// Field values that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedForm {
    pub name: String,
    pub prompt: String,
    pub vars: Vec<String>,
    pub output_score: String,
    pub output_reasoning: String,
    pub referenced_evaluators: ReferencedEvaluators,
}

#[derive(Debug, Clone)]
pub struct TemplateForm {
    props: FormProps,
    defaults: FormValues,
    values: FormValues,
    model_params: UiModelParams,
    evaluator_choice: Option<ReferencedEvaluatorsChoice>,
    form_error: Option<String>,
    field_errors: ValidationErrors,
}

impl TemplateForm {
    pub fn new(props: FormProps) -> Self {
        let prefill = props.prefill.as_ref();
        let defaults = FormValues {
            name: props
                .existing
                .as_ref()
                .map(|e| e.name.clone())
                .or_else(|| prefill.map(|p| p.name.clone()))
                .unwrap_or_default(),
            prompt: prefill.map(|p| p.prompt.clone()).unwrap_or_default(),
            output_score: prefill
                .map(|p| p.output_schema.score.clone())
                .unwrap_or_default(),
            output_reasoning: prefill
                .map(|p| p.output_schema.reasoning.clone())
                .unwrap_or_default(),
            referenced_evaluators: ReferencedEvaluators::default(),
        };

        let mut model_params = UiModelParams::default();
        if let Some(selected) = prefill.and_then(|p| p.selected_model.as_ref()) {
            model_params.merge_prefilled(
                &selected.provider,
                &selected.model,
                &selected.model_params,
            );
        }

        Self {
            props,
            values: defaults.clone(),
            defaults,
            model_params,
            evaluator_choice: None,
            form_error: None,
            field_errors: ValidationErrors::default(),
        }
    }

    /// Start over from a managed template. The existing template (if any)
    /// and the resolved evaluator count are kept.
    pub fn select_managed_template(&mut self, name: &str) -> bool {
        let Some(template) = find_managed_template(name) else {
            return false;
        };
        let mut props = self.props.clone();
        props.prefill = Some(TemplateFormPrefill::from_managed(template));
        let choice = self.evaluator_choice.take();

        *self = Self::new(props);
        if let Some(choice) = choice {
            self.apply_evaluator_count(choice.evaluator_count());
        }
        true
    }

    pub fn props(&self) -> &FormProps {
        &self.props
    }

    pub fn project_id(&self) -> &str {
        &self.props.project_id
    }

    pub fn existing(&self) -> Option<&ExistingTemplate> {
        self.props.existing.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.props.is_editing
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.props.is_editing = editing;
    }

    pub fn disabled(&self) -> bool {
        !self.props.is_editing
    }

    /// The name input is only shown for new templates.
    pub fn shows_name_field(&self) -> bool {
        self.props.existing.is_none()
    }

    /// The policy control is only offered while editing a stored template.
    pub fn shows_referenced_evaluators(&self) -> bool {
        self.props.is_editing && self.props.existing.is_some()
    }

    pub fn name(&self) -> &str {
        &self.values.name
    }

    pub fn prompt(&self) -> &str {
        &self.values.prompt
    }

    pub fn output_score(&self) -> &str {
        &self.values.output_score
    }

    pub fn output_reasoning(&self) -> &str {
        &self.values.output_reasoning
    }

    pub fn referenced_evaluators(&self) -> ReferencedEvaluators {
        self.values.referenced_evaluators
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        if !self.disabled() {
            self.values.name = name.into();
        }
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        if !self.disabled() {
            self.values.prompt = prompt.into();
        }
    }

    pub fn set_output_score(&mut self, score: impl Into<String>) {
        if !self.disabled() {
            self.values.output_score = score.into();
        }
    }

    pub fn set_output_reasoning(&mut self, reasoning: impl Into<String>) {
        if !self.disabled() {
            self.values.output_reasoning = reasoning.into();
        }
    }

    /// Returns false if the policy is not selectable right now.
    pub fn set_referenced_evaluators(&mut self, policy: ReferencedEvaluators) -> bool {
        if self.disabled() {
            return false;
        }
        let accepted = match self.evaluator_choice.as_mut() {
            Some(choice) => choice.choose(policy),
            None => policy == ReferencedEvaluators::Persist,
        };
        if accepted {
            self.values.referenced_evaluators = policy;
        }
        accepted
    }

    /// Record how many evaluators reference the template and move the
    /// policy to its default for that count.
    pub fn apply_evaluator_count(&mut self, count: usize) {
        let choice = ReferencedEvaluatorsChoice::resolve(count);
        self.values.referenced_evaluators = choice.selected();
        self.evaluator_choice = Some(choice);
    }

    pub fn evaluator_choice(&self) -> Option<&ReferencedEvaluatorsChoice> {
        self.evaluator_choice.as_ref()
    }

    pub fn model_params(&self) -> &UiModelParams {
        &self.model_params
    }

    pub fn model_params_mut(&mut self) -> &mut UiModelParams {
        &mut self.model_params
    }

    /// Variables found in the current prompt, recomputed on each call.
    pub fn variables(&self) -> Vec<String> {
        preview_variables(&self.values.prompt)
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn set_form_error(&mut self, message: impl Into<String>) {
        self.form_error = Some(message.into());
    }

    pub fn clear_form_error(&mut self) {
        self.form_error = None;
    }

    pub fn field_errors(&self) -> &ValidationErrors {
        &self.field_errors
    }

    pub(crate) fn set_field_errors(&mut self, errors: ValidationErrors) {
        self.field_errors = errors;
    }

    /// Restore the initial field values. Model parameters are left as is.
    pub fn reset(&mut self) {
        self.values = self.defaults.clone();
        if let Some(choice) = &self.evaluator_choice {
            self.values.referenced_evaluators = choice.default_policy();
        }
        self.field_errors = ValidationErrors::default();
    }

    pub fn validate(&self) -> Result<ValidatedForm, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let v = &self.values;

        if v.name.is_empty() {
            errors.push(FormField::Name, "Enter a name");
        }
        if v.prompt.is_empty() {
            errors.push(FormField::Prompt, "Enter a prompt");
        } else if let Err(e) = validate_prompt_variables(&v.prompt) {
            errors.push(FormField::Prompt, e.to_string());
        }
        if v.output_score.is_empty() {
            errors.push(FormField::OutputScore, "Enter a score function");
        }
        if v.output_reasoning.is_empty() {
            errors.push(FormField::OutputReasoning, "Enter a reasoning function");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidatedForm {
            name: v.name.clone(),
            prompt: v.prompt.clone(),
            vars: self.variables(),
            output_score: v.output_score.clone(),
            output_reasoning: v.output_reasoning.clone(),
            referenced_evaluators: v.referenced_evaluators,
        })
    }
}
