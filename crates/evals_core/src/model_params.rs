//! Model selection and generation parameters for the judge model.
//!
//! The form keeps a [`UiModelParams`] where every parameter carries an
//! `enabled` toggle. Only enabled parameters reach the stored template
//! (see [`UiModelParams::final_params`]).

use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMPERATURE: f64 = 0.0;
pub const DEFAULT_MAX_TEMPERATURE: f64 = 2.0;
pub const DEFAULT_MAX_TOKENS: u32 = 256;
pub const DEFAULT_TOP_P: f64 = 1.0;

/// Parameters persisted with a template. Absent means "provider default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(
        default,
        rename = "maxTemperature",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

/// A parameter set that failed validation, with the offending field path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{path}: {message}")]
pub struct ParamError {
    pub path: String,
    pub message: String,
}

impl ParamError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            path: format!("modelParams.{field}"),
            message: message.into(),
        }
    }
}

impl ModelParams {
    /// Check the set is well formed: finite numbers in range, positive token cap.
    pub fn validate(&self) -> Result<(), ParamError> {
        let max_temperature = match self.max_temperature {
            Some(m) if !m.is_finite() || m < 0.0 => {
                return Err(ParamError::new(
                    "maxTemperature",
                    "Max temperature must be a non-negative number",
                ))
            }
            Some(m) => m,
            None => DEFAULT_MAX_TEMPERATURE,
        };

        if let Some(t) = self.temperature {
            if !t.is_finite() || t < 0.0 || t > max_temperature {
                return Err(ParamError::new(
                    "temperature",
                    format!("Temperature must be between 0 and {max_temperature}"),
                ));
            }
        }

        if let Some(0) = self.max_tokens {
            return Err(ParamError::new(
                "max_tokens",
                "Max tokens must be a positive integer",
            ));
        }

        if let Some(p) = self.top_p {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(ParamError::new("top_p", "Top p must be between 0 and 1"));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParamSetting<T> {
    pub value: T,
    pub enabled: bool,
}

impl<T> ModelParamSetting<T> {
    pub fn disabled(value: T) -> Self {
        Self {
            value,
            enabled: false,
        }
    }

    pub fn enabled(value: T) -> Self {
        Self {
            value,
            enabled: true,
        }
    }

    fn emit(&self) -> Option<T>
    where
        T: Clone,
    {
        self.enabled.then(|| self.value.clone())
    }
}

/// Editable model selection as held by the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiModelParams {
    pub provider: ModelParamSetting<String>,
    pub model: ModelParamSetting<String>,
    pub temperature: ModelParamSetting<f64>,
    pub max_temperature: ModelParamSetting<f64>,
    pub max_tokens: ModelParamSetting<u32>,
    pub top_p: ModelParamSetting<f64>,
}

impl Default for UiModelParams {
    fn default() -> Self {
        Self {
            provider: ModelParamSetting::disabled(String::new()),
            model: ModelParamSetting::disabled(String::new()),
            temperature: ModelParamSetting::disabled(DEFAULT_TEMPERATURE),
            max_temperature: ModelParamSetting::disabled(DEFAULT_MAX_TEMPERATURE),
            max_tokens: ModelParamSetting::disabled(DEFAULT_MAX_TOKENS),
            top_p: ModelParamSetting::disabled(DEFAULT_TOP_P),
        }
    }
}

impl UiModelParams {
    /// Fold pre-filled values over the current settings. Every value present
    /// in `params` replaces the current one and becomes enabled; values it
    /// lacks keep their current setting.
    pub fn merge_prefilled(&mut self, provider: &str, model: &str, params: &ModelParams) {
        if let Some(v) = params.temperature {
            self.temperature = ModelParamSetting::enabled(v);
        }
        if let Some(v) = params.max_temperature {
            self.max_temperature = ModelParamSetting::enabled(v);
        }
        if let Some(v) = params.max_tokens {
            self.max_tokens = ModelParamSetting::enabled(v);
        }
        if let Some(v) = params.top_p {
            self.top_p = ModelParamSetting::enabled(v);
        }
        self.provider = ModelParamSetting::enabled(provider.to_string());
        self.model = ModelParamSetting::enabled(model.to_string());
    }

    pub fn provider(&self) -> &str {
        &self.provider.value
    }

    pub fn model(&self) -> &str {
        &self.model.value
    }

    pub fn set_provider(&mut self, provider: impl Into<String>) {
        self.provider = ModelParamSetting::enabled(provider.into());
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = ModelParamSetting::enabled(model.into());
    }

    /// Parameters to store with the template: enabled ones only.
    pub fn final_params(&self) -> ModelParams {
        ModelParams {
            temperature: self.temperature.emit(),
            max_temperature: self.max_temperature.emit(),
            max_tokens: self.max_tokens.emit(),
            top_p: self.top_p.emit(),
        }
    }
}
