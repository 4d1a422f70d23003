//! Prompt variable extraction.
//!
//! A prompt references its inputs as `{name}` placeholders. The extractor is
//! deliberately lenient: it returns whatever sits between the braces, and
//! [`validate_prompt_variables`] decides whether the prompt is acceptable.

pub const INVALID_VARIABLE_MESSAGE: &str =
    "Variables must only contain letters and underscores (_)";

/// Distinct `{...}` contents in order of first appearance.
///
/// Content is taken verbatim. `{}` is skipped and an unclosed `{` ends the
/// scan.
pub fn extract_variables(prompt: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut rest = prompt;

    while let Some(open) = rest.find('{') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            break;
        };
        let inner = &after_open[..close];
        if !inner.is_empty() && !out.iter().any(|v| v == inner) {
            out.push(inner.to_string());
        }
        rest = &after_open[close + 1..];
    }

    out
}

/// True iff `s` is non-empty and consists of ASCII letters and `_` only.
pub fn is_char_or_underscore(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic() || c == '_')
}

/// Variables shown in the preview list next to the prompt editor.
pub fn preview_variables(prompt: &str) -> Vec<String> {
    extract_variables(prompt)
        .into_iter()
        .filter(|v| is_char_or_underscore(v))
        .collect()
}

/// Reject the prompt if any placeholder contains something other than
/// letters and underscores. Returns the first offending identifier.
pub fn validate_prompt_variables(prompt: &str) -> Result<(), InvalidVariable> {
    match extract_variables(prompt)
        .into_iter()
        .find(|v| !is_char_or_underscore(v))
    {
        Some(name) => Err(InvalidVariable { name }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Variables must only contain letters and underscores (_)")]
pub struct InvalidVariable {
    pub name: String,
}
