//! evals_core: domain logic for LLM-as-judge evaluation templates and
//! public API key scopes.
//!
//! Storage and transport live behind the traits in [`ports`]; the Postgres
//! adapter is `evals_postgres` and the HTTP surface is `evals_server`.

pub mod auth;
pub mod error;
pub mod form;
pub mod managed;
pub mod model_params;
pub mod ports;
pub mod referenced_evaluators;
pub mod submit;
pub mod types;
pub mod variables;

pub use error::EvalsError;
