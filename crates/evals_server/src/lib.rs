//! evals_server: public REST API for eval templates.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
