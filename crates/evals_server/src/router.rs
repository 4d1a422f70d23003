//! Router construction for the evals server.

use std::sync::Arc;

use axum::{
    routing::{any, get},
    Extension, Router,
};
use evals_core::ports::{ApiKeyVerifier, ProjectStore};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::handlers::projects::PROJECTS_PATH;

/// Build the full axum router with all routes and middleware.
pub fn build_router(
    verifier: Arc<dyn ApiKeyVerifier>,
    projects: Arc<dyn ProjectStore>,
) -> Router {
    // Every method reaches the handler so that auth is checked before the
    // method is rejected.
    let public_api = Router::new().route(PROJECTS_PATH, any(handlers::projects::projects));

    Router::new()
        .route("/health", get(handlers::health::health))
        .merge(public_api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .layer(Extension(verifier))
        .layer(Extension(projects))
}
