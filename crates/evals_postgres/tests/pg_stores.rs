//! Database integration tests for the Postgres adapters.
//!
//! Requires a running PostgreSQL database.
//! Run with: DATABASE_URL="postgresql:///evals_test" cargo test -p evals_postgres --test pg_stores -- --ignored --nocapture

use evals_core::auth::{hash_secret_key, AuthError, AuthScope, Credentials};
use evals_core::model_params::ModelParams;
use evals_core::ports::{ApiKeyVerifier, ProjectStore, TemplateService};
use evals_core::types::{CreateTemplateRequest, OutputSchema, ReferencedEvaluators};
use evals_postgres::{ensure_schema, PgStores};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

async fn test_pool() -> PgPool {
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("failed to connect to test database");
    ensure_schema(&pool).await.expect("schema");
    pool
}

async fn seed_project(pool: &PgPool, deleted: bool) -> String {
    let id = format!("proj-{}", Uuid::new_v4());
    sqlx::query(
        "INSERT INTO projects (id, org_id, name, deleted_at) VALUES ($1, 'org-test', $2, CASE WHEN $3 THEN now() END)",
    )
    .bind(&id)
    .bind(format!("name of {id}"))
    .bind(deleted)
    .execute(pool)
    .await
    .unwrap();
    id
}

fn request(project_id: &str, name: &str, policy: ReferencedEvaluators) -> CreateTemplateRequest {
    CreateTemplateRequest {
        project_id: project_id.into(),
        name: name.into(),
        prompt: "Is {output} relevant to {input}?".into(),
        provider: "openai".into(),
        model: "gpt-4o".into(),
        model_params: ModelParams {
            temperature: Some(0.0),
            ..Default::default()
        },
        vars: vec!["output".into(), "input".into()],
        output_schema: OutputSchema {
            score: "0 to 1".into(),
            reasoning: "one sentence".into(),
        },
        referenced_evaluators: policy,
    }
}

#[tokio::test]
#[ignore] // requires DATABASE_URL
async fn find_projects_includes_soft_deleted() {
    let pool = test_pool().await;
    let stores = PgStores::new(pool.clone());
    let id = seed_project(&pool, true).await;

    let projects = stores.projects.find_projects(&id).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].id, id);

    let none = stores.projects.find_projects("does-not-exist").await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
#[ignore] // requires DATABASE_URL
async fn api_key_verification() {
    let pool = test_pool().await;
    let stores = PgStores::new(pool.clone());
    let project_id = seed_project(&pool, false).await;
    let public_key = format!("pk-{}", Uuid::new_v4());
    let secret_key = format!("sk-{}", Uuid::new_v4());

    sqlx::query(
        "INSERT INTO api_keys (id, public_key, hashed_secret_key, scope, organization_id, project_id) VALUES ($1, $2, $3, 'project', 'org-test', $4)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&public_key)
    .bind(hash_secret_key(&secret_key))
    .bind(&project_id)
    .execute(&pool)
    .await
    .unwrap();

    let scope = stores
        .api_keys
        .verify(&Credentials::Basic {
            public_key: public_key.clone(),
            secret_key: secret_key.clone(),
        })
        .await
        .unwrap();
    assert_eq!(scope, AuthScope::project("org-test", project_id.clone()));

    let scope = stores
        .api_keys
        .verify(&Credentials::Bearer {
            secret_key: secret_key.clone(),
        })
        .await
        .unwrap();
    assert_eq!(scope.authorized_project_id(), Some(project_id.as_str()));

    let err = stores
        .api_keys
        .verify(&Credentials::Basic {
            public_key,
            secret_key: "wrong".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
}

#[tokio::test]
#[ignore] // requires DATABASE_URL
async fn versions_increment_and_update_repoints_evaluators() {
    let pool = test_pool().await;
    let stores = PgStores::new(pool.clone());
    let project_id = seed_project(&pool, false).await;

    let v1 = stores
        .templates
        .create_template(request(&project_id, "relevance", ReferencedEvaluators::Persist))
        .await
        .unwrap();
    assert_eq!(v1.version, 1);

    sqlx::query(
        "INSERT INTO job_configurations (id, project_id, eval_template_id, score_name) VALUES ($1, $2, $3, 'relevance')",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&project_id)
    .bind(&v1.id)
    .execute(&pool)
    .await
    .unwrap();

    let refs = stores
        .templates
        .evaluators_by_template_name(&project_id, "relevance")
        .await
        .unwrap();
    assert_eq!(refs.len(), 1);

    let v2 = stores
        .templates
        .create_template(request(&project_id, "relevance", ReferencedEvaluators::Persist))
        .await
        .unwrap();
    assert_eq!(v2.version, 2);
    let refs = stores
        .templates
        .evaluators_by_template_name(&project_id, "relevance")
        .await
        .unwrap();
    assert_eq!(refs[0].eval_template_id, v1.id);

    let v3 = stores
        .templates
        .create_template(request(&project_id, "relevance", ReferencedEvaluators::Update))
        .await
        .unwrap();
    assert_eq!(v3.version, 3);
    let refs = stores
        .templates
        .evaluators_by_template_name(&project_id, "relevance")
        .await
        .unwrap();
    assert_eq!(refs[0].eval_template_id, v3.id);
}

#[tokio::test]
#[ignore] // requires DATABASE_URL
async fn create_rejects_missing_model() {
    let pool = test_pool().await;
    let stores = PgStores::new(pool.clone());
    let project_id = seed_project(&pool, false).await;

    let mut req = request(&project_id, "relevance", ReferencedEvaluators::Persist);
    req.model = String::new();
    let err = stores.templates.create_template(req).await.unwrap_err();
    assert_eq!(err.display_message(), "model: Select a model");
}
