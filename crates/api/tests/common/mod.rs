#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use kazi_api::auth::jwt::{generate_access_token, JwtConfig};
use kazi_api::config::ServerConfig;
use kazi_api::payment::EventBusPaymentTrigger;
use kazi_api::router::build_app_router;
use kazi_api::state::AppState;
use kazi_core::application::ApplicationStatus;
use kazi_core::payment::PaymentTrigger;
use kazi_core::types::DbId;
use kazi_db::models::job::CreateJob;
use kazi_db::models::job_application::CreateJobApplication;
use kazi_db::repositories::{JobApplicationRepo, JobRepo};
use kazi_events::EventBus;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        json_logs: false,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// The full application router plus the bus its handlers publish on.
pub struct TestApp {
    pub router: Router,
    pub event_bus: Arc<EventBus>,
}

/// Build the application router with the production middleware stack and
/// the event-bus payment trigger.
pub fn build_test_app_with_bus(pool: PgPool) -> TestApp {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        payment_trigger: Arc::new(EventBusPaymentTrigger::new(Arc::clone(&event_bus))),
    };

    TestApp {
        router: build_app_router(state, &config),
        event_bus,
    }
}

pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_bus(pool).router
}

/// Build the application router around a caller-supplied payment trigger.
pub fn build_test_app_with_trigger(pool: PgPool, trigger: Arc<dyn PaymentTrigger>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
        payment_trigger: trigger,
    };
    build_app_router(state, &config)
}

/// Mint a bearer token for `user_id` with the given role name.
pub fn token_for(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

/// Create a job owned by `employer_id`.
pub async fn seed_job(pool: &PgPool, employer_id: DbId) -> DbId {
    JobRepo::create(
        pool,
        &CreateJob {
            employer_id,
            title: "Plant maize".to_string(),
        },
    )
    .await
    .expect("job creation should succeed")
    .id
}

/// Record an accepted application of `user_id` to `job_id`.
pub async fn accept_worker(pool: &PgPool, job_id: DbId, user_id: DbId) {
    let app = JobApplicationRepo::create(pool, &CreateJobApplication { job_id, user_id })
        .await
        .expect("application creation should succeed");
    JobApplicationRepo::update_status(pool, app.id, ApplicationStatus::Accepted)
        .await
        .expect("status update should succeed")
        .expect("application should exist");
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}
