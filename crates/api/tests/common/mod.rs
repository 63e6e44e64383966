// All functions in this module are shared test helpers. Not every test binary
// uses every helper, so we suppress dead_code warnings at the item level.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use rosterd_api::config::ServerConfig;
use rosterd_api::orchestrator::Orchestrator;
use rosterd_api::router::build_app_router;
use rosterd_api::state::AppState;
use rosterd_core::model::Model;
use rosterd_solver::{
    BackendError, DriverConfig, GoodLpBackend, MilpBackend, SolverOptions, Termination,
};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        solver_workers: 1,
        queue_bound: 4,
        critical_shift_ids: vec![],
    }
}

/// Fresh in-memory database with the embedded migrations applied.
pub async fn test_pool() -> rosterd_db::DbPool {
    let pool = rosterd_db::create_pool("sqlite::memory:")
        .await
        .expect("failed to create memory pool");
    rosterd_db::run_migrations(&pool)
        .await
        .expect("failed to run migrations");
    pool
}

/// Application state with a running orchestrator over the given backend.
pub async fn test_state_with(
    config: ServerConfig,
    backend: Arc<dyn MilpBackend>,
) -> AppState {
    let pool = test_pool().await;
    let orchestrator = Orchestrator::start(
        pool.clone(),
        backend,
        Arc::new(DriverConfig::default()),
        config.solver_workers,
        config.queue_bound,
    );
    AppState {
        pool,
        config: Arc::new(config),
        orchestrator,
    }
}

/// The full application over the real embedded backend.
pub async fn build_test_app() -> (Router, AppState) {
    let state = test_state_with(test_config(), Arc::new(GoodLpBackend)).await;
    let config = Arc::clone(&state.config);
    (build_app_router(state.clone(), &config), state)
}

pub async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll the status endpoint until the run leaves the non-terminal states.
pub async fn poll_until_terminal(
    app: &Router,
    run_id: &str,
    timeout: Duration,
) -> serde_json::Value {
    let deadline = Instant::now() + timeout;
    loop {
        let response = get(app, &format!("/api/v1/schedules/{run_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let status = json["status"].as_str().unwrap().to_string();
        if status != "QUEUED" && status != "RUNNING" {
            return json;
        }
        assert!(
            Instant::now() < deadline,
            "run {run_id} did not reach a terminal state in time"
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// A backend that holds the worker long enough for tests to observe queue
/// and shutdown behaviour.
pub struct SlowBackend {
    pub delay: Duration,
}

impl MilpBackend for SlowBackend {
    fn solve(&self, _model: &Model, _options: &SolverOptions) -> Result<Termination, BackendError> {
        std::thread::sleep(self.delay);
        Err(BackendError::Failed("slow backend gave up".into()))
    }
}
