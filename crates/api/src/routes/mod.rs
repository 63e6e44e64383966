pub mod catalog;
pub mod health;
pub mod queue;
pub mod schedules;

use axum::Router;

use crate::state::AppState;

/// All routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/schedules", schedules::router())
        .nest("/queue", queue::router())
        .nest("/catalog", catalog::router())
}
