//! Route definitions for the `/schedules` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::schedules;
use crate::state::AppState;

/// Routes mounted at `/schedules`.
///
/// ```text
/// GET    /            -> list_schedules
/// POST   /            -> submit_schedule
/// GET    /{run_id}    -> get_schedule
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(schedules::list_schedules).post(schedules::submit_schedule),
        )
        .route("/{run_id}", get(schedules::get_schedule))
}
