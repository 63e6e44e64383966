//! Handler for queue observability.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/v1/queue
///
/// Current queue state: depth, capacity, worker count, and the longest
/// wait among queued runs.
pub async fn get_queue_status(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(state.orchestrator.queue_stats().await))
}
