//! Handlers for the `/schedules` resource: submit a scheduling request,
//! poll a run, list run summaries.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use rosterd_core::catalog::EnrichedAssignment;
use rosterd_core::enrich::enrich;
use rosterd_core::request::SolveRequest;
use rosterd_core::run::RunStatus;
use rosterd_core::types::Timestamp;
use rosterd_db::repositories::{CatalogRepo, RunRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Response for POST /schedules.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub run_id: String,
    pub status: RunStatus,
}

/// Response for GET /schedules/{run_id}.
#[derive(Debug, Serialize)]
pub struct RunDetailResponse {
    pub run_id: String,
    pub status: RunStatus,
    pub horizon_start: NaiveDate,
    pub horizon_days: u32,
    pub objective_value: Option<f64>,
    pub logs: Option<String>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    /// Display-ready roster; empty unless the run carries a solution.
    pub assignments: Vec<EnrichedAssignment>,
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/v1/schedules
///
/// Validate and enqueue a scheduling request. Returns 201 with the new
/// run id immediately; the solve happens on a background worker. 400 on
/// validation failure, 503 when the queue is at its bound.
pub async fn submit_schedule(
    State(state): State<AppState>,
    Json(request): Json<SolveRequest>,
) -> AppResult<impl IntoResponse> {
    let run = state
        .orchestrator
        .submit(request)
        .await
        .map_err(AppError::from)?;

    tracing::info!(run_id = %run.run_id, "schedule request accepted");

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            run_id: run.run_id,
            status: run.status,
        }),
    ))
}

// ---------------------------------------------------------------------------
// Poll
// ---------------------------------------------------------------------------

/// GET /api/v1/schedules/{run_id}
///
/// Poll a run. Solution-bearing runs are returned with assignments joined
/// against the current catalog (deleted employees and shifts degrade to
/// displayable fallbacks). 404 on unknown id.
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let run = RunRepo::get(&state.pool, &run_id).await?;

    let assignments = if run.status.has_solution() {
        let raw = RunRepo::assignments(&state.pool, &run_id)
            .await
            .map_err(AppError::Database)?;
        let employees = CatalogRepo::employees(&state.pool)
            .await
            .map_err(AppError::Database)?;
        let shifts = CatalogRepo::shifts(&state.pool)
            .await
            .map_err(AppError::Database)?;
        enrich(&raw, &employees, &shifts)
    } else {
        Vec::new()
    };

    Ok(Json(RunDetailResponse {
        run_id: run.run_id,
        status: run.status,
        horizon_start: run.request.horizon_start,
        horizon_days: run.request.horizon_days,
        objective_value: run.objective_value,
        logs: run.logs,
        created_at: run.created_at,
        completed_at: run.completed_at,
        assignments,
    }))
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// GET /api/v1/schedules
///
/// Run summaries ordered by creation time, newest first. No enrichment.
pub async fn list_schedules(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let summaries = RunRepo::list(&state.pool)
        .await
        .map_err(AppError::Database)?;
    Ok(Json(summaries))
}
