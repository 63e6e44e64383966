//! Handler for the demo-catalog seed.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use rosterd_db::repositories::CatalogRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response for POST /catalog/seed.
#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub seeded: bool,
}

/// POST /api/v1/catalog/seed
///
/// Reset the three catalog tables to the demo dataset, with demand starting
/// today. Idempotent; existing runs are untouched.
pub async fn seed_catalog(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let start = Utc::now().date_naive();
    CatalogRepo::seed_demo(&state.pool, start)
        .await
        .map_err(AppError::Database)?;

    tracing::info!(%start, "demo catalog seeded");

    Ok(Json(SeedResponse { seeded: true }))
}
