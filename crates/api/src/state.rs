use std::sync::Arc;

use crate::config::ServerConfig;
use crate::orchestrator::Orchestrator;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: rosterd_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Worker pool driving scheduling runs to a terminal state.
    pub orchestrator: Arc<Orchestrator>,
}
