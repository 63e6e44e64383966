use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rosterd_core::error::CoreError;
use rosterd_db::RepoError;
use serde_json::json;

use crate::orchestrator::SubmitError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain and repository errors and implements [`IntoResponse`]
/// to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `rosterd_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A repository error from `rosterd_db`.
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The solve queue is at its configured bound.
    #[error("Scheduling queue is full")]
    QueueFull,
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Invalid(core) => AppError::Core(core),
            SubmitError::QueueFull => AppError::QueueFull,
            SubmitError::Repo(repo) => AppError::Repo(repo),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, field, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::InvalidRequest { field, reason } => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_REQUEST",
                    Some(*field),
                    format!("{field}: {reason}"),
                ),
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    None,
                    format!("{entity} {id} not found"),
                ),
                CoreError::TerminalConflict(run_id) => {
                    // Internal assertion; logged, never surfaced in detail.
                    tracing::error!(run_id = %run_id, "terminal conflict reached the HTTP layer");
                    internal()
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            AppError::Repo(repo) => match repo {
                RepoError::RunNotFound(run_id) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    None,
                    format!("run {run_id} not found"),
                ),
                RepoError::TerminalConflict(run_id) => {
                    tracing::error!(run_id = %run_id, "terminal conflict reached the HTTP layer");
                    internal()
                }
                RepoError::Sqlx(e) => {
                    tracing::error!(error = %e, "Database error");
                    internal()
                }
            },

            AppError::Database(sqlx::Error::RowNotFound) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                None,
                "Resource not found".to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                internal()
            }

            AppError::QueueFull => (
                StatusCode::SERVICE_UNAVAILABLE,
                "QUEUE_FULL",
                None,
                "Scheduling queue is full, retry later".to_string(),
            ),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(field) = field {
            body["field"] = json!(field);
        }

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, Option<&'static str>, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        None,
        "An internal error occurred".to_string(),
    )
}
