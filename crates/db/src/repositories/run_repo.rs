//! Repository for the run registry.
//!
//! The compare-and-set on `status` in [`RunRepo::finalize`] is the single
//! serialisation point for terminal writes: whichever caller lands the
//! update first wins, and any later finalize observes `TerminalConflict`.

use chrono::Utc;
use rosterd_core::catalog::RawAssignment;
use rosterd_core::request::SolveRequest;
use rosterd_core::run::RunStatus;
use uuid::Uuid;

use crate::error::RepoError;
use crate::models::run::{AssignmentRow, Run, RunRow, RunSummary, RunSummaryRow};
use crate::DbPool;

/// Column list for `runs` queries.
const RUN_COLUMNS: &str = "\
    run_id, status, horizon_start, horizon_days, request_json, \
    objective_value, logs, created_at, completed_at";

/// Column list for the assignment read path.
const ASSIGNMENT_COLUMNS: &str = "employee_id, date, shift_id, hours, cost";

pub struct RunRepo;

impl RunRepo {
    /// Insert a new run in QUEUED state and return it.
    pub async fn create(pool: &DbPool, request: &SolveRequest) -> Result<Run, RepoError> {
        let run_id = Uuid::new_v4().to_string();
        let request_json = serde_json::to_string(request)
            .map_err(|e| sqlx::Error::Protocol(format!("unserialisable request: {e}")))?;

        let query = format!(
            "INSERT INTO runs \
                 (run_id, status, horizon_start, horizon_days, request_json, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             RETURNING {RUN_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RunRow>(&query)
            .bind(&run_id)
            .bind(RunStatus::Queued.as_str())
            .bind(request.horizon_start)
            .bind(i64::from(request.horizon_days))
            .bind(&request_json)
            .bind(Utc::now())
            .fetch_one(pool)
            .await?;
        Ok(row.into_domain()?)
    }

    /// QUEUED -> RUNNING. Returns `false` when the run had already left
    /// QUEUED, making a double-start harmless.
    pub async fn mark_running(pool: &DbPool, run_id: &str) -> Result<bool, RepoError> {
        let result = sqlx::query("UPDATE runs SET status = ?1 WHERE run_id = ?2 AND status = ?3")
            .bind(RunStatus::Running.as_str())
            .bind(run_id)
            .bind(RunStatus::Queued.as_str())
            .execute(pool)
            .await?;
        if result.rows_affected() > 0 {
            return Ok(true);
        }
        // Distinguish a missing run from a benign double-start.
        Self::get(pool, run_id).await?;
        Ok(false)
    }

    /// Move a run to a terminal state exactly once.
    ///
    /// Sets `completed_at`, records the objective and logs, and stores the
    /// assignment list for solution-bearing statuses, all in one
    /// transaction. A run already terminal yields `TerminalConflict`.
    pub async fn finalize(
        pool: &DbPool,
        run_id: &str,
        status: RunStatus,
        objective_value: Option<f64>,
        assignments: &[RawAssignment],
        logs: &str,
    ) -> Result<(), RepoError> {
        assert!(status.is_terminal(), "finalize called with {status}");

        let mut tx = pool.begin().await?;

        // Compare-and-set: only a non-terminal run can be finalised.
        let result = sqlx::query(
            "UPDATE runs \
             SET status = ?1, objective_value = ?2, logs = ?3, completed_at = ?4 \
             WHERE run_id = ?5 AND status IN (?6, ?7)",
        )
        .bind(status.as_str())
        .bind(objective_value.filter(|_| status.has_solution()))
        .bind(logs)
        .bind(Utc::now())
        .bind(run_id)
        .bind(RunStatus::Queued.as_str())
        .bind(RunStatus::Running.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<(String,)> =
                sqlx::query_as("SELECT run_id FROM runs WHERE run_id = ?1")
                    .bind(run_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            return Err(match exists {
                Some(_) => RepoError::TerminalConflict(run_id.to_string()),
                None => RepoError::RunNotFound(run_id.to_string()),
            });
        }

        if status.has_solution() {
            for assignment in assignments {
                sqlx::query(
                    "INSERT INTO assignments \
                         (run_id, employee_id, date, shift_id, hours, cost) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .bind(run_id)
                .bind(&assignment.employee_id)
                .bind(assignment.date)
                .bind(&assignment.shift_id)
                .bind(assignment.hours)
                .bind(assignment.cost)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Full record for polling.
    pub async fn get(pool: &DbPool, run_id: &str) -> Result<Run, RepoError> {
        let query = format!("SELECT {RUN_COLUMNS} FROM runs WHERE run_id = ?1");
        let row = sqlx::query_as::<_, RunRow>(&query)
            .bind(run_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| RepoError::RunNotFound(run_id.to_string()))?;
        Ok(row.into_domain()?)
    }

    pub async fn assignments(
        pool: &DbPool,
        run_id: &str,
    ) -> Result<Vec<RawAssignment>, sqlx::Error> {
        let query = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE run_id = ?1 ORDER BY id"
        );
        let rows = sqlx::query_as::<_, AssignmentRow>(&query)
            .bind(run_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(AssignmentRow::into_domain).collect())
    }

    /// Summaries ordered by creation time, newest first.
    pub async fn list(pool: &DbPool) -> Result<Vec<RunSummary>, sqlx::Error> {
        let rows = sqlx::query_as::<_, RunSummaryRow>(
            "SELECT r.run_id, r.status, r.objective_value, r.created_at, r.completed_at, \
                    COUNT(a.id) AS assignment_count \
             FROM runs r \
             LEFT JOIN assignments a ON a.run_id = r.run_id \
             GROUP BY r.run_id \
             ORDER BY r.created_at DESC",
        )
        .fetch_all(pool)
        .await?;
        rows.into_iter().map(RunSummaryRow::into_domain).collect()
    }
}
