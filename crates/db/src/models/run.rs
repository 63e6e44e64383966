//! Row types and domain records for the run registry.

use chrono::NaiveDate;
use rosterd_core::catalog::RawAssignment;
use rosterd_core::request::SolveRequest;
use rosterd_core::run::RunStatus;
use rosterd_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `runs` table.
#[derive(Debug, Clone, FromRow)]
pub struct RunRow {
    pub run_id: String,
    pub status: String,
    pub horizon_start: NaiveDate,
    pub horizon_days: i64,
    pub request_json: String,
    pub objective_value: Option<f64>,
    pub logs: Option<String>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl RunRow {
    pub fn into_domain(self) -> Result<Run, sqlx::Error> {
        let status = RunStatus::parse(&self.status).ok_or_else(|| {
            sqlx::Error::Protocol(format!(
                "run {} has unknown status {:?}",
                self.run_id, self.status
            ))
        })?;
        let request: SolveRequest = serde_json::from_str(&self.request_json).map_err(|e| {
            sqlx::Error::Protocol(format!("run {} has malformed request: {e}", self.run_id))
        })?;
        Ok(Run {
            run_id: self.run_id,
            status,
            request,
            objective_value: self.objective_value,
            logs: self.logs,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

/// One scheduling attempt.
///
/// `completed_at` is non-null exactly when the status is terminal; an
/// objective value exists exactly for OPTIMAL and FEASIBLE runs.
#[derive(Debug, Clone, Serialize)]
pub struct Run {
    pub run_id: String,
    pub status: RunStatus,
    pub request: SolveRequest,
    pub objective_value: Option<f64>,
    pub logs: Option<String>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// Listing view of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub status: RunStatus,
    pub objective_value: Option<f64>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub assignment_count: i64,
}

/// Row shape behind [`RunSummary`].
#[derive(Debug, Clone, FromRow)]
pub struct RunSummaryRow {
    pub run_id: String,
    pub status: String,
    pub objective_value: Option<f64>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub assignment_count: i64,
}

impl RunSummaryRow {
    pub fn into_domain(self) -> Result<RunSummary, sqlx::Error> {
        let status = RunStatus::parse(&self.status).ok_or_else(|| {
            sqlx::Error::Protocol(format!(
                "run {} has unknown status {:?}",
                self.run_id, self.status
            ))
        })?;
        Ok(RunSummary {
            run_id: self.run_id,
            status,
            objective_value: self.objective_value,
            created_at: self.created_at,
            completed_at: self.completed_at,
            assignment_count: self.assignment_count,
        })
    }
}

/// A row from the `assignments` table.
#[derive(Debug, Clone, FromRow)]
pub struct AssignmentRow {
    pub employee_id: String,
    pub date: NaiveDate,
    pub shift_id: String,
    pub hours: f64,
    pub cost: f64,
}

impl AssignmentRow {
    pub fn into_domain(self) -> RawAssignment {
        RawAssignment {
            employee_id: self.employee_id,
            date: self.date,
            shift_id: self.shift_id,
            hours: self.hours,
            cost: self.cost,
        }
    }
}
