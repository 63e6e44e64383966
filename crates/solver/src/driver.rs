//! The solve driver: build the model, drive the backend, extract and
//! validate the solution, and diagnose infeasibility.
//!
//! Runs synchronously on a blocking worker; every failure mode is folded
//! into a terminal [`SolveReport`] so the orchestrator can always finalise
//! the run exactly once.

use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use rosterd_core::catalog::{RawAssignment, Snapshot};
use rosterd_core::model::builder::{build, BuilderConfig};
use rosterd_core::model::{ConstraintFamily, Model, VarDef};
use rosterd_core::request::SolveRequest;
use rosterd_core::run::RunStatus;

use crate::backend::{BackendError, MilpBackend, SolverOptions, Termination};
use crate::diagnose::classify;

#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub builder: BuilderConfig,
    /// Attempts against a transiently unavailable backend.
    pub max_attempts: u32,
    /// Base backoff delay, doubled per attempt.
    pub retry_backoff: Duration,
    /// Cap on deletion-filter re-solves when diagnosing infeasibility.
    pub iis_max_solves: usize,
    /// Tolerance when re-validating the rounded solution.
    pub tolerance: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            builder: BuilderConfig::default(),
            max_attempts: 3,
            retry_backoff: Duration::from_millis(500),
            iis_max_solves: 200,
            tolerance: 1e-6,
        }
    }
}

/// Terminal outcome of one solve, ready to be written to the registry.
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub status: RunStatus,
    pub objective_value: Option<f64>,
    pub assignments: Vec<RawAssignment>,
    pub logs: String,
}

/// Timestamped log lines captured with the run.
#[derive(Default)]
struct LogBuffer {
    lines: Vec<String>,
}

impl LogBuffer {
    fn push(&mut self, message: impl AsRef<str>) {
        self.lines
            .push(format!("{} - {}", Utc::now().to_rfc3339(), message.as_ref()));
    }

    fn into_text(self) -> String {
        self.lines.join("\n")
    }
}

/// Solve one request against a catalog snapshot.
pub fn run_solve(
    backend: &dyn MilpBackend,
    snapshot: &Snapshot,
    request: &SolveRequest,
    config: &DriverConfig,
) -> SolveReport {
    let mut log = LogBuffer::default();
    log.push(format!(
        "building model: {} employees, {} days, {} shifts",
        snapshot.employees.len(),
        request.horizon_days,
        snapshot.shifts.len(),
    ));

    let model = match build(snapshot, request, &config.builder) {
        Ok(model) => model,
        Err(e) => {
            log.push(format!("model build failed: {e}"));
            return error_report(log);
        }
    };
    for warning in &model.warnings {
        log.push(warning);
    }
    log.push(format!(
        "model built: {} variables, {} constraints",
        model.num_vars(),
        model.constraints.len(),
    ));

    let options = SolverOptions {
        time_limit: Duration::from_secs(request.solver_time_limit),
    };
    log.push(format!(
        "starting optimisation (time limit {}s)",
        request.solver_time_limit
    ));
    let started = Instant::now();

    let termination = match solve_with_retry(backend, &model, &options, config, &mut log) {
        Ok(termination) => termination,
        Err(e) => {
            log.push(format!("backend error during solve: {e}"));
            return error_report(log);
        }
    };
    let elapsed = started.elapsed();

    match termination {
        Termination::Optimal(values) => {
            log.push(format!("solver finished in {:.2}s: optimal", elapsed.as_secs_f64()));
            extract_solution(RunStatus::Optimal, &model, snapshot, request, &values, config, log)
        }
        Termination::Feasible(values) => {
            log.push(format!(
                "solver finished in {:.2}s: feasible, optimality not proven within the time limit",
                elapsed.as_secs_f64()
            ));
            extract_solution(RunStatus::Feasible, &model, snapshot, request, &values, config, log)
        }
        Termination::Infeasible => {
            log.push("model proven infeasible; computing irreducible infeasible subsystem");
            match backend.compute_iis(&model, &options, config.iis_max_solves) {
                Ok(iis) => {
                    log.push(format!("infeasible core contains {} constraints", iis.len()));
                    for conflict in classify(&iis) {
                        log.push(format!("conflict: {}", conflict.message));
                    }
                }
                Err(e) => {
                    log.push(format!("failed to diagnose the infeasible core: {e}"));
                }
            }
            SolveReport {
                status: RunStatus::Infeasible,
                objective_value: None,
                assignments: Vec::new(),
                logs: log.into_text(),
            }
        }
    }
}

fn error_report(log: LogBuffer) -> SolveReport {
    SolveReport {
        status: RunStatus::Error,
        objective_value: None,
        assignments: Vec::new(),
        logs: log.into_text(),
    }
}

/// Retry transient backend failures with exponential backoff.
fn solve_with_retry(
    backend: &dyn MilpBackend,
    model: &Model,
    options: &SolverOptions,
    config: &DriverConfig,
    log: &mut LogBuffer,
) -> Result<Termination, BackendError> {
    let mut attempt = 1;
    loop {
        match backend.solve(model, options) {
            Ok(termination) => return Ok(termination),
            Err(e) if e.is_transient() && attempt < config.max_attempts => {
                let delay = config.retry_backoff * 2u32.pow(attempt - 1);
                log.push(format!(
                    "backend unavailable (attempt {attempt}/{}): {e}; retrying in {}ms",
                    config.max_attempts,
                    delay.as_millis(),
                ));
                thread::sleep(delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Round the backend's values, re-derive the shortfalls from the rounded
/// roster, re-validate every constraint, and build the assignment list.
fn extract_solution(
    status: RunStatus,
    model: &Model,
    snapshot: &Snapshot,
    request: &SolveRequest,
    values: &[f64],
    config: &DriverConfig,
    mut log: LogBuffer,
) -> SolveReport {
    let mut rounded: Vec<f64> = values
        .iter()
        .enumerate()
        .map(|(var, &value)| {
            if model.vars[var].is_binary() {
                if value > 0.5 {
                    1.0
                } else {
                    0.0
                }
            } else {
                value.max(0.0)
            }
        })
        .collect();

    // Recompute every coverage shortfall from the rounded roster so the
    // accounting matches the returned assignments exactly.
    let mut total_shortfall = 0.0;
    for constraint in &model.constraints {
        if constraint.tag.family() != ConstraintFamily::Cover {
            continue;
        }
        let covered: f64 = constraint
            .terms
            .iter()
            .filter(|&&(var, _)| model.vars[var].is_binary())
            .map(|&(var, coef)| coef * rounded[var])
            .sum();
        let missing = (constraint.rhs - covered).max(0.0);
        if let Some(&(slack, _)) = constraint
            .terms
            .iter()
            .find(|&&(var, _)| !model.vars[var].is_binary())
        {
            rounded[slack] = missing;
        }
        total_shortfall += missing;
    }

    let violations = model.violations(&rounded, config.tolerance);
    if !violations.is_empty() {
        for violated in violations.iter().take(10) {
            log.push(format!(
                "rounded solution violates {} (activity {} vs rhs {})",
                violated.tag,
                violated.activity(&rounded),
                violated.rhs,
            ));
        }
        log.push("extracted solution failed validation; downgrading to ERROR");
        tracing::error!(
            violations = violations.len(),
            "solver returned a solution that fails constraint validation"
        );
        return error_report(log);
    }

    let dates = request.horizon_dates();
    let mut assignments = Vec::new();
    for (var, def) in model.vars.iter().enumerate() {
        let VarDef::Assign { emp, day, shift } = def else {
            continue;
        };
        if rounded[var] < 0.5 {
            continue;
        }
        let employee = &snapshot.employees[*emp];
        let shift = &snapshot.shifts[*shift];
        assignments.push(RawAssignment {
            employee_id: employee.employee_id.clone(),
            date: dates[*day],
            shift_id: shift.shift_id.clone(),
            hours: shift.length_hours,
            cost: employee.hourly_cost * shift.length_hours,
        });
    }

    let objective = model.objective_value(&rounded);
    log.push(format!(
        "solution: {} assignments, total uncovered demand: {}",
        assignments.len(),
        total_shortfall,
    ));

    SolveReport {
        status,
        objective_value: Some(objective),
        assignments,
        logs: log.into_text(),
    }
}
