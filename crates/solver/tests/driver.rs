//! Driver behaviour around backend failures and solution validation, using
//! scripted backends.

mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use common::{day, demand, request, snapshot};
use rosterd_core::model::Model;
use rosterd_core::run::RunStatus;
use rosterd_solver::{
    run_solve, BackendError, DriverConfig, GoodLpBackend, MilpBackend, SolverOptions, Termination,
};

fn fast_config() -> DriverConfig {
    DriverConfig {
        retry_backoff: Duration::from_millis(1),
        ..DriverConfig::default()
    }
}

/// Fails with a transient error a fixed number of times, then delegates to
/// the real backend.
struct FlakyBackend {
    failures_left: AtomicU32,
    inner: GoodLpBackend,
}

impl FlakyBackend {
    fn new(failures: u32) -> Self {
        FlakyBackend {
            failures_left: AtomicU32::new(failures),
            inner: GoodLpBackend,
        }
    }
}

impl MilpBackend for FlakyBackend {
    fn solve(&self, model: &Model, options: &SolverOptions) -> Result<Termination, BackendError> {
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                left.checked_sub(1)
            })
            .is_ok()
        {
            return Err(BackendError::Unavailable("connection refused".into()));
        }
        self.inner.solve(model, options)
    }
}

/// Claims optimality with an all-zero solution, which cannot satisfy any
/// positive demand.
struct BogusBackend;

impl MilpBackend for BogusBackend {
    fn solve(&self, model: &Model, _options: &SolverOptions) -> Result<Termination, BackendError> {
        Ok(Termination::Optimal(vec![0.0; model.num_vars()]))
    }
}

#[test]
fn transient_backend_failures_are_retried_with_backoff() {
    let mut snapshot = snapshot();
    snapshot.demand = vec![demand(day(0), "S1", "RN", 1)];
    let mut request = request();
    request.allow_uncovered_demand = false;

    let backend = FlakyBackend::new(2);
    let report = run_solve(&backend, &snapshot, &request, &fast_config());

    assert_eq!(report.status, RunStatus::Optimal);
    assert!(report.logs.contains("attempt 1/3"));
    assert!(report.logs.contains("attempt 2/3"));
}

#[test]
fn persistent_backend_failure_becomes_a_terminal_error() {
    let mut snapshot = snapshot();
    snapshot.demand = vec![demand(day(0), "S1", "RN", 1)];
    let request = request();

    let backend = FlakyBackend::new(u32::MAX);
    let report = run_solve(&backend, &snapshot, &request, &fast_config());

    assert_eq!(report.status, RunStatus::Error);
    assert!(report.logs.contains("backend error during solve"));
    assert!(report.assignments.is_empty());
    assert!(report.objective_value.is_none());
}

#[test]
fn solution_failing_validation_is_downgraded_to_error() {
    let mut snapshot = snapshot();
    snapshot.demand = vec![demand(day(0), "S1", "RN", 1)];
    let mut request = request();
    request.allow_uncovered_demand = false;

    let report = run_solve(&BogusBackend, &snapshot, &request, &fast_config());

    assert_eq!(report.status, RunStatus::Error);
    assert!(report.logs.contains("cover[2025-12-01,S1,RN]"));
    assert!(report.logs.contains("failed validation"));
}

#[test]
fn demand_for_an_unknown_shift_fails_at_the_build_stage() {
    let mut snapshot = snapshot();
    snapshot.demand = vec![demand(day(0), "S9", "RN", 1)];
    let request = request();

    let report = run_solve(&GoodLpBackend, &snapshot, &request, &fast_config());

    assert_eq!(report.status, RunStatus::Error);
    assert!(report.logs.contains("model build failed"));
}

#[test]
fn min_shifts_downshift_warning_reaches_the_run_log() {
    let mut snapshot = snapshot();
    snapshot.demand = vec![demand(day(0), "S1", "RN", 1)];
    // E3's 40h weekly cap accommodates 5 shifts; ask for 6.
    let mut request = request();
    request.min_shifts_per_employee = 6;

    let report = run_solve(&GoodLpBackend, &snapshot, &request, &fast_config());

    assert!(report.status.has_solution());
    assert!(report.logs.contains("downshifted"));
}
