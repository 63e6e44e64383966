//! The contract the solver driver assumes of a MILP backend.
//!
//! A backend accepts a labelled model, honours a per-call time limit, and
//! distinguishes proven-optimal, feasible-but-unproven, and infeasible
//! terminations. Infeasibility diagnosis is provided on top of `solve` as a
//! deletion filter, so any conforming backend supports it.

use std::time::Duration;

use rosterd_core::model::{ConstraintTag, Model};

#[derive(Debug, Clone)]
pub struct SolverOptions {
    pub time_limit: Duration,
}

/// Tagged solve outcome. Values are indexed by the model's variable ids.
#[derive(Debug, Clone)]
pub enum Termination {
    /// Proven optimal within the time limit.
    Optimal(Vec<f64>),
    /// An incumbent exists but optimality was not certified in time.
    Feasible(Vec<f64>),
    /// Proven infeasible.
    Infeasible,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend could not be reached; worth retrying.
    #[error("solver backend unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected or failed on the model; retrying will not help.
    #[error("solver backend failed: {0}")]
    Failed(String),
}

impl BackendError {
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Unavailable(_))
    }
}

pub trait MilpBackend: Send + Sync {
    fn solve(&self, model: &Model, options: &SolverOptions) -> Result<Termination, BackendError>;

    /// Constraint tags of an irreducible infeasible subsystem of `model`.
    ///
    /// Deletion filter: walk the constraint set, permanently dropping every
    /// constraint whose removal keeps the model infeasible; whatever remains
    /// is irreducible. Variable bounds are never candidates. Each probe is a
    /// feasibility-only re-solve; when `max_solves` runs out the remaining
    /// candidate set (a superset of an IIS) is returned instead.
    fn compute_iis(
        &self,
        model: &Model,
        options: &SolverOptions,
        max_solves: usize,
    ) -> Result<Vec<ConstraintTag>, BackendError> {
        let mut kept: Vec<usize> = (0..model.constraints.len()).collect();
        let mut solves = 0usize;
        let mut probe = 0usize;

        while probe < kept.len() && solves < max_solves {
            let candidate: Vec<usize> = kept
                .iter()
                .enumerate()
                .filter(|&(position, _)| position != probe)
                .map(|(_, &constraint)| constraint)
                .collect();
            solves += 1;
            match self.solve(&feasibility_model(model, &candidate), options)? {
                Termination::Infeasible => kept = candidate,
                _ => probe += 1,
            }
        }

        Ok(kept
            .into_iter()
            .map(|c| model.constraints[c].tag.clone())
            .collect())
    }
}

/// A copy of `model` restricted to the given constraints, with the objective
/// cleared: IIS probes only ask about feasibility.
fn feasibility_model(model: &Model, constraints: &[usize]) -> Model {
    Model {
        vars: model.vars.clone(),
        objective: Vec::new(),
        constraints: constraints
            .iter()
            .map(|&c| model.constraints[c].clone())
            .collect(),
        warnings: Vec::new(),
    }
}
