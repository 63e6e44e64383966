//! Embedded MILP backend over `good_lp` with the pure-Rust `microlp` solver.

use std::time::Instant;

use good_lp::{default_solver, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable};
use rosterd_core::model::{Model, Sense, VarDef};

use crate::backend::{BackendError, MilpBackend, SolverOptions, Termination};

/// Translates the model IR into a `good_lp` problem per call. The embedded
/// solver runs without a licence and cannot be interrupted mid-search, so
/// optimality is certified only when the solve finished inside the requested
/// time limit; a longer solve reports its solution as an uncertified
/// incumbent and the orchestrator's hard ceiling backstops runaways.
pub struct GoodLpBackend;

impl MilpBackend for GoodLpBackend {
    fn solve(&self, model: &Model, options: &SolverOptions) -> Result<Termination, BackendError> {
        let started = Instant::now();

        let mut vars = variables!();
        let handles: Vec<Variable> = model
            .vars
            .iter()
            .map(|def| match def {
                VarDef::Assign { .. } => vars.add(variable().binary()),
                VarDef::Shortfall { .. } => vars.add(variable().min(0.0)),
            })
            .collect();

        let objective = model
            .objective
            .iter()
            .fold(Expression::from(0.0), |acc, &(var, coef)| {
                acc + coef * handles[var]
            });

        let mut problem = vars.minimise(objective).using(default_solver);
        for constraint in &model.constraints {
            let sum = constraint
                .terms
                .iter()
                .fold(Expression::from(0.0), |acc, &(var, coef)| {
                    acc + coef * handles[var]
                });
            let bounded = match constraint.sense {
                Sense::Leq => sum.leq(constraint.rhs),
                Sense::Geq => sum.geq(constraint.rhs),
                Sense::Eq => sum.eq(constraint.rhs),
            };
            problem.add_constraint(bounded);
        }

        match problem.solve() {
            Ok(solution) => {
                let values: Vec<f64> = handles.iter().map(|h| solution.value(*h)).collect();
                if started.elapsed() <= options.time_limit {
                    Ok(Termination::Optimal(values))
                } else {
                    Ok(Termination::Feasible(values))
                }
            }
            Err(ResolutionError::Infeasible) => Ok(Termination::Infeasible),
            Err(other) => Err(BackendError::Failed(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosterd_core::model::{Constraint, ConstraintTag, VarDef};
    use std::time::Duration;

    fn tiny_model() -> Model {
        // Two binaries, pick the cheaper one: min x0 + 2 x1, x0 + x1 >= 1.
        Model {
            vars: vec![
                VarDef::Assign { emp: 0, day: 0, shift: 0 },
                VarDef::Assign { emp: 1, day: 0, shift: 0 },
            ],
            objective: vec![(0, 1.0), (1, 2.0)],
            constraints: vec![Constraint {
                tag: ConstraintTag::Cover {
                    date: chrono::NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
                    shift: "S1".into(),
                    skill: "RN".into(),
                },
                terms: vec![(0, 1.0), (1, 1.0)],
                sense: rosterd_core::model::Sense::Geq,
                rhs: 1.0,
            }],
            warnings: vec![],
        }
    }

    #[test]
    fn solves_a_tiny_model_to_optimality() {
        let options = SolverOptions {
            time_limit: Duration::from_secs(10),
        };
        match GoodLpBackend.solve(&tiny_model(), &options).unwrap() {
            Termination::Optimal(values) => {
                assert!(values[0] > 0.5);
                assert!(values[1] < 0.5);
            }
            other => panic!("expected optimal, got {other:?}"),
        }
    }

    #[test]
    fn elapsed_time_past_the_limit_downgrades_to_feasible() {
        let options = SolverOptions {
            time_limit: Duration::ZERO,
        };
        match GoodLpBackend.solve(&tiny_model(), &options).unwrap() {
            Termination::Feasible(values) => assert!(values[0] > 0.5),
            other => panic!("expected feasible, got {other:?}"),
        }
    }

    #[test]
    fn contradictory_bounds_are_infeasible() {
        let mut model = tiny_model();
        model.constraints.push(Constraint {
            tag: ConstraintTag::OnePerDay {
                employee: "E1".into(),
                date: chrono::NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            },
            terms: vec![(0, 1.0), (1, 1.0)],
            sense: rosterd_core::model::Sense::Leq,
            rhs: 0.0,
        });
        let options = SolverOptions {
            time_limit: Duration::from_secs(10),
        };
        assert!(matches!(
            GoodLpBackend.solve(&model, &options).unwrap(),
            Termination::Infeasible
        ));
    }

    #[test]
    fn deletion_filter_reduces_to_the_conflicting_pair() {
        let mut model = tiny_model();
        // x0 + x1 >= 1 against x0 + x1 <= 0 is the minimal conflict; a third
        // harmless constraint must be filtered out.
        model.constraints.push(Constraint {
            tag: ConstraintTag::OnePerDay {
                employee: "E1".into(),
                date: chrono::NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            },
            terms: vec![(0, 1.0), (1, 1.0)],
            sense: rosterd_core::model::Sense::Leq,
            rhs: 0.0,
        });
        model.constraints.push(Constraint {
            tag: ConstraintTag::NightCap {
                employee: "E1".into(),
            },
            terms: vec![(0, 1.0)],
            sense: rosterd_core::model::Sense::Leq,
            rhs: 5.0,
        });

        let options = SolverOptions {
            time_limit: Duration::from_secs(10),
        };
        let iis = GoodLpBackend
            .compute_iis(&model, &options, 100)
            .unwrap();
        assert_eq!(iis.len(), 2);
        assert!(iis
            .iter()
            .all(|t| !matches!(t, ConstraintTag::NightCap { .. })));
    }
}
