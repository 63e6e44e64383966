//! Mixed-integer model intermediate representation.
//!
//! The builder emits a plain-data model (variables, sparse objective,
//! labelled linear constraints) that the solver backend translates into its
//! own problem form. Keeping the model as data makes infeasibility
//! diagnosis (re-solving constraint subsets) and post-solve validation
//! (re-evaluating every constraint against rounded values) straightforward.

pub mod builder;
pub mod tag;

pub use tag::{ConstraintFamily, ConstraintTag};

use crate::tokens::TokenId;

pub type VarId = usize;

/// Variable definitions, indexed by [`VarId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarDef {
    /// Binary: employee `emp` works shift `shift` on day `day`.
    /// Indices refer to the snapshot's employee/shift order and the horizon
    /// day sequence.
    Assign { emp: usize, day: usize, shift: usize },
    /// Continuous, non-negative: uncovered demand for `skill` on (day, shift).
    Shortfall {
        day: usize,
        shift: usize,
        skill: TokenId,
    },
}

impl VarDef {
    pub fn is_binary(&self) -> bool {
        matches!(self, VarDef::Assign { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Leq,
    Geq,
    Eq,
}

/// One labelled linear constraint: `terms <sense> rhs`.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub tag: ConstraintTag,
    pub terms: Vec<(VarId, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    /// Left-hand-side value under the given variable assignment.
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|&(v, c)| c * values[v]).sum()
    }

    pub fn satisfied(&self, values: &[f64], eps: f64) -> bool {
        let activity = self.activity(values);
        match self.sense {
            Sense::Leq => activity <= self.rhs + eps,
            Sense::Geq => activity >= self.rhs - eps,
            Sense::Eq => (activity - self.rhs).abs() <= eps,
        }
    }
}

/// A complete model instance plus any builder warnings destined for the run
/// log.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub vars: Vec<VarDef>,
    /// Sparse minimisation objective, one entry per variable at most,
    /// ordered by variable id.
    pub objective: Vec<(VarId, f64)>,
    pub constraints: Vec<Constraint>,
    pub warnings: Vec<String>,
}

impl Model {
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.iter().map(|&(v, c)| c * values[v]).sum()
    }

    /// Constraints violated by `values` beyond tolerance `eps`.
    pub fn violations(&self, values: &[f64], eps: f64) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|c| !c.satisfied(values, eps))
            .collect()
    }
}
