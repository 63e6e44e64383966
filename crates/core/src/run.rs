//! Run lifecycle: the closed status set and its transition table.
//!
//! A run moves through `QUEUED -> RUNNING -> {OPTIMAL, FEASIBLE, INFEASIBLE,
//! ERROR}`. Terminal states are absorbing; a queued run may also be finalised
//! directly (a shutdown drains the queue without starting the work).

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Queued,
    Running,
    Optimal,
    Feasible,
    Infeasible,
    Error,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Queued => "QUEUED",
            RunStatus::Running => "RUNNING",
            RunStatus::Optimal => "OPTIMAL",
            RunStatus::Feasible => "FEASIBLE",
            RunStatus::Infeasible => "INFEASIBLE",
            RunStatus::Error => "ERROR",
        }
    }

    pub fn parse(value: &str) -> Option<RunStatus> {
        match value {
            "QUEUED" => Some(RunStatus::Queued),
            "RUNNING" => Some(RunStatus::Running),
            "OPTIMAL" => Some(RunStatus::Optimal),
            "FEASIBLE" => Some(RunStatus::Feasible),
            "INFEASIBLE" => Some(RunStatus::Infeasible),
            "ERROR" => Some(RunStatus::Error),
            _ => None,
        }
    }

    /// Terminal states carry `completed_at` and accept no further writes.
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunStatus::Queued | RunStatus::Running)
    }

    /// Whether the run produced an extractable solution (and therefore an
    /// objective value and a non-empty assignment list).
    pub fn has_solution(self) -> bool {
        matches!(self, RunStatus::Optimal | RunStatus::Feasible)
    }

    /// Valid target statuses reachable from `self`.
    pub fn valid_transitions(self) -> &'static [RunStatus] {
        match self {
            RunStatus::Queued => &[
                RunStatus::Running,
                RunStatus::Optimal,
                RunStatus::Feasible,
                RunStatus::Infeasible,
                RunStatus::Error,
            ],
            RunStatus::Running => &[
                RunStatus::Optimal,
                RunStatus::Feasible,
                RunStatus::Infeasible,
                RunStatus::Error,
            ],
            // Terminal states are absorbing.
            _ => &[],
        }
    }

    pub fn can_transition(self, to: RunStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TERMINAL: [RunStatus; 4] = [
        RunStatus::Optimal,
        RunStatus::Feasible,
        RunStatus::Infeasible,
        RunStatus::Error,
    ];

    #[test]
    fn queued_to_running() {
        assert!(RunStatus::Queued.can_transition(RunStatus::Running));
    }

    #[test]
    fn queued_may_be_finalised_directly() {
        for status in TERMINAL {
            assert!(RunStatus::Queued.can_transition(status));
        }
    }

    #[test]
    fn running_to_any_terminal() {
        for status in TERMINAL {
            assert!(RunStatus::Running.can_transition(status));
        }
    }

    #[test]
    fn running_cannot_return_to_queued() {
        assert!(!RunStatus::Running.can_transition(RunStatus::Queued));
    }

    #[test]
    fn terminal_states_are_absorbing() {
        for status in TERMINAL {
            assert!(status.is_terminal());
            assert!(status.valid_transitions().is_empty());
        }
    }

    #[test]
    fn solution_bearing_states() {
        assert!(RunStatus::Optimal.has_solution());
        assert!(RunStatus::Feasible.has_solution());
        assert!(!RunStatus::Infeasible.has_solution());
        assert!(!RunStatus::Error.has_solution());
        assert!(!RunStatus::Queued.has_solution());
    }

    #[test]
    fn string_round_trip() {
        for status in [
            RunStatus::Queued,
            RunStatus::Running,
            RunStatus::Optimal,
            RunStatus::Feasible,
            RunStatus::Infeasible,
            RunStatus::Error,
        ] {
            assert_eq!(RunStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RunStatus::parse("PROCESSING"), None);
    }
}
