//! The scheduling request and its field validation.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A request to schedule the horizon `[horizon_start, horizon_start + horizon_days)`.
///
/// Serde defaults mirror the service's documented defaults so partial JSON
/// bodies round out to a well-formed request; `horizon_start` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    pub horizon_start: NaiveDate,
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    /// Solver time limit in seconds.
    #[serde(default = "default_time_limit")]
    pub solver_time_limit: u64,
    #[serde(default = "default_allow_uncovered")]
    pub allow_uncovered_demand: bool,
    /// Objective penalty per unit of uncovered demand.
    #[serde(default = "default_penalty_uncovered")]
    pub penalty_uncovered: f64,
    /// Objective weight on the reserved preference (avoid) set.
    #[serde(default)]
    pub weight_preference: f64,
    #[serde(default = "default_max_consecutive_days")]
    pub max_consecutive_days: u32,
    #[serde(default = "default_min_rest_hours")]
    pub min_rest_hours: f64,
    #[serde(default = "default_max_night_shifts")]
    pub max_night_shifts: u32,
    #[serde(default)]
    pub min_shifts_per_employee: u32,
    #[serde(default)]
    pub require_complete_weekends: bool,
}

fn default_horizon_days() -> u32 {
    7
}
fn default_time_limit() -> u64 {
    60
}
fn default_allow_uncovered() -> bool {
    true
}
fn default_penalty_uncovered() -> f64 {
    1000.0
}
fn default_max_consecutive_days() -> u32 {
    6
}
fn default_min_rest_hours() -> f64 {
    11.0
}
fn default_max_night_shifts() -> u32 {
    7
}

pub const MAX_HORIZON_DAYS: u32 = 28;
pub const MAX_TIME_LIMIT_SECS: u64 = 600;

impl SolveRequest {
    /// Accept or reject the request per the service contract. A rejected
    /// request never creates a run.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.horizon_days < 1 || self.horizon_days > MAX_HORIZON_DAYS {
            return Err(CoreError::invalid(
                "horizon_days",
                format!("must be between 1 and {MAX_HORIZON_DAYS}"),
            ));
        }
        if self.solver_time_limit < 1 || self.solver_time_limit > MAX_TIME_LIMIT_SECS {
            return Err(CoreError::invalid(
                "solver_time_limit",
                format!("must be between 1 and {MAX_TIME_LIMIT_SECS} seconds"),
            ));
        }
        if self.allow_uncovered_demand && !(self.penalty_uncovered >= 0.0) {
            return Err(CoreError::invalid(
                "penalty_uncovered",
                "must be a non-negative number when uncovered demand is allowed",
            ));
        }
        if !self.weight_preference.is_finite() {
            return Err(CoreError::invalid("weight_preference", "must be finite"));
        }
        if self.max_consecutive_days < 1 || self.max_consecutive_days > self.horizon_days {
            return Err(CoreError::invalid(
                "max_consecutive_days",
                format!("must be between 1 and horizon_days ({})", self.horizon_days),
            ));
        }
        if !(0.0..=24.0).contains(&self.min_rest_hours) {
            return Err(CoreError::invalid(
                "min_rest_hours",
                "must be between 0 and 24",
            ));
        }
        // max_night_shifts and min_shifts_per_employee are unsigned, so the
        // non-negativity half of the contract holds by construction.
        Ok(())
    }

    /// The day sequence covered by the horizon, ascending.
    pub fn horizon_dates(&self) -> Vec<NaiveDate> {
        (0..u64::from(self.horizon_days))
            .map(|offset| self.horizon_start + Days::new(offset))
            .collect()
    }

    /// Exclusive end of the horizon.
    pub fn horizon_end(&self) -> NaiveDate {
        self.horizon_start + Days::new(u64::from(self.horizon_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SolveRequest {
        SolveRequest {
            horizon_start: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            horizon_days: 7,
            solver_time_limit: 60,
            allow_uncovered_demand: true,
            penalty_uncovered: 1000.0,
            weight_preference: 0.0,
            max_consecutive_days: 6,
            min_rest_hours: 11.0,
            max_night_shifts: 7,
            min_shifts_per_employee: 0,
            require_complete_weekends: false,
        }
    }

    #[test]
    fn defaults_accepted() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn horizon_days_bounds() {
        let mut req = base();
        req.horizon_days = 0;
        assert!(req.validate().is_err());
        req.horizon_days = 29;
        assert!(req.validate().is_err());
        req.horizon_days = 28;
        req.max_consecutive_days = 6;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn time_limit_bounds() {
        let mut req = base();
        req.solver_time_limit = 0;
        assert!(req.validate().is_err());
        req.solver_time_limit = 601;
        assert!(req.validate().is_err());
        req.solver_time_limit = 600;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn negative_penalty_rejected_only_when_elastic() {
        let mut req = base();
        req.penalty_uncovered = -1.0;
        assert!(req.validate().is_err());
        req.allow_uncovered_demand = false;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn nan_penalty_rejected() {
        let mut req = base();
        req.penalty_uncovered = f64::NAN;
        assert!(req.validate().is_err());
    }

    #[test]
    fn consecutive_days_must_fit_horizon() {
        let mut req = base();
        req.max_consecutive_days = 8;
        assert!(req.validate().is_err());
        req.max_consecutive_days = 0;
        assert!(req.validate().is_err());
        req.max_consecutive_days = 7;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rest_hours_bounds() {
        let mut req = base();
        req.min_rest_hours = 24.5;
        assert!(req.validate().is_err());
        req.min_rest_hours = -0.1;
        assert!(req.validate().is_err());
        req.min_rest_hours = 24.0;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn horizon_dates_are_contiguous() {
        let mut req = base();
        req.horizon_days = 3;
        let dates = req.horizon_dates();
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2025, 12, 3).unwrap());
        assert_eq!(req.horizon_end(), NaiveDate::from_ymd_opt(2025, 12, 4).unwrap());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let req: SolveRequest =
            serde_json::from_str(r#"{"horizon_start": "2025-12-01"}"#).unwrap();
        assert_eq!(req.horizon_days, 7);
        assert_eq!(req.solver_time_limit, 60);
        assert!(req.allow_uncovered_demand);
        assert_eq!(req.penalty_uncovered, 1000.0);
        assert_eq!(req.max_consecutive_days, 6);
        assert_eq!(req.min_rest_hours, 11.0);
        assert_eq!(req.max_night_shifts, 7);
        assert_eq!(req.min_shifts_per_employee, 0);
        assert!(!req.require_complete_weekends);
    }
}
