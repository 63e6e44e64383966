//! Catalog entities: employees, shifts, demand rows, and the immutable
//! snapshot handed to the model builder at the start of a solve.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Employee role, a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Doctor,
    Nurse,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Doctor => "Doctor",
            Role::Nurse => "Nurse",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "Doctor" => Some(Role::Doctor),
            "Nurse" => Some(Role::Nurse),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An employee in the catalog, keyed by `employee_id`.
///
/// Immutable during a solve: the solver works from a [`Snapshot`] taken at
/// dispatch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: String,
    pub name: String,
    pub role: Role,
    /// Free-form skill tags such as `RN`, `MD`, `ICU`, `Senior`.
    pub skills: Vec<String>,
    pub hourly_cost: f64,
    pub max_weekly_hours: f64,
}

impl Employee {
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }
}

/// A shift template, keyed by `shift_id`.
///
/// Start and end are wall-clock minutes since midnight. A shift whose end is
/// at or before its start wraps past midnight into the next day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub shift_id: String,
    pub name: String,
    pub start_minute: u16,
    pub end_minute: u16,
    pub length_hours: f64,
}

/// One demand row: on `date`, shift `shift_id` needs `required` employees
/// carrying `skill`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandRow {
    pub id: i64,
    pub date: NaiveDate,
    pub shift_id: String,
    pub skill: String,
    pub required: u32,
}

/// A reserved preference entry: an (employee, date, shift) triple the
/// objective penalises with the request's preference weight. No catalog
/// field supplies these today, so the set is empty in practice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvoidAssignment {
    pub employee_id: String,
    pub date: NaiveDate,
    pub shift_id: String,
}

/// Consistent view of the catalog taken at the moment a solve begins.
/// Catalog mutations after the snapshot do not affect an in-flight run.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub employees: Vec<Employee>,
    pub shifts: Vec<Shift>,
    pub demand: Vec<DemandRow>,
    pub avoid: Vec<AvoidAssignment>,
}

impl Snapshot {
    pub fn employee(&self, employee_id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.employee_id == employee_id)
    }

    pub fn shift(&self, shift_id: &str) -> Option<&Shift> {
        self.shifts.iter().find(|s| s.shift_id == shift_id)
    }
}

/// A single solved (employee, date, shift) cell as stored with the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAssignment {
    pub employee_id: String,
    pub date: NaiveDate,
    pub shift_id: String,
    pub hours: f64,
    pub cost: f64,
}

/// A raw assignment joined with catalog display data for the roster view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedAssignment {
    pub employee_id: String,
    pub employee_name: String,
    /// Role display string; `"Unknown"` when the employee has left the
    /// catalog since the run completed.
    pub role: String,
    pub date: NaiveDate,
    pub shift_id: String,
    pub shift_name: String,
    pub hours: f64,
    pub cost: f64,
}
