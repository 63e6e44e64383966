//! Shared fixtures: the three-employee, three-shift catalog and a request
//! with service defaults over a December 2025 week.

use chrono::NaiveDate;
use rosterd_core::catalog::{DemandRow, Employee, Role, Shift, Snapshot};
use rosterd_core::request::SolveRequest;

pub fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
}

pub fn day(offset: u64) -> NaiveDate {
    start() + chrono::Days::new(offset)
}

pub fn employee(id: &str, role: Role, skills: &[&str], cost: f64, weekly: f64) -> Employee {
    Employee {
        employee_id: id.into(),
        name: id.into(),
        role,
        skills: skills.iter().map(|s| s.to_string()).collect(),
        hourly_cost: cost,
        max_weekly_hours: weekly,
    }
}

pub fn shift(id: &str, name: &str, start_minute: u16, end_minute: u16) -> Shift {
    Shift {
        shift_id: id.into(),
        name: name.into(),
        start_minute,
        end_minute,
        length_hours: 8.0,
    }
}

pub fn demand(date: NaiveDate, shift_id: &str, skill: &str, required: u32) -> DemandRow {
    DemandRow {
        id: 0,
        date,
        shift_id: shift_id.into(),
        skill: skill.into(),
        required,
    }
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        employees: vec![
            employee("E1", Role::Doctor, &["MD"], 150.0, 40.0),
            employee("E2", Role::Nurse, &["RN", "ICU", "Senior"], 55.0, 48.0),
            employee("E3", Role::Nurse, &["RN", "Junior"], 50.0, 40.0),
        ],
        shifts: vec![
            shift("S1", "Morning", 7 * 60, 15 * 60),
            shift("S2", "Afternoon", 15 * 60, 23 * 60),
            shift("S3", "Night", 23 * 60, 7 * 60),
        ],
        demand: vec![],
        avoid: vec![],
    }
}

pub fn request() -> SolveRequest {
    SolveRequest {
        horizon_start: start(),
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
