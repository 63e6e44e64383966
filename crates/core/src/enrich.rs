//! Roster enrichment: join raw assignments against a catalog snapshot.
//!
//! The join is resolved locally against whole-catalog maps rather than per
//! assignment, and it tolerates catalog churn: an employee or shift deleted
//! after the run completed falls back to displayable placeholders so old
//! rosters always render.

use std::collections::HashMap;

use crate::catalog::{Employee, EnrichedAssignment, RawAssignment, Shift};

/// Sort key sentinel for shifts no longer in the catalog: they order after
/// every real start time.
const UNKNOWN_SHIFT_START: u16 = u16::MAX;

pub const UNKNOWN_ROLE: &str = "Unknown";

/// Produce display-ready assignments in a stable order: date, shift start
/// time, employee role, employee display name.
///
/// Deterministic and idempotent for a given catalog view.
pub fn enrich(
    assignments: &[RawAssignment],
    employees: &[Employee],
    shifts: &[Shift],
) -> Vec<EnrichedAssignment> {
    let employee_map: HashMap<&str, &Employee> = employees
        .iter()
        .map(|e| (e.employee_id.as_str(), e))
        .collect();
    let shift_map: HashMap<&str, &Shift> =
        shifts.iter().map(|s| (s.shift_id.as_str(), s)).collect();

    let mut rows: Vec<(u16, EnrichedAssignment)> = assignments
        .iter()
        .map(|a| {
            let employee = employee_map.get(a.employee_id.as_str());
            let shift = shift_map.get(a.shift_id.as_str());
            let enriched = EnrichedAssignment {
                employee_id: a.employee_id.clone(),
                employee_name: employee
                    .map(|e| e.name.clone())
                    .unwrap_or_else(|| a.employee_id.clone()),
                role: employee
                    .map(|e| e.role.as_str().to_string())
                    .unwrap_or_else(|| UNKNOWN_ROLE.to_string()),
                date: a.date,
                shift_id: a.shift_id.clone(),
                shift_name: shift
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| a.shift_id.clone()),
                hours: a.hours,
                cost: a.cost,
            };
            let start = shift.map_or(UNKNOWN_SHIFT_START, |s| s.start_minute);
            (start, enriched)
        })
        .collect();

    rows.sort_by(|(start_a, a), (start_b, b)| {
        a.date
            .cmp(&b.date)
            .then(start_a.cmp(start_b))
            .then_with(|| a.role.cmp(&b.role))
            .then_with(|| a.employee_name.cmp(&b.employee_name))
            .then_with(|| a.employee_id.cmp(&b.employee_id))
    });

    rows.into_iter().map(|(_, enriched)| enriched).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Role;
    use chrono::NaiveDate;

    fn employee(id: &str, name: &str, role: Role) -> Employee {
        Employee {
            employee_id: id.into(),
            name: name.into(),
            role,
            skills: vec![],
            hourly_cost: 30.0,
            max_weekly_hours: 40.0,
        }
    }

    fn shift(id: &str, name: &str, start: u16) -> Shift {
        Shift {
            shift_id: id.into(),
            name: name.into(),
            start_minute: start,
            end_minute: start.wrapping_add(8 * 60) % (24 * 60),
            length_hours: 8.0,
        }
    }

    fn assignment(employee_id: &str, date: NaiveDate, shift_id: &str) -> RawAssignment {
        RawAssignment {
            employee_id: employee_id.into(),
            date,
            shift_id: shift_id.into(),
            hours: 8.0,
            cost: 240.0,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, day).unwrap()
    }

    #[test]
    fn joins_names_roles_and_shift_names() {
        let employees = vec![employee("E1", "Alice", Role::Nurse)];
        let shifts = vec![shift("S1", "Morning", 7 * 60)];
        let rows = enrich(&[assignment("E1", date(1), "S1")], &employees, &shifts);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].employee_name, "Alice");
        assert_eq!(rows[0].role, "Nurse");
        assert_eq!(rows[0].shift_name, "Morning");
        assert_eq!(rows[0].cost, 240.0);
    }

    #[test]
    fn deleted_employee_falls_back_to_id_and_unknown_role() {
        let shifts = vec![shift("S1", "Morning", 7 * 60)];
        let rows = enrich(&[assignment("E9", date(1), "S1")], &[], &shifts);
        assert_eq!(rows[0].employee_name, "E9");
        assert_eq!(rows[0].role, UNKNOWN_ROLE);
        // Original hours and cost are preserved.
        assert_eq!(rows[0].hours, 8.0);
        assert_eq!(rows[0].cost, 240.0);
    }

    #[test]
    fn deleted_shift_falls_back_to_id_and_sorts_last() {
        let employees = vec![
            employee("E1", "Alice", Role::Nurse),
            employee("E2", "Bob", Role::Nurse),
        ];
        let shifts = vec![shift("S1", "Morning", 7 * 60)];
        let rows = enrich(
            &[
                assignment("E1", date(1), "GONE"),
                assignment("E2", date(1), "S1"),
            ],
            &employees,
            &shifts,
        );
        assert_eq!(rows[0].shift_name, "Morning");
        assert_eq!(rows[1].shift_name, "GONE");
    }

    #[test]
    fn stable_order_by_date_start_role_name() {
        let employees = vec![
            employee("E1", "Zoe", Role::Nurse),
            employee("E2", "Ann", Role::Nurse),
            employee("D1", "Max", Role::Doctor),
        ];
        let shifts = vec![
            shift("S1", "Morning", 7 * 60),
            shift("S2", "Afternoon", 15 * 60),
        ];
        let rows = enrich(
            &[
                assignment("E1", date(2), "S1"),
                assignment("E1", date(1), "S2"),
                assignment("E2", date(1), "S1"),
                assignment("E1", date(1), "S1"),
                assignment("D1", date(1), "S1"),
            ],
            &employees,
            &shifts,
        );
        let order: Vec<(NaiveDate, String, String)> = rows
            .iter()
            .map(|r| (r.date, r.shift_name.clone(), r.employee_name.clone()))
            .collect();
        assert_eq!(
            order,
            vec![
                // Day 1, morning: doctor before nurses, nurses by name.
                (date(1), "Morning".into(), "Max".into()),
                (date(1), "Morning".into(), "Ann".into()),
                (date(1), "Morning".into(), "Zoe".into()),
                (date(1), "Afternoon".into(), "Zoe".into()),
                (date(2), "Morning".into(), "Zoe".into()),
            ]
        );
    }

    #[test]
    fn enrichment_is_idempotent() {
        let employees = vec![employee("E1", "Alice", Role::Nurse)];
        let shifts = vec![shift("S1", "Morning", 7 * 60)];
        let input = [assignment("E1", date(1), "S1")];
        assert_eq!(
            enrich(&input, &employees, &shifts),
            enrich(&input, &employees, &shifts)
        );
    }
}
