//! Row types for the catalog tables and their domain conversions.
//!
//! Skills are stored pipe-separated (`RN|ICU|Senior`); the conversion splits
//! them into the domain's token list.

use chrono::NaiveDate;
use rosterd_core::catalog::{DemandRow, Employee, Role, Shift};
use sqlx::FromRow;

/// A row from the `employees` table.
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeRow {
    pub employee_id: String,
    pub name: String,
    pub role: String,
    pub skills: String,
    pub hourly_cost: f64,
    pub max_weekly_hours: f64,
}

impl EmployeeRow {
    pub fn into_domain(self) -> Result<Employee, sqlx::Error> {
        let role = Role::parse(&self.role).ok_or_else(|| {
            sqlx::Error::Protocol(format!(
                "employee {} has unknown role {:?}",
                self.employee_id, self.role
            ))
        })?;
        Ok(Employee {
            employee_id: self.employee_id,
            name: self.name,
            role,
            skills: split_skills(&self.skills),
            hourly_cost: self.hourly_cost,
            max_weekly_hours: self.max_weekly_hours,
        })
    }
}

/// A row from the `shifts` table.
#[derive(Debug, Clone, FromRow)]
pub struct ShiftRow {
    pub shift_id: String,
    pub name: String,
    pub start_minute: i64,
    pub end_minute: i64,
    pub length_hours: f64,
}

impl ShiftRow {
    pub fn into_domain(self) -> Result<Shift, sqlx::Error> {
        let start_minute = minute_of_day(self.start_minute, &self.shift_id)?;
        let end_minute = minute_of_day(self.end_minute, &self.shift_id)?;
        Ok(Shift {
            shift_id: self.shift_id,
            name: self.name,
            start_minute,
            end_minute,
            length_hours: self.length_hours,
        })
    }
}

/// A row from the `demands` table.
#[derive(Debug, Clone, FromRow)]
pub struct DemandRowRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub shift_id: String,
    pub skill: String,
    pub required: i64,
}

impl DemandRowRecord {
    pub fn into_domain(self) -> DemandRow {
        DemandRow {
            id: self.id,
            date: self.date,
            shift_id: self.shift_id,
            skill: self.skill,
            required: self.required.max(0) as u32,
        }
    }
}

pub fn split_skills(skills: &str) -> Vec<String> {
    skills
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_skills(skills: &[String]) -> String {
    skills.join("|")
}

fn minute_of_day(value: i64, shift_id: &str) -> Result<u16, sqlx::Error> {
    if (0..24 * 60).contains(&value) {
        Ok(value as u16)
    } else {
        Err(sqlx::Error::Protocol(format!(
            "shift {shift_id} has out-of-range minute {value}"
        )))
    }
}
