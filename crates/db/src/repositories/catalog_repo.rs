//! Repository for the catalog tables: employees, shifts, demand rows.
//!
//! The solver never reads the catalog directly; it takes a [`Snapshot`] at
//! dispatch time and works from that for the whole solve.

use chrono::{Days, NaiveDate};
use rosterd_core::catalog::{DemandRow, Employee, Shift, Snapshot};

use crate::models::catalog::{join_skills, DemandRowRecord, EmployeeRow, ShiftRow};
use crate::DbPool;

/// Column list for `employees` queries.
const EMPLOYEE_COLUMNS: &str =
    "employee_id, name, role, skills, hourly_cost, max_weekly_hours";

/// Column list for `shifts` queries.
const SHIFT_COLUMNS: &str = "shift_id, name, start_minute, end_minute, length_hours";

/// Column list for `demands` queries.
const DEMAND_COLUMNS: &str = "id, date, shift_id, skill, required";

pub struct CatalogRepo;

impl CatalogRepo {
    pub async fn employees(pool: &DbPool) -> Result<Vec<Employee>, sqlx::Error> {
        let query = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY employee_id");
        let rows = sqlx::query_as::<_, EmployeeRow>(&query).fetch_all(pool).await?;
        rows.into_iter().map(EmployeeRow::into_domain).collect()
    }

    pub async fn shifts(pool: &DbPool) -> Result<Vec<Shift>, sqlx::Error> {
        let query = format!("SELECT {SHIFT_COLUMNS} FROM shifts ORDER BY shift_id");
        let rows = sqlx::query_as::<_, ShiftRow>(&query).fetch_all(pool).await?;
        rows.into_iter().map(ShiftRow::into_domain).collect()
    }

    pub async fn find_employee(
        pool: &DbPool,
        employee_id: &str,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_id = ?1");
        let row = sqlx::query_as::<_, EmployeeRow>(&query)
            .bind(employee_id)
            .fetch_optional(pool)
            .await?;
        row.map(EmployeeRow::into_domain).transpose()
    }

    pub async fn find_shift(pool: &DbPool, shift_id: &str) -> Result<Option<Shift>, sqlx::Error> {
        let query = format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE shift_id = ?1");
        let row = sqlx::query_as::<_, ShiftRow>(&query)
            .bind(shift_id)
            .fetch_optional(pool)
            .await?;
        row.map(ShiftRow::into_domain).transpose()
    }

    /// Demand rows with `start <= date < start + horizon_days`.
    pub async fn demand_in_range(
        pool: &DbPool,
        start: NaiveDate,
        horizon_days: u32,
    ) -> Result<Vec<DemandRow>, sqlx::Error> {
        let end = start + Days::new(u64::from(horizon_days));
        let query = format!(
            "SELECT {DEMAND_COLUMNS} FROM demands WHERE date >= ?1 AND date < ?2 ORDER BY id"
        );
        let rows = sqlx::query_as::<_, DemandRowRecord>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(DemandRowRecord::into_domain).collect())
    }

    /// A consistent (employees, shifts, demand) triple for one solve,
    /// read inside a single transaction.
    pub async fn snapshot(
        pool: &DbPool,
        start: NaiveDate,
        horizon_days: u32,
    ) -> Result<Snapshot, sqlx::Error> {
        let end = start + Days::new(u64::from(horizon_days));
        let mut tx = pool.begin().await?;

        let employees = {
            let query = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY employee_id");
            let rows = sqlx::query_as::<_, EmployeeRow>(&query)
                .fetch_all(&mut *tx)
                .await?;
            rows.into_iter()
                .map(EmployeeRow::into_domain)
                .collect::<Result<Vec<_>, _>>()?
        };

        let shifts = {
            let query = format!("SELECT {SHIFT_COLUMNS} FROM shifts ORDER BY shift_id");
            let rows = sqlx::query_as::<_, ShiftRow>(&query)
                .fetch_all(&mut *tx)
                .await?;
            rows.into_iter()
                .map(ShiftRow::into_domain)
                .collect::<Result<Vec<_>, _>>()?
        };

        let demand = {
            let query = format!(
                "SELECT {DEMAND_COLUMNS} FROM demands WHERE date >= ?1 AND date < ?2 ORDER BY id"
            );
            let rows = sqlx::query_as::<_, DemandRowRecord>(&query)
                .bind(start)
                .bind(end)
                .fetch_all(&mut *tx)
                .await?;
            rows.into_iter().map(DemandRowRecord::into_domain).collect()
        };

        tx.commit().await?;

        Ok(Snapshot {
            employees,
            shifts,
            demand,
            // No catalog field supplies preference entries today.
            avoid: Vec::new(),
        })
    }

    /// Reset the three catalog tables to the demo dataset. Idempotent; runs
    /// and their assignments are left untouched.
    pub async fn seed_demo(pool: &DbPool, start: NaiveDate) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Demands reference shifts, so they go first.
        sqlx::query("DELETE FROM demands").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM shifts").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM employees").execute(&mut *tx).await?;

        let shifts: [(&str, &str, i64, i64, f64); 3] = [
            ("S1", "Morning", 7 * 60, 15 * 60, 8.0),
            ("S2", "Afternoon", 15 * 60, 23 * 60, 8.0),
            ("S3", "Night", 23 * 60, 7 * 60, 8.0),
        ];
        for (shift_id, name, start_minute, end_minute, length_hours) in shifts {
            sqlx::query(
                "INSERT INTO shifts (shift_id, name, start_minute, end_minute, length_hours) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(shift_id)
            .bind(name)
            .bind(start_minute)
            .bind(end_minute)
            .bind(length_hours)
            .execute(&mut *tx)
            .await?;
        }

        let employees: [(&str, &str, &str, &[&str], f64, f64); 4] = [
            ("E01", "Alice", "Nurse", &["RN"], 30.0, 40.0),
            ("E02", "Bob", "Nurse", &["RN", "ICU", "Senior"], 45.0, 40.0),
            ("E03", "Charlie", "Nurse", &["RN", "Junior"], 32.0, 20.0),
            ("D01", "Dr. Smith", "Doctor", &["MD"], 100.0, 50.0),
        ];
        for (employee_id, name, role, skills, hourly_cost, max_weekly_hours) in employees {
            let skills: Vec<String> = skills.iter().map(|s| s.to_string()).collect();
            sqlx::query(
                "INSERT INTO employees \
                     (employee_id, name, role, skills, hourly_cost, max_weekly_hours) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(employee_id)
            .bind(name)
            .bind(role)
            .bind(join_skills(&skills))
            .bind(hourly_cost)
            .bind(max_weekly_hours)
            .execute(&mut *tx)
            .await?;
        }

        for offset in 0..7u64 {
            let date = start + Days::new(offset);
            insert_demand(&mut tx, date, "S1", "RN", 1).await?;
            insert_demand(&mut tx, date, "S2", "RN", 1).await?;
            insert_demand(&mut tx, date, "S3", "ICU", 1).await?;
            if offset == 3 {
                insert_demand(&mut tx, date, "S1", "MD", 1).await?;
            }
        }

        tx.commit().await
    }
}

async fn insert_demand(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    date: NaiveDate,
    shift_id: &str,
    skill: &str,
    required: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO demands (date, shift_id, skill, required) VALUES (?1, ?2, ?3, ?4)")
        .bind(date)
        .bind(shift_id)
        .bind(skill)
        .bind(required)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
