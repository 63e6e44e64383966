//! Model builder: (catalog snapshot, validated request) -> MILP.
//!
//! The builder is a pure function. Given identical inputs it produces the
//! same variable layout, the same constraint set, and the same tag strings,
//! which the infeasibility classifier and the post-solve validator rely on.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, Weekday};

use crate::catalog::Snapshot;
use crate::error::CoreError;
use crate::model::tag::week_label;
use crate::model::{Constraint, ConstraintTag, Model, Sense, VarDef, VarId};
use crate::request::SolveRequest;
use crate::shift_time::{rest_gap_minutes, NightWindow};
use crate::tokens::{TokenId, TokenSet};

/// Builder policy knobs that are deployment configuration rather than
/// per-request input.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    pub night: NightWindow,
    /// Shift ids subject to the senior/junior ratio constraint.
    pub critical_shift_ids: BTreeSet<String>,
    /// Skill token marking senior staff.
    pub senior_token: String,
    /// Skill token marking junior staff.
    pub junior_token: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            night: NightWindow::default(),
            critical_shift_ids: BTreeSet::new(),
            senior_token: "Senior".to_string(),
            junior_token: "Junior".to_string(),
        }
    }
}

/// Assemble the MILP for one scheduling request.
///
/// Fails only on referential breakage (a demand row naming a shift absent
/// from the snapshot); everything else is expressible, including models that
/// will later prove infeasible.
pub fn build(
    snapshot: &Snapshot,
    request: &SolveRequest,
    config: &BuilderConfig,
) -> Result<Model, CoreError> {
    let dates = request.horizon_dates();
    let n_days = dates.len();
    let n_shifts = snapshot.shifts.len();
    let n_emps = snapshot.employees.len();

    let shift_index: HashMap<&str, usize> = snapshot
        .shifts
        .iter()
        .enumerate()
        .map(|(idx, s)| (s.shift_id.as_str(), idx))
        .collect();

    // Intern skill tokens; the builder works over ids from here on.
    let mut tokens = TokenSet::new();
    let emp_skills: Vec<Vec<TokenId>> = snapshot
        .employees
        .iter()
        .map(|e| e.skills.iter().map(|s| tokens.intern(s)).collect())
        .collect();

    // Aggregate demand per (day, shift, skill), summing duplicate rows.
    let mut demand: BTreeMap<(usize, usize, TokenId), u32> = BTreeMap::new();
    for row in &snapshot.demand {
        let offset = (row.date - request.horizon_start).num_days();
        if offset < 0 || offset >= n_days as i64 {
            continue;
        }
        let Some(&shift) = shift_index.get(row.shift_id.as_str()) else {
            return Err(CoreError::NotFound {
                entity: "shift",
                id: row.shift_id.clone(),
            });
        };
        let skill = tokens.intern(&row.skill);
        *demand.entry((offset as usize, shift, skill)).or_insert(0) += row.required;
    }

    let mut model = Model::default();

    // x[e,t,s] in fixed (employee, day, shift) order.
    for emp in 0..n_emps {
        for day in 0..n_days {
            for shift in 0..n_shifts {
                model.vars.push(VarDef::Assign { emp, day, shift });
            }
        }
    }
    let x = |emp: usize, day: usize, shift: usize| -> VarId { (emp * n_days + day) * n_shifts + shift };

    // y[t,s,k] per demanded slot, only under elastic coverage.
    let mut shortfall: BTreeMap<(usize, usize, TokenId), VarId> = BTreeMap::new();
    if request.allow_uncovered_demand {
        for key in demand.keys() {
            let id = model.vars.len();
            model.vars.push(VarDef::Shortfall {
                day: key.0,
                shift: key.1,
                skill: key.2,
            });
            shortfall.insert(*key, id);
        }
    }

    // Objective: labour cost + shortfall penalty + preference weight over the
    // reserved avoid set. Accumulated per variable so duplicate contributions
    // collapse into a single coefficient.
    let mut objective = vec![0.0_f64; model.vars.len()];
    for (emp_idx, employee) in snapshot.employees.iter().enumerate() {
        for day in 0..n_days {
            for (shift_idx, shift) in snapshot.shifts.iter().enumerate() {
                objective[x(emp_idx, day, shift_idx)] +=
                    employee.hourly_cost * shift.length_hours;
            }
        }
    }
    for &var in shortfall.values() {
        objective[var] += request.penalty_uncovered;
    }
    for avoid in &snapshot.avoid {
        let emp = snapshot
            .employees
            .iter()
            .position(|e| e.employee_id == avoid.employee_id);
        let shift = shift_index.get(avoid.shift_id.as_str()).copied();
        let offset = (avoid.date - request.horizon_start).num_days();
        if let (Some(emp), Some(shift), true) =
            (emp, shift, offset >= 0 && offset < n_days as i64)
        {
            objective[x(emp, offset as usize, shift)] += request.weight_preference;
        }
    }
    model.objective = objective
        .into_iter()
        .enumerate()
        .filter(|&(_, coef)| coef != 0.0)
        .collect();

    // 1. cover[t,s,k]: skilled headcount plus slack covers the requirement.
    for (&(day, shift, skill), &required) in &demand {
        let mut terms: Vec<(VarId, f64)> = (0..n_emps)
            .filter(|&emp| emp_skills[emp].contains(&skill))
            .map(|emp| (x(emp, day, shift), 1.0))
            .collect();
        if let Some(&slack) = shortfall.get(&(day, shift, skill)) {
            terms.push((slack, 1.0));
        }
        model.constraints.push(Constraint {
            tag: ConstraintTag::Cover {
                date: dates[day],
                shift: snapshot.shifts[shift].shift_id.clone(),
                skill: tokens.resolve(skill).to_string(),
            },
            terms,
            sense: Sense::Geq,
            rhs: f64::from(required),
        });
    }

    // 2. one_per_day[e,t].
    for (emp_idx, employee) in snapshot.employees.iter().enumerate() {
        for day in 0..n_days {
            model.constraints.push(Constraint {
                tag: ConstraintTag::OnePerDay {
                    employee: employee.employee_id.clone(),
                    date: dates[day],
                },
                terms: (0..n_shifts).map(|s| (x(emp_idx, day, s), 1.0)).collect(),
                sense: Sense::Leq,
                rhs: 1.0,
            });
        }
    }

    // 3. weekly_hours[e,w] over each ISO week intersecting the horizon.
    let mut weeks: BTreeMap<(i32, u32), Vec<usize>> = BTreeMap::new();
    for (day, date) in dates.iter().enumerate() {
        let week = date.iso_week();
        weeks.entry((week.year(), week.week())).or_default().push(day);
    }
    for (emp_idx, employee) in snapshot.employees.iter().enumerate() {
        for days in weeks.values() {
            let terms: Vec<(VarId, f64)> = days
                .iter()
                .flat_map(|&day| {
                    snapshot
                        .shifts
                        .iter()
                        .enumerate()
                        .map(move |(s, shift)| (x(emp_idx, day, s), shift.length_hours))
                })
                .collect();
            model.constraints.push(Constraint {
                tag: ConstraintTag::WeeklyHours {
                    employee: employee.employee_id.clone(),
                    week: week_label(dates[days[0]]),
                },
                terms,
                sense: Sense::Leq,
                rhs: employee.max_weekly_hours,
            });
        }
    }

    // 4. forbidden_pair[e,t,s1,s2]: adjacent-day pairs whose day-boundary
    // rest gap falls strictly below the minimum.
    let min_rest_minutes = request.min_rest_hours * 60.0;
    let mut forbidden_pairs: Vec<(usize, usize)> = Vec::new();
    for (first, s1) in snapshot.shifts.iter().enumerate() {
        for (second, s2) in snapshot.shifts.iter().enumerate() {
            if f64::from(rest_gap_minutes(s1, s2)) < min_rest_minutes {
                forbidden_pairs.push((first, second));
            }
        }
    }
    for (emp_idx, employee) in snapshot.employees.iter().enumerate() {
        for day in 0..n_days.saturating_sub(1) {
            for &(first, second) in &forbidden_pairs {
                model.constraints.push(Constraint {
                    tag: ConstraintTag::ForbiddenPair {
                        employee: employee.employee_id.clone(),
                        date: dates[day],
                        first: snapshot.shifts[first].shift_id.clone(),
                        second: snapshot.shifts[second].shift_id.clone(),
                    },
                    terms: vec![
                        (x(emp_idx, day, first), 1.0),
                        (x(emp_idx, day + 1, second), 1.0),
                    ],
                    sense: Sense::Leq,
                    rhs: 1.0,
                });
            }
        }
    }

    // 5. consec_days[e,t]: every (K+1)-day window sums to at most K.
    let window = request.max_consecutive_days as usize;
    if window < n_days {
        for (emp_idx, employee) in snapshot.employees.iter().enumerate() {
            for start in 0..(n_days - window) {
                let terms: Vec<(VarId, f64)> = (start..=start + window)
                    .flat_map(|day| (0..n_shifts).map(move |s| (x(emp_idx, day, s), 1.0)))
                    .collect();
                model.constraints.push(Constraint {
                    tag: ConstraintTag::ConsecDays {
                        employee: employee.employee_id.clone(),
                        date: dates[start],
                    },
                    terms,
                    sense: Sense::Leq,
                    rhs: window as f64,
                });
            }
        }
    }

    // 6. skill_ratio[t,s] on critical slots: seniors at least match juniors.
    let senior = tokens.get(&config.senior_token);
    let junior = tokens.get(&config.junior_token);
    for day in 0..n_days {
        for (shift_idx, shift) in snapshot.shifts.iter().enumerate() {
            if !config.critical_shift_ids.contains(&shift.shift_id) {
                continue;
            }
            let terms: Vec<(VarId, f64)> = (0..n_emps)
                .filter_map(|emp| {
                    let is_senior = senior.is_some_and(|t| emp_skills[emp].contains(&t));
                    let is_junior = junior.is_some_and(|t| emp_skills[emp].contains(&t));
                    match (is_senior, is_junior) {
                        (true, false) => Some((x(emp, day, shift_idx), 1.0)),
                        (false, true) => Some((x(emp, day, shift_idx), -1.0)),
                        _ => None,
                    }
                })
                .collect();
            if terms.is_empty() {
                continue;
            }
            model.constraints.push(Constraint {
                tag: ConstraintTag::SkillRatio {
                    date: dates[day],
                    shift: shift.shift_id.clone(),
                },
                terms,
                sense: Sense::Geq,
                rhs: 0.0,
            });
        }
    }

    // 7. night_cap[e] over the horizon.
    let night_shifts: Vec<usize> = (0..n_shifts)
        .filter(|&s| config.night.is_night(&snapshot.shifts[s]))
        .collect();
    if !night_shifts.is_empty() {
        for (emp_idx, employee) in snapshot.employees.iter().enumerate() {
            let terms: Vec<(VarId, f64)> = (0..n_days)
                .flat_map(|day| night_shifts.iter().map(move |&s| (x(emp_idx, day, s), 1.0)))
                .collect();
            model.constraints.push(Constraint {
                tag: ConstraintTag::NightCap {
                    employee: employee.employee_id.clone(),
                },
                terms,
                sense: Sense::Leq,
                rhs: f64::from(request.max_night_shifts),
            });
        }
    }

    // 8. min_shifts[e], downshifted when the weekly hour cap cannot
    // accommodate the requested floor.
    if request.min_shifts_per_employee > 0 && n_shifts > 0 {
        let max_shift_hours = snapshot
            .shifts
            .iter()
            .map(|s| s.length_hours)
            .fold(0.0_f64, f64::max);
        for (emp_idx, employee) in snapshot.employees.iter().enumerate() {
            let accommodated = if max_shift_hours > 0.0 {
                (employee.max_weekly_hours / max_shift_hours).floor() as u32
            } else {
                request.min_shifts_per_employee
            };
            let bound = request.min_shifts_per_employee.min(accommodated);
            if bound < request.min_shifts_per_employee {
                model.warnings.push(format!(
                    "min_shifts for {} downshifted from {} to {}: weekly cap of {}h cannot accommodate the requested floor",
                    employee.employee_id,
                    request.min_shifts_per_employee,
                    bound,
                    employee.max_weekly_hours,
                ));
            }
            if bound == 0 {
                continue;
            }
            let terms: Vec<(VarId, f64)> = (0..n_days)
                .flat_map(|day| (0..n_shifts).map(move |s| (x(emp_idx, day, s), 1.0)))
                .collect();
            model.constraints.push(Constraint {
                tag: ConstraintTag::MinShifts {
                    employee: employee.employee_id.clone(),
                },
                terms,
                sense: Sense::Geq,
                rhs: f64::from(bound),
            });
        }
    }

    // 9. weekend_link[e,w]: Saturday and Sunday workloads match for each
    // weekend fully inside the horizon.
    if request.require_complete_weekends {
        for (emp_idx, employee) in snapshot.employees.iter().enumerate() {
            for day in 0..n_days.saturating_sub(1) {
                if dates[day].weekday() != Weekday::Sat || dates[day + 1].weekday() != Weekday::Sun
                {
                    continue;
                }
                let mut terms: Vec<(VarId, f64)> =
                    (0..n_shifts).map(|s| (x(emp_idx, day, s), 1.0)).collect();
                terms.extend((0..n_shifts).map(|s| (x(emp_idx, day + 1, s), -1.0)));
                model.constraints.push(Constraint {
                    tag: ConstraintTag::WeekendLink {
                        employee: employee.employee_id.clone(),
                        week: week_label(dates[day]),
                    },
                    terms,
                    sense: Sense::Eq,
                    rhs: 0.0,
                });
            }
        }
    }

    Ok(model)
}
