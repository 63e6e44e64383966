//! Stable constraint tags.
//!
//! Every constraint carries a tag identifying its family and parameters. Tags
//! render as stable `family[params]` strings in logs and are the unit the
//! infeasibility classifier works over: each tag maps to exactly one family.

use std::fmt;

use chrono::{Datelike, NaiveDate};

/// ISO week label, e.g. `2025-W49`.
pub fn week_label(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintFamily {
    Cover,
    OnePerDay,
    WeeklyHours,
    ForbiddenPair,
    ConsecDays,
    SkillRatio,
    NightCap,
    MinShifts,
    WeekendLink,
}

impl ConstraintFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintFamily::Cover => "cover",
            ConstraintFamily::OnePerDay => "one_per_day",
            ConstraintFamily::WeeklyHours => "weekly_hours",
            ConstraintFamily::ForbiddenPair => "forbidden_pair",
            ConstraintFamily::ConsecDays => "consec_days",
            ConstraintFamily::SkillRatio => "skill_ratio",
            ConstraintFamily::NightCap => "night_cap",
            ConstraintFamily::MinShifts => "min_shifts",
            ConstraintFamily::WeekendLink => "weekend_link",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstraintTag {
    /// Demand coverage for (date, shift, skill).
    Cover {
        date: NaiveDate,
        shift: String,
        skill: String,
    },
    /// At most one shift per employee per day.
    OnePerDay { employee: String, date: NaiveDate },
    /// Weekly hour cap per employee per ISO week.
    WeeklyHours { employee: String, week: String },
    /// Rest rule over an adjacent-day shift pair.
    ForbiddenPair {
        employee: String,
        date: NaiveDate,
        first: String,
        second: String,
    },
    /// Rolling cap on consecutive working days, anchored at `date`.
    ConsecDays { employee: String, date: NaiveDate },
    /// Senior headcount must cover junior headcount on a critical slot.
    SkillRatio { date: NaiveDate, shift: String },
    /// Horizon-wide night shift cap per employee.
    NightCap { employee: String },
    /// Minimum shift count per employee over the horizon.
    MinShifts { employee: String },
    /// Saturday and Sunday workloads linked for a weekend inside the horizon.
    WeekendLink { employee: String, week: String },
}

impl ConstraintTag {
    pub fn family(&self) -> ConstraintFamily {
        match self {
            ConstraintTag::Cover { .. } => ConstraintFamily::Cover,
            ConstraintTag::OnePerDay { .. } => ConstraintFamily::OnePerDay,
            ConstraintTag::WeeklyHours { .. } => ConstraintFamily::WeeklyHours,
            ConstraintTag::ForbiddenPair { .. } => ConstraintFamily::ForbiddenPair,
            ConstraintTag::ConsecDays { .. } => ConstraintFamily::ConsecDays,
            ConstraintTag::SkillRatio { .. } => ConstraintFamily::SkillRatio,
            ConstraintTag::NightCap { .. } => ConstraintFamily::NightCap,
            ConstraintTag::MinShifts { .. } => ConstraintFamily::MinShifts,
            ConstraintTag::WeekendLink { .. } => ConstraintFamily::WeekendLink,
        }
    }
}

impl fmt::Display for ConstraintTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintTag::Cover { date, shift, skill } => {
                write!(f, "cover[{date},{shift},{skill}]")
            }
            ConstraintTag::OnePerDay { employee, date } => {
                write!(f, "one_per_day[{employee},{date}]")
            }
            ConstraintTag::WeeklyHours { employee, week } => {
                write!(f, "weekly_hours[{employee},{week}]")
            }
            ConstraintTag::ForbiddenPair {
                employee,
                date,
                first,
                second,
            } => write!(f, "forbidden_pair[{employee},{date},{first},{second}]"),
            ConstraintTag::ConsecDays { employee, date } => {
                write!(f, "consec_days[{employee},{date}]")
            }
            ConstraintTag::SkillRatio { date, shift } => {
                write!(f, "skill_ratio[{date},{shift}]")
            }
            ConstraintTag::NightCap { employee } => write!(f, "night_cap[{employee}]"),
            ConstraintTag::MinShifts { employee } => write!(f, "min_shifts[{employee}]"),
            ConstraintTag::WeekendLink { employee, week } => {
                write!(f, "weekend_link[{employee},{week}]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
    }

    #[test]
    fn tag_strings_are_stable() {
        let cover = ConstraintTag::Cover {
            date: date(),
            shift: "S1".into(),
            skill: "RN".into(),
        };
        assert_eq!(cover.to_string(), "cover[2025-12-01,S1,RN]");

        let pair = ConstraintTag::ForbiddenPair {
            employee: "E3".into(),
            date: date(),
            first: "S3".into(),
            second: "S1".into(),
        };
        assert_eq!(pair.to_string(), "forbidden_pair[E3,2025-12-01,S3,S1]");

        let weekly = ConstraintTag::WeeklyHours {
            employee: "E1".into(),
            week: week_label(date()),
        };
        assert_eq!(weekly.to_string(), "weekly_hours[E1,2025-W49]");
    }

    #[test]
    fn every_tag_maps_to_exactly_one_family() {
        let tags = vec![
            ConstraintTag::Cover {
                date: date(),
                shift: "S1".into(),
                skill: "RN".into(),
            },
            ConstraintTag::OnePerDay {
                employee: "E1".into(),
                date: date(),
            },
            ConstraintTag::WeeklyHours {
                employee: "E1".into(),
                week: "2025-W49".into(),
            },
            ConstraintTag::ForbiddenPair {
                employee: "E1".into(),
                date: date(),
                first: "S3".into(),
                second: "S1".into(),
            },
            ConstraintTag::ConsecDays {
                employee: "E1".into(),
                date: date(),
            },
            ConstraintTag::SkillRatio {
                date: date(),
                shift: "S3".into(),
            },
            ConstraintTag::NightCap {
                employee: "E1".into(),
            },
            ConstraintTag::MinShifts {
                employee: "E1".into(),
            },
            ConstraintTag::WeekendLink {
                employee: "E1".into(),
                week: "2025-W49".into(),
            },
        ];
        let families: Vec<_> = tags.iter().map(|t| t.family()).collect();
        assert_eq!(families.len(), 9);
        for window in families.windows(2) {
            assert_ne!(window[0], window[1]);
        }
    }

    #[test]
    fn iso_week_label_rolls_over_year_boundaries() {
        // 2024-12-30 belongs to ISO week 1 of 2025.
        let date = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        assert_eq!(week_label(date), "2025-W01");
    }
}
