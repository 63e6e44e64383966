//! Classification of an infeasible core into actionable conflicts.
//!
//! Every constraint tag maps to exactly one conflict bucket, so a non-empty
//! IIS always yields at least one classified conflict.

use rosterd_core::model::{ConstraintFamily, ConstraintTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Only coverage constraints conflict: the catalog simply cannot staff
    /// the listed (date, shift, skill) slots.
    InsufficientCapacity,
    /// Rest rules and weekly hour caps interact.
    RestHours,
    /// Senior/junior balance cannot be met on the listed slots.
    SeniorityImbalance,
    /// Anything else.
    Other,
}

#[derive(Debug, Clone)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub message: String,
    pub tags: Vec<ConstraintTag>,
}

/// Group the IIS tags into conflicts, one per kind present.
pub fn classify(iis: &[ConstraintTag]) -> Vec<Conflict> {
    let mut capacity: Vec<ConstraintTag> = Vec::new();
    let mut rest: Vec<ConstraintTag> = Vec::new();
    let mut ratio: Vec<ConstraintTag> = Vec::new();
    let mut other: Vec<ConstraintTag> = Vec::new();

    for tag in iis {
        match tag.family() {
            ConstraintFamily::Cover => capacity.push(tag.clone()),
            ConstraintFamily::ForbiddenPair | ConstraintFamily::WeeklyHours => {
                rest.push(tag.clone())
            }
            ConstraintFamily::SkillRatio => ratio.push(tag.clone()),
            _ => other.push(tag.clone()),
        }
    }

    let mut conflicts = Vec::new();
    if !capacity.is_empty() {
        let slots: Vec<String> = capacity
            .iter()
            .filter_map(|tag| match tag {
                ConstraintTag::Cover { date, shift, skill } => {
                    Some(format!("({date}, {shift}, {skill})"))
                }
                _ => None,
            })
            .collect();
        conflicts.push(Conflict {
            kind: ConflictKind::InsufficientCapacity,
            message: format!("insufficient staffing capacity on [{}]", slots.join(", ")),
            tags: capacity,
        });
    }
    if !rest.is_empty() {
        let labels: Vec<String> = rest.iter().map(ToString::to_string).collect();
        conflicts.push(Conflict {
            kind: ConflictKind::RestHours,
            message: format!("rest/hours conflict involving [{}]", labels.join(", ")),
            tags: rest,
        });
    }
    if !ratio.is_empty() {
        let slots: Vec<String> = ratio
            .iter()
            .filter_map(|tag| match tag {
                ConstraintTag::SkillRatio { date, shift } => Some(format!("({date}, {shift})")),
                _ => None,
            })
            .collect();
        conflicts.push(Conflict {
            kind: ConflictKind::SeniorityImbalance,
            message: format!("seniority imbalance on [{}]", slots.join(", ")),
            tags: ratio,
        });
    }
    if !other.is_empty() {
        let labels: Vec<String> = other.iter().map(ToString::to_string).collect();
        conflicts.push(Conflict {
            kind: ConflictKind::Other,
            message: format!("conflicting constraints: [{}]", labels.join(", ")),
            tags: other,
        });
    }
    conflicts
}
