//! Readiness scoring over mastery snapshots.
//!
//! Every function here is a pure reducer: no I/O, no stored history. Callers
//! supply the previous overall figure when they want a trend.

use crate::roster::{MemberMastery, Participant};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Highest mastery level; the denominator of every readiness percentage.
const MAX_LEVEL: u64 = 4;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleReadiness {
    pub role: String,
    pub readiness: u32,
    pub member_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskForceReadiness {
    pub overall_readiness: u32,
    pub role_breakdown: Vec<RoleReadiness>,
    pub weakest_role: Option<String>,
    pub strongest_role: Option<String>,
    /// `overall - previous`, when the caller supplied a previous figure.
    pub trend: Option<i64>,
    pub program_day: i64,
    pub target_readiness: u32,
    pub is_on_track: bool,
    pub member_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedReadiness {
    pub task_force: String,
    #[serde(flatten)]
    pub readiness: TaskForceReadiness,
}

// ---------------------------------------------------------------------------
// Program calendar
// ---------------------------------------------------------------------------

/// Day number of `today` in a program starting on `start` (start date is day 1).
/// Zero or negative before the program begins.
pub fn program_day(start: NaiveDate, today: NaiveDate) -> i64 {
    (today - start).num_days() + 1
}

/// Expected readiness for a program day: four weekly plateaus of a 25-day program.
pub fn target_readiness(program_day: i64) -> u32 {
    match program_day {
        i64::MIN..=0 => 0,
        1..=7 => 25,
        8..=14 => 50,
        15..=21 => 75,
        _ => 100,
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// `round(sum(level) / (count * 4) * 100)`; zero for an empty group.
fn percentage<'a>(members: impl IntoIterator<Item = &'a MemberMastery>) -> (u32, usize) {
    let (sum, count) = members
        .into_iter()
        .fold((0u64, 0usize), |(sum, count), m| {
            (sum + u64::from(m.mastery_level.get()), count + 1)
        });
    if count == 0 {
        return (0, 0);
    }
    let ratio = sum as f64 / (count as u64 * MAX_LEVEL) as f64;
    ((ratio * 100.0).round() as u32, count)
}

pub fn overall_readiness(members: &[MemberMastery]) -> u32 {
    percentage(members).0
}

/// Per-role readiness, sorted by role name.
pub fn role_breakdown(members: &[MemberMastery]) -> Vec<RoleReadiness> {
    let mut groups: BTreeMap<&str, Vec<&MemberMastery>> = BTreeMap::new();
    for m in members {
        groups.entry(m.role.as_str()).or_default().push(m);
    }
    groups
        .into_iter()
        .map(|(role, group)| {
            let (readiness, member_count) = percentage(group);
            RoleReadiness {
                role: role.to_string(),
                readiness,
                member_count,
            }
        })
        .collect()
}

/// Aggregate readiness for one group of members on `program_day`.
pub fn compute(
    members: &[MemberMastery],
    previous: Option<u32>,
    program_day: i64,
) -> TaskForceReadiness {
    let overall = overall_readiness(members);
    let breakdown = role_breakdown(members);
    let target = target_readiness(program_day);

    // min_by_key/max_by_key keep the first and last extreme respectively;
    // walk in reverse for max so ties resolve to the earliest role name.
    let weakest = breakdown
        .iter()
        .min_by_key(|r| r.readiness)
        .map(|r| r.role.clone());
    let strongest = breakdown
        .iter()
        .rev()
        .max_by_key(|r| r.readiness)
        .map(|r| r.role.clone());

    TaskForceReadiness {
        overall_readiness: overall,
        weakest_role: weakest,
        strongest_role: strongest,
        trend: previous.map(|p| i64::from(overall) - i64::from(p)),
        program_day,
        target_readiness: target,
        is_on_track: !members.is_empty() && overall >= target,
        member_count: members.len(),
        role_breakdown: breakdown,
    }
}

/// Readiness for every task force in the roster, sorted by task-force name.
/// Participants without a task force are skipped.
pub fn readiness_by_task_force(participants: &[Participant], program_day: i64) -> Vec<NamedReadiness> {
    let mut forces: BTreeMap<&str, Vec<MemberMastery>> = BTreeMap::new();
    for p in participants {
        if let Some(tf) = p.task_force.as_deref() {
            forces.entry(tf).or_default().push(p.mastery());
        }
    }
    forces
        .into_iter()
        .map(|(name, members)| NamedReadiness {
            task_force: name.to_string(),
            readiness: compute(&members, None, program_day),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MasteryLevel;

    fn member(id: &str, role: &str, level: u8) -> MemberMastery {
        let level = MasteryLevel::new(level).unwrap();
        MemberMastery {
            id: id.to_string(),
            name: id.to_uppercase(),
            role: role.to_string(),
            mastery_level: level,
            clearance: level.clearance(),
            days_completed: 0,
        }
    }

    #[test]
    fn empty_input_is_zeroed() {
        let r = compute(&[], Some(40), 15);
        assert_eq!(r.overall_readiness, 0);
        assert!(r.role_breakdown.is_empty());
        assert!(!r.is_on_track);
        assert_eq!(r.weakest_role, None);
        assert_eq!(r.strongest_role, None);
        assert_eq!(r.member_count, 0);
    }

    #[test]
    fn empty_input_off_track_even_before_start() {
        let r = compute(&[], None, 0);
        assert_eq!(r.target_readiness, 0);
        assert!(!r.is_on_track);
    }

    #[test]
    fn overall_formula_rounds() {
        // (1 + 2 + 2) / 12 = 41.67 -> 42
        let members = [
            member("a", "analyst", 1),
            member("b", "analyst", 2),
            member("c", "operator", 2),
        ];
        assert_eq!(overall_readiness(&members), 42);
    }

    #[test]
    fn overall_bounds_hold() {
        let all_min: Vec<_> = (0..5).map(|i| member(&format!("m{i}"), "r", 1)).collect();
        let all_max: Vec<_> = (0..5).map(|i| member(&format!("m{i}"), "r", 4)).collect();
        assert_eq!(overall_readiness(&all_min), 25);
        assert_eq!(overall_readiness(&all_max), 100);
        for level in 1..=4 {
            let one = [member("x", "r", level)];
            let r = overall_readiness(&one);
            assert!(r <= 100);
        }
    }

    #[test]
    fn breakdown_groups_by_role_and_tags_extremes() {
        let members = [
            member("a", "operator", 4),
            member("b", "analyst", 1),
            member("c", "analyst", 2),
            member("d", "engineer", 3),
        ];
        let r = compute(&members, None, 1);
        let roles: Vec<&str> = r.role_breakdown.iter().map(|x| x.role.as_str()).collect();
        assert_eq!(roles, ["analyst", "engineer", "operator"]);
        assert_eq!(r.role_breakdown[0].readiness, 38); // 3/8
        assert_eq!(r.role_breakdown[0].member_count, 2);
        assert_eq!(r.weakest_role.as_deref(), Some("analyst"));
        assert_eq!(r.strongest_role.as_deref(), Some("operator"));
    }

    #[test]
    fn ties_resolve_to_first_role_name() {
        let members = [member("a", "zulu", 2), member("b", "alpha", 2)];
        let r = compute(&members, None, 1);
        assert_eq!(r.weakest_role.as_deref(), Some("alpha"));
        assert_eq!(r.strongest_role.as_deref(), Some("alpha"));
    }

    #[test]
    fn trend_against_previous() {
        let members = [member("a", "analyst", 2)];
        assert_eq!(compute(&members, Some(60), 1).trend, Some(-10));
        assert_eq!(compute(&members, Some(40), 1).trend, Some(10));
        assert_eq!(compute(&members, None, 1).trend, None);
    }

    #[test]
    fn target_plateaus() {
        assert_eq!(target_readiness(-3), 0);
        assert_eq!(target_readiness(0), 0);
        assert_eq!(target_readiness(1), 25);
        assert_eq!(target_readiness(7), 25);
        assert_eq!(target_readiness(8), 50);
        assert_eq!(target_readiness(15), 75);
        assert_eq!(target_readiness(21), 75);
        assert_eq!(target_readiness(22), 100);
        assert_eq!(target_readiness(40), 100);
    }

    #[test]
    fn on_track_compares_against_target() {
        let members = [member("a", "analyst", 3), member("b", "analyst", 3)];
        // 75% on day 15 (target 75) is on track; on day 22 (target 100) it is not.
        assert!(compute(&members, None, 15).is_on_track);
        assert!(!compute(&members, None, 22).is_on_track);
    }

    #[test]
    fn program_day_from_dates() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(program_day(start, start), 1);
        assert_eq!(program_day(start, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()), 0);
        assert_eq!(program_day(start, NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()), 15);
    }

    #[test]
    fn by_task_force_skips_unassigned() {
        let mut a = Participant::new("a", "A", "analyst").with_task_force("red");
        a.mastery_level = MasteryLevel::new(4).unwrap();
        let b = Participant::new("b", "B", "analyst").with_task_force("blue");
        let c = Participant::new("c", "C", "analyst");
        let forces = readiness_by_task_force(&[a, b, c], 1);
        let names: Vec<&str> = forces.iter().map(|f| f.task_force.as_str()).collect();
        assert_eq!(names, ["blue", "red"]);
        assert_eq!(forces[1].readiness.overall_readiness, 100);
        assert_eq!(forces[0].readiness.overall_readiness, 25);
    }
}
