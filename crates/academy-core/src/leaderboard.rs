use crate::roster::Participant;
use crate::types::{Clearance, MasteryLevel};
use serde::Serialize;
use std::cmp::Reverse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub task_force: Option<String>,
    pub mastery_level: MasteryLevel,
    pub clearance: Clearance,
    pub days_completed: u32,
    pub artifacts_submitted: u32,
    pub awards: usize,
}

/// Rank participants by level, days, artifacts (all descending), then name.
pub fn rank<'a>(participants: impl IntoIterator<Item = &'a Participant>) -> Vec<LeaderboardEntry> {
    let mut sorted: Vec<&Participant> = participants.into_iter().collect();
    sorted.sort_by_key(|p| {
        (
            Reverse(p.mastery_level),
            Reverse(p.days_completed),
            Reverse(p.artifacts_submitted),
            p.name.clone(),
        )
    });
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, p)| LeaderboardEntry {
            rank: i + 1,
            id: p.id.clone(),
            name: p.name.clone(),
            task_force: p.task_force.clone(),
            mastery_level: p.mastery_level,
            clearance: p.clearance(),
            days_completed: p.days_completed,
            artifacts_submitted: p.artifacts_submitted,
            awards: p.awards.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: &str, level: u8, days: u32, artifacts: u32) -> Participant {
        let mut p = Participant::new(id, id.to_uppercase(), "analyst");
        p.mastery_level = MasteryLevel::new(level).unwrap();
        p.days_completed = days;
        p.artifacts_submitted = artifacts;
        p
    }

    #[test]
    fn orders_by_level_then_days_then_artifacts_then_name() {
        let people = [
            p("cy", 2, 5, 1),
            p("ada", 3, 1, 0),
            p("bo", 2, 5, 4),
            p("al", 2, 5, 1),
            p("dee", 2, 6, 0),
        ];
        let board = rank(&people);
        let ids: Vec<&str> = board.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["ada", "dee", "bo", "al", "cy"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[4].rank, 5);
    }

    #[test]
    fn empty_board() {
        assert!(rank(&Vec::<Participant>::new()).is_empty());
    }
}
