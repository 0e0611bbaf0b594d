use crate::error::Result;
use crate::notice::{LevelUpNotice, NoticeLog};
use crate::roster::{Activity, Participant, ProgressCounters, Roster};
use crate::types::MasteryLevel;
use serde::Serialize;
use std::path::Path;

// ---------------------------------------------------------------------------
// Threshold table
// ---------------------------------------------------------------------------

/// Minimum counters required to hold `level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelThreshold {
    pub level: u8,
    pub days_completed: u32,
    pub artifacts_submitted: u32,
    pub ai_tutor_sessions: u32,
    pub peer_assists: u32,
}

impl LevelThreshold {
    pub fn is_met(&self, c: &ProgressCounters) -> bool {
        c.days_completed >= self.days_completed
            && c.artifacts_submitted >= self.artifacts_submitted
            && c.ai_tutor_sessions >= self.ai_tutor_sessions
            && c.peer_assists >= self.peer_assists
    }
}

/// Ordered from highest level down.
pub const THRESHOLDS: [LevelThreshold; 3] = [
    LevelThreshold {
        level: 4,
        days_completed: 20,
        artifacts_submitted: 12,
        ai_tutor_sessions: 10,
        peer_assists: 5,
    },
    LevelThreshold {
        level: 3,
        days_completed: 10,
        artifacts_submitted: 5,
        ai_tutor_sessions: 5,
        peer_assists: 1,
    },
    LevelThreshold {
        level: 2,
        days_completed: 3,
        artifacts_submitted: 0,
        ai_tutor_sessions: 1,
        peer_assists: 0,
    },
];

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// The level the counters qualify for, if strictly above the current level.
///
/// Thresholds are checked from the top down and the first satisfied one wins,
/// so a single call yields at most one level change, possibly skipping tiers.
pub fn calculate_new_level(counters: &ProgressCounters) -> Option<MasteryLevel> {
    let earned = THRESHOLDS.iter().find(|t| t.is_met(counters))?;
    let level = MasteryLevel::new(earned.level).ok()?;
    (level > counters.mastery_level).then_some(level)
}

/// Result of applying an evaluation to one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelUp {
    pub participant_id: String,
    pub from: MasteryLevel,
    pub to: MasteryLevel,
    /// False when an identical notice already existed.
    pub notified: bool,
}

/// Evaluate `participant` and apply any level-up in place, recording a notice.
///
/// Applying the same level-up twice is a no-op the second time: the level is
/// already set, so the evaluation returns `None`.
pub fn apply_level_up(participant: &mut Participant, notices: &mut NoticeLog) -> Option<LevelUp> {
    let to = calculate_new_level(&participant.counters())?;
    let from = participant.mastery_level;
    participant.mastery_level = to;
    let notified = notices.push(LevelUpNotice::new(&participant.id, from, to));
    tracing::info!(
        participant = %participant.id,
        %from,
        %to,
        clearance = %to.clearance(),
        "mastery level up"
    );
    Some(LevelUp {
        participant_id: participant.id.clone(),
        from,
        to,
        notified,
    })
}

/// Reactive path: record `count` activities and evaluate the participant
/// against the same loaded roster, persisting both with one save.
pub fn record_activity(
    root: &Path,
    id: &str,
    activity: Activity,
    count: u32,
) -> Result<(Participant, Option<LevelUp>)> {
    let mut roster = Roster::load(root)?;
    let mut notices = NoticeLog::load(root)?;
    let participant = roster.get_mut(id)?;
    for _ in 0..count {
        participant.record(activity);
    }
    let outcome = apply_level_up(participant, &mut notices);
    let updated = participant.clone();
    roster.save(root)?;
    if outcome.is_some() {
        notices.save(root)?;
    }
    Ok((updated, outcome))
}

/// Evaluate one participant as stored and persist any level-up.
pub fn check_participant(root: &Path, id: &str) -> Result<Option<LevelUp>> {
    let mut roster = Roster::load(root)?;
    let mut notices = NoticeLog::load(root)?;
    let outcome = apply_level_up(roster.get_mut(id)?, &mut notices);
    if outcome.is_some() {
        roster.save(root)?;
        notices.save(root)?;
    }
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
