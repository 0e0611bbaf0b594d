//! Scheduled sweeps over the whole roster.
//!
//! Sweeps report partial success: a bad record is listed in `errors` and the
//! sweep moves on to the next participant.

use crate::error::Result;
use crate::mastery::{apply_level_up, LevelUp};
use crate::notice::NoticeLog;
use crate::recognition::grant_awards;
use crate::roster::Roster;
use crate::types::AwardKind;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordError {
    pub participant_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub processed: usize,
    pub updated: usize,
    pub errors: Vec<RecordError>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MasterySweep {
    #[serde(flatten)]
    pub summary: SweepSummary,
    pub level_ups: Vec<LevelUp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Granted {
    pub participant_id: String,
    pub awards: Vec<AwardKind>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RecognitionSweep {
    #[serde(flatten)]
    pub summary: SweepSummary,
    pub granted: Vec<Granted>,
}

/// Evaluate mastery thresholds for every participant.
pub fn run_mastery_sweep(root: &Path) -> Result<MasterySweep> {
    let mut roster = Roster::load(root)?;
    let mut notices = NoticeLog::load(root)?;
    let mut out = MasterySweep::default();

    for participant in roster.participants.iter_mut() {
        out.summary.processed += 1;
        if let Err(e) = crate::paths::validate_id(&participant.id) {
            tracing::warn!(participant = %participant.id, error = %e, "skipping participant in mastery sweep");
            out.summary.errors.push(RecordError {
                participant_id: participant.id.clone(),
                error: e.to_string(),
            });
            continue;
        }
        if let Some(level_up) = apply_level_up(participant, &mut notices) {
            out.summary.updated += 1;
            out.level_ups.push(level_up);
        }
    }

    if out.summary.updated > 0 {
        roster.save(root)?;
        notices.save(root)?;
    }
    tracing::info!(
        processed = out.summary.processed,
        updated = out.summary.updated,
        errors = out.summary.errors.len(),
        "mastery sweep complete"
    );
    Ok(out)
}

/// Grant recognition awards for every participant on `program_day`.
pub fn run_recognition_sweep(root: &Path, program_day: i64) -> Result<RecognitionSweep> {
    let mut roster = Roster::load(root)?;
    let mut out = RecognitionSweep::default();

    for participant in roster.participants.iter_mut() {
        out.summary.processed += 1;
        if let Err(e) = crate::paths::validate_id(&participant.id) {
            tracing::warn!(participant = %participant.id, error = %e, "skipping participant in recognition sweep");
            out.summary.errors.push(RecordError {
                participant_id: participant.id.clone(),
                error: e.to_string(),
            });
            continue;
        }
        let awards = grant_awards(participant, program_day);
        if !awards.is_empty() {
            out.summary.updated += 1;
            out.granted.push(Granted {
                participant_id: participant.id.clone(),
                awards,
            });
        }
    }

    if out.summary.updated > 0 {
        roster.save(root)?;
    }
    tracing::info!(
        processed = out.summary.processed,
        updated = out.summary.updated,
        errors = out.summary.errors.len(),
        "recognition sweep complete"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Participant;
    use tempfile::TempDir;

    fn seed(dir: &TempDir) {
        crate::io::ensure_dir(&crate::paths::academy_dir(dir.path())).unwrap();
        let mut ready = Participant::new("ada", "Ada", "analyst");
        ready.days_completed = 3;
        ready.ai_tutor_sessions = 1;
        let fresh = Participant::new("bo", "Bo", "operator");
        // Hand-edited row with an id the store would never accept.
        let mut broken = Participant::new("x", "Broken", "operator");
        broken.id = "Not Valid".to_string();
        broken.peer_assists = 9;
        let roster = Roster {
            participants: vec![ready, fresh, broken],
        };
        roster.save(dir.path()).unwrap();
    }

    #[test]
    fn mastery_sweep_reports_partial_success() {
        let dir = TempDir::new().unwrap();
        seed(&dir);
        let sweep = run_mastery_sweep(dir.path()).unwrap();
        assert_eq!(sweep.summary.processed, 3);
        assert_eq!(sweep.summary.updated, 1);
        assert_eq!(sweep.summary.errors.len(), 1);
        assert_eq!(sweep.level_ups[0].participant_id, "ada");

        let roster = Roster::load(dir.path()).unwrap();
        assert_eq!(roster.get("ada").unwrap().mastery_level.get(), 2);
        assert_eq!(NoticeLog::load(dir.path()).unwrap().notices.len(), 1);
    }

    #[test]
    fn second_mastery_sweep_updates_nothing() {
        let dir = TempDir::new().unwrap();
        seed(&dir);
        run_mastery_sweep(dir.path()).unwrap();
        let again = run_mastery_sweep(dir.path()).unwrap();
        assert_eq!(again.summary.updated, 0);
        assert_eq!(NoticeLog::load(dir.path()).unwrap().notices.len(), 1);
    }

    #[test]
    fn recognition_sweep_grants_once() {
        let dir = TempDir::new().unwrap();
        seed(&dir);
        let first = run_recognition_sweep(dir.path(), 3).unwrap();
        // ada has perfect attendance on day 3.
        assert_eq!(first.summary.updated, 1);
        assert_eq!(first.granted[0].awards, vec![AwardKind::PerfectAttendance]);

        let second = run_recognition_sweep(dir.path(), 3).unwrap();
        assert_eq!(second.summary.updated, 0);
        assert_eq!(second.summary.errors.len(), 1);
    }

    #[test]
    fn summary_serializes_flat() {
        let sweep = MasterySweep::default();
        let json = serde_json::to_value(&sweep).unwrap();
        assert_eq!(json["processed"], 0);
        assert_eq!(json["updated"], 0);
        assert_eq!(json["errors"], serde_json::json!([]));
    }
}
