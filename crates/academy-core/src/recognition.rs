use crate::roster::{Award, Participant};
use crate::types::{AwardKind, MasteryLevel};
use chrono::Utc;

const ARTIFACT_ACE_MIN: u32 = 10;
const PEER_MENTOR_MIN: u32 = 5;
const TUTOR_REGULAR_MIN: u32 = 8;

/// Awards `participant` qualifies for on `program_day`, regardless of what is
/// already held.
pub fn eligible_awards(participant: &Participant, program_day: i64) -> Vec<AwardKind> {
    let mut out = Vec::new();
    if program_day >= 1 && i64::from(participant.days_completed) >= program_day {
        out.push(AwardKind::PerfectAttendance);
    }
    if participant.artifacts_submitted >= ARTIFACT_ACE_MIN {
        out.push(AwardKind::ArtifactAce);
    }
    if participant.peer_assists >= PEER_MENTOR_MIN {
        out.push(AwardKind::PeerMentor);
    }
    if participant.ai_tutor_sessions >= TUTOR_REGULAR_MIN {
        out.push(AwardKind::TutorRegular);
    }
    if participant.mastery_level == MasteryLevel::MAX {
        out.push(AwardKind::TopClearance);
    }
    out
}

/// Grant every eligible award not yet held. Returns the newly granted kinds.
pub fn grant_awards(participant: &mut Participant, program_day: i64) -> Vec<AwardKind> {
    let granted: Vec<AwardKind> = eligible_awards(participant, program_day)
        .into_iter()
        .filter(|k| !participant.has_award(*k))
        .collect();
    let now = Utc::now();
    for kind in &granted {
        participant.awards.push(Award {
            kind: *kind,
            awarded_at: now,
        });
        tracing::info!(participant = %participant.id, award = %kind, "recognition awarded");
    }
    granted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_participant_earns_nothing_on_day_one() {
        let p = Participant::new("ada", "Ada", "analyst");
        assert!(eligible_awards(&p, 1).is_empty());
    }

    #[test]
    fn attendance_tracks_program_day() {
        let mut p = Participant::new("ada", "Ada", "analyst");
        p.days_completed = 5;
        assert!(eligible_awards(&p, 5).contains(&AwardKind::PerfectAttendance));
        assert!(!eligible_awards(&p, 6).contains(&AwardKind::PerfectAttendance));
        assert!(!eligible_awards(&p, 0).contains(&AwardKind::PerfectAttendance));
    }

    #[test]
    fn counters_unlock_awards() {
        let mut p = Participant::new("ada", "Ada", "analyst");
        p.artifacts_submitted = 10;
        p.peer_assists = 5;
        p.ai_tutor_sessions = 8;
        p.mastery_level = MasteryLevel::MAX;
        let awards = eligible_awards(&p, 30);
        assert_eq!(
            awards,
            vec![
                AwardKind::ArtifactAce,
                AwardKind::PeerMentor,
                AwardKind::TutorRegular,
                AwardKind::TopClearance,
            ]
        );
    }

    #[test]
    fn grants_only_once() {
        let mut p = Participant::new("ada", "Ada", "analyst");
        p.peer_assists = 6;
        assert_eq!(grant_awards(&mut p, 1), vec![AwardKind::PeerMentor]);
        assert!(grant_awards(&mut p, 1).is_empty());
        assert_eq!(p.awards.len(), 1);
    }
}
