use crate::error::{AcademyError, Result};
use crate::paths;
use crate::types::{AwardKind, Clearance, MasteryLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Award {
    pub kind: AwardKind,
    pub awarded_at: DateTime<Utc>,
}

/// Counter increment recorded against a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    DayCompleted,
    ArtifactSubmitted,
    TutorSession,
    PeerAssist,
}

impl Activity {
    pub fn as_str(self) -> &'static str {
        match self {
            Activity::DayCompleted => "day_completed",
            Activity::ArtifactSubmitted => "artifact_submitted",
            Activity::TutorSession => "tutor_session",
            Activity::PeerAssist => "peer_assist",
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Activity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "day_completed" => Ok(Activity::DayCompleted),
            "artifact_submitted" => Ok(Activity::ArtifactSubmitted),
            "tutor_session" => Ok(Activity::TutorSession),
            "peer_assist" => Ok(Activity::PeerAssist),
            _ => Err(format!("unknown activity: {s}")),
        }
    }
}

/// Counters the mastery thresholds are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressCounters {
    pub days_completed: u32,
    pub artifacts_submitted: u32,
    pub ai_tutor_sessions: u32,
    pub peer_assists: u32,
    pub mastery_level: MasteryLevel,
}

/// Read-only mastery snapshot of one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberMastery {
    pub id: String,
    pub name: String,
    pub role: String,
    pub mastery_level: MasteryLevel,
    pub clearance: Clearance,
    pub days_completed: u32,
}

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_force: Option<String>,
    #[serde(default)]
    pub mastery_level: MasteryLevel,
    #[serde(default)]
    pub days_completed: u32,
    #[serde(default)]
    pub artifacts_submitted: u32,
    #[serde(default)]
    pub ai_tutor_sessions: u32,
    #[serde(default)]
    pub peer_assists: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub awards: Vec<Award>,
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
            task_force: None,
            mastery_level: MasteryLevel::MIN,
            days_completed: 0,
            artifacts_submitted: 0,
            ai_tutor_sessions: 0,
            peer_assists: 0,
            awards: Vec::new(),
            joined_at: Utc::now(),
        }
    }

    pub fn with_task_force(mut self, task_force: impl Into<String>) -> Self {
        self.task_force = Some(task_force.into());
        self
    }

    pub fn clearance(&self) -> Clearance {
        self.mastery_level.clearance()
    }

    pub fn mastery(&self) -> MemberMastery {
        MemberMastery {
            id: self.id.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
            mastery_level: self.mastery_level,
            clearance: self.clearance(),
            days_completed: self.days_completed,
        }
    }

    pub fn counters(&self) -> ProgressCounters {
        ProgressCounters {
            days_completed: self.days_completed,
            artifacts_submitted: self.artifacts_submitted,
            ai_tutor_sessions: self.ai_tutor_sessions,
            peer_assists: self.peer_assists,
            mastery_level: self.mastery_level,
        }
    }

    pub fn record(&mut self, activity: Activity) {
        match activity {
            Activity::DayCompleted => self.days_completed += 1,
            Activity::ArtifactSubmitted => self.artifacts_submitted += 1,
            Activity::TutorSession => self.ai_tutor_sessions += 1,
            Activity::PeerAssist => self.peer_assists += 1,
        }
    }

    pub fn has_award(&self, kind: AwardKind) -> bool {
        self.awards.iter().any(|a| a.kind == kind)
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl Roster {
    pub fn load(root: &Path) -> Result<Self> {
        if !paths::academy_dir(root).is_dir() {
            return Err(AcademyError::NotInitialized);
        }
        let Some(data) = crate::io::read_optional(&paths::roster_path(root))? else {
            return Ok(Self::default());
        };
        let roster: Roster = serde_yaml::from_str(&data)?;
        Ok(roster)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::roster_path(root), data.as_bytes())
    }

    pub fn add(&mut self, participant: Participant) -> Result<()> {
        paths::validate_id(&participant.id)?;
        if self.participants.iter().any(|p| p.id == participant.id) {
            return Err(AcademyError::ParticipantExists(participant.id));
        }
        self.participants.push(participant);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&Participant> {
        self.participants
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AcademyError::ParticipantNotFound(id.to_string()))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Participant> {
        self.participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AcademyError::ParticipantNotFound(id.to_string()))
    }

    pub fn members(&self) -> Vec<MemberMastery> {
        self.participants.iter().map(Participant::mastery).collect()
    }

    /// Participants in `task_force`, or everyone when `None`.
    pub fn in_task_force<'a>(
        &'a self,
        task_force: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Participant> + 'a {
        self.participants
            .iter()
            .filter(move |p| task_force.is_none() || p.task_force.as_deref() == task_force)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init(dir: &TempDir) {
        crate::io::ensure_dir(&paths::academy_dir(dir.path())).unwrap();
    }

    #[test]
    fn load_without_init_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Roster::load(dir.path()),
            Err(AcademyError::NotInitialized)
        ));
    }

    #[test]
    fn missing_roster_file_is_empty() {
        let dir = TempDir::new().unwrap();
        init(&dir);
        assert!(Roster::load(dir.path()).unwrap().participants.is_empty());
    }

    #[test]
    fn add_save_load() {
        let dir = TempDir::new().unwrap();
        init(&dir);
        let mut roster = Roster::default();
        roster
            .add(Participant::new("ada", "Ada", "analyst").with_task_force("red"))
            .unwrap();
        roster.save(dir.path()).unwrap();

        let loaded = Roster::load(dir.path()).unwrap();
        let ada = loaded.get("ada").unwrap();
        assert_eq!(ada.task_force.as_deref(), Some("red"));
        assert_eq!(ada.mastery_level, MasteryLevel::MIN);
    }

    #[test]
    fn duplicate_add_rejected() {
        let mut roster = Roster::default();
        roster.add(Participant::new("ada", "Ada", "analyst")).unwrap();
        let err = roster
            .add(Participant::new("ada", "Ada Again", "analyst"))
            .unwrap_err();
        assert!(matches!(err, AcademyError::ParticipantExists(_)));
    }

    #[test]
    fn invalid_id_rejected() {
        let mut roster = Roster::default();
        assert!(roster.add(Participant::new("Ada L", "Ada", "analyst")).is_err());
    }

    #[test]
    fn record_activity_bumps_counter() {
        let mut p = Participant::new("ada", "Ada", "analyst");
        p.record(Activity::DayCompleted);
        p.record(Activity::DayCompleted);
        p.record(Activity::TutorSession);
        let c = p.counters();
        assert_eq!(c.days_completed, 2);
        assert_eq!(c.ai_tutor_sessions, 1);
        assert_eq!(c.artifacts_submitted, 0);
    }

    #[test]
    fn mastery_snapshot_carries_clearance() {
        let mut p = Participant::new("ada", "Ada", "analyst");
        p.mastery_level = MasteryLevel::new(2).unwrap();
        assert_eq!(p.mastery().clearance, Clearance::FieldTrainee);
    }

    #[test]
    fn task_force_filter() {
        let mut roster = Roster::default();
        roster
            .add(Participant::new("a", "A", "analyst").with_task_force("red"))
            .unwrap();
        roster
            .add(Participant::new("b", "B", "analyst").with_task_force("blue"))
            .unwrap();
        assert_eq!(roster.in_task_force(Some("red")).count(), 1);
        assert_eq!(roster.in_task_force(None).count(), 2);
    }
}
