use crate::error::Result;
use crate::paths;
use crate::types::{Clearance, MasteryLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelUpNotice {
    pub participant_id: String,
    pub from: MasteryLevel,
    pub to: MasteryLevel,
    pub clearance: Clearance,
    pub created_at: DateTime<Utc>,
}

impl LevelUpNotice {
    pub fn new(participant_id: &str, from: MasteryLevel, to: MasteryLevel) -> Self {
        Self {
            participant_id: participant_id.to_string(),
            from,
            to,
            clearance: to.clearance(),
            created_at: Utc::now(),
        }
    }
}

/// Append-only log of level-up notices, unique per (participant, level).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoticeLog {
    #[serde(default)]
    pub notices: Vec<LevelUpNotice>,
}

impl NoticeLog {
    pub fn load(root: &Path) -> Result<Self> {
        match crate::io::read_optional(&paths::notices_path(root))? {
            Some(data) => Ok(serde_yaml::from_str(&data)?),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::notices_path(root), data.as_bytes())
    }

    /// Record `notice` unless one for the same participant and level exists.
    /// Returns true if it was added.
    pub fn push(&mut self, notice: LevelUpNotice) -> bool {
        let duplicate = self
            .notices
            .iter()
            .any(|n| n.participant_id == notice.participant_id && n.to == notice.to);
        if duplicate {
            tracing::debug!(participant = %notice.participant_id, to = %notice.to, "duplicate level-up notice dropped");
            return false;
        }
        self.notices.push(notice);
        true
    }

    pub fn for_participant<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a LevelUpNotice> + 'a {
        self.notices.iter().filter(move |n| n.participant_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn level(l: u8) -> MasteryLevel {
        MasteryLevel::new(l).unwrap()
    }

    #[test]
    fn duplicate_notices_are_dropped() {
        let mut log = NoticeLog::default();
        assert!(log.push(LevelUpNotice::new("ada", level(1), level(2))));
        assert!(!log.push(LevelUpNotice::new("ada", level(1), level(2))));
        assert!(log.push(LevelUpNotice::new("ada", level(2), level(3))));
        assert!(log.push(LevelUpNotice::new("bo", level(1), level(2))));
        assert_eq!(log.notices.len(), 3);
        assert_eq!(log.for_participant("ada").count(), 2);
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut log = NoticeLog::default();
        log.push(LevelUpNotice::new("ada", level(1), level(2)));
        log.save(dir.path()).unwrap();
        let loaded = NoticeLog::load(dir.path()).unwrap();
        assert_eq!(loaded.notices.len(), 1);
        assert_eq!(loaded.notices[0].clearance, Clearance::FieldTrainee);
    }
}
