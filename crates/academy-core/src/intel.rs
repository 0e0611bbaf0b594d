use crate::error::{AcademyError, Result};
use crate::paths;
use crate::types::Priority;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// IntelDrop
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntelDrop {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Task forces this drop is meant for; `None` or empty means everyone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_teams: Option<Vec<String>>,
    #[serde(default)]
    pub released: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied by an admin edit. `None` leaves a field alone.
///
/// `priority` distinguishes an absent key (`None`) from an explicit `null`
/// (`Some(None)`), which clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntelEdit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<Option<Priority>>,
    #[serde(default)]
    pub target_teams: Option<Vec<String>>,
}

impl IntelDrop {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            body: body.into(),
            priority: None,
            target_teams: None,
            released: false,
            released_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_targeted_at(&self, team: Option<&str>) -> bool {
        match self.target_teams.as_deref() {
            None | Some([]) => true,
            Some(teams) => team.is_some_and(|t| teams.iter().any(|x| x == t)),
        }
    }

    /// Admins see everything; others see released drops aimed at their team.
    pub fn is_visible_to(&self, team: Option<&str>, admin: bool) -> bool {
        admin || (self.released && self.is_targeted_at(team))
    }

    /// Apply `edit`. A blank title rejects the whole edit.
    pub fn apply_edit(&mut self, edit: IntelEdit) -> Result<()> {
        if let Some(title) = &edit.title {
            validate_title(title)?;
        }
        if let Some(title) = edit.title {
            self.title = title;
        }
        if let Some(body) = edit.body {
            self.body = body;
        }
        if let Some(priority) = edit.priority {
            self.priority = priority;
        }
        if let Some(teams) = edit.target_teams {
            self.target_teams = if teams.is_empty() { None } else { Some(teams) };
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Mark released. Returns false if it already was.
    pub fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        let now = Utc::now();
        self.released = true;
        self.released_at = Some(now);
        self.updated_at = now;
        true
    }
}

pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AcademyError::InvalidTitle);
    }
    Ok(())
}

/// A key that is present deserializes to `Some`, even when its value is null.
fn present<'de, D, T>(de: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

// ---------------------------------------------------------------------------
// IntelBoard: persisted collection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntelBoard {
    #[serde(default)]
    pub drops: Vec<IntelDrop>,
}

impl IntelBoard {
    pub fn load(root: &Path) -> Result<Self> {
        if !paths::academy_dir(root).is_dir() {
            return Err(AcademyError::NotInitialized);
        }
        let mut board: IntelBoard = match crate::io::read_optional(&paths::intel_path(root))? {
            Some(data) => serde_yaml::from_str(&data)?,
            None => Self::default(),
        };
        board.drops.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(board)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::intel_path(root), data.as_bytes())
    }

    pub fn get(&self, id: &str) -> Result<&IntelDrop> {
        self.drops
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| AcademyError::IntelNotFound(id.to_string()))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut IntelDrop> {
        self.drops
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| AcademyError::IntelNotFound(id.to_string()))
    }

    pub fn visible_to<'a>(
        &'a self,
        team: Option<&'a str>,
        admin: bool,
    ) -> impl Iterator<Item = &'a IntelDrop> + 'a {
        self.drops
            .iter()
            .filter(move |d| d.is_visible_to(team, admin))
    }
}

// ---------------------------------------------------------------------------
// Store operations
// ---------------------------------------------------------------------------

pub fn create(root: &Path, drop: IntelDrop) -> Result<IntelDrop> {
    validate_title(&drop.title)?;
    let mut board = IntelBoard::load(root)?;
    board.drops.push(drop.clone());
    board.save(root)?;
    Ok(drop)
}

pub fn edit(root: &Path, id: &str, edit: IntelEdit) -> Result<IntelDrop> {
    let mut board = IntelBoard::load(root)?;
    let drop = board.get_mut(id)?;
    drop.apply_edit(edit)?;
    let updated = drop.clone();
    board.save(root)?;
    Ok(updated)
}

/// Release a drop. The flag is false when it had already been released.
pub fn release(root: &Path, id: &str) -> Result<(IntelDrop, bool)> {
    let mut board = IntelBoard::load(root)?;
    let drop = board.get_mut(id)?;
    let changed = drop.release();
    let released = drop.clone();
    if changed {
        board.save(root)?;
        tracing::info!(intel = %released.id, title = %released.title, "intel drop released");
    }
    Ok((released, changed))
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

    fn targeted(teams: &[&str]) -> IntelDrop {
        let mut d = IntelDrop::new("Op Nightjar", "Rendezvous at 0600");
        d.target_teams = Some(teams.iter().map(|t| t.to_string()).collect());
        d
    }

    #[test]
    fn unreleased_only_visible_to_admin() {
        let d = IntelDrop::new("t", "b");
        assert!(!d.is_visible_to(None, false));
        assert!(d.is_visible_to(None, true));
    }

    #[test]
    fn targeting_rules() {
        let mut d = targeted(&["red"]);
        d.release();
        assert!(d.is_visible_to(Some("red"), false));
        assert!(!d.is_visible_to(Some("blue"), false));
        assert!(!d.is_visible_to(None, false));

        let mut everyone = targeted(&[]);
        everyone.release();
        assert!(everyone.is_visible_to(Some("blue"), false));
        assert!(everyone.is_visible_to(None, false));
    }

    #[test]
    fn release_is_idempotent() {
        let mut d = IntelDrop::new("t", "b");
        assert!(d.release());
        let first = d.released_at;
        assert!(!d.release());
        assert_eq!(d.released_at, first);
    }

    #[test]
    fn edit_updates_selected_fields() {
        let mut d = targeted(&["red"]);
        d.priority = Some(Priority::Flash);
        d.apply_edit(IntelEdit {
            body: Some("Moved to 0700".into()),
            target_teams: Some(vec![]),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(d.title, "Op Nightjar");
        assert_eq!(d.body, "Moved to 0700");
        assert_eq!(d.priority, Some(Priority::Flash));
        assert!(d.target_teams.is_none());
    }

    #[test]
    fn blank_title_rejects_the_edit() {
        let mut d = IntelDrop::new("Op Nightjar", "Rendezvous at 0600");
        for title in ["", "   "] {
            let err = d
                .apply_edit(IntelEdit {
                    title: Some(title.into()),
                    body: Some("changed".into()),
                    ..Default::default()
                })
                .unwrap_err();
            assert!(matches!(err, AcademyError::InvalidTitle));
        }
        assert_eq!(d.title, "Op Nightjar");
        assert_eq!(d.body, "Rendezvous at 0600");
    }

    #[test]
    fn null_priority_clears_and_absent_priority_keeps() {
        let mut d = IntelDrop::new("t", "b");
        d.priority = Some(Priority::Flash);

        let keep: IntelEdit = serde_json::from_str(r#"{"body": "b2"}"#).unwrap();
        assert!(keep.priority.is_none());
        d.apply_edit(keep).unwrap();
        assert_eq!(d.priority, Some(Priority::Flash));

        let clear: IntelEdit = serde_json::from_str(r#"{"priority": null}"#).unwrap();
        assert_eq!(clear.priority, Some(None));
        d.apply_edit(clear).unwrap();
        assert_eq!(d.priority, None);

        let set: IntelEdit = serde_json::from_str(r#"{"priority": "routine"}"#).unwrap();
        d.apply_edit(set).unwrap();
        assert_eq!(d.priority, Some(Priority::Routine));
    }

    #[test]
    fn create_rejects_blank_title() {
        let dir = TempDir::new().unwrap();
        init(&dir);
        assert!(matches!(
            create(dir.path(), IntelDrop::new(" ", "b")),
            Err(AcademyError::InvalidTitle)
        ));
        assert!(IntelBoard::load(dir.path()).unwrap().drops.is_empty());
    }

    #[test]
    fn store_roundtrip() {
        let dir = TempDir::new().unwrap();
        init(&dir);
        let created = create(dir.path(), IntelDrop::new("Alpha", "first")).unwrap();
        create(dir.path(), IntelDrop::new("Bravo", "second")).unwrap();

        let (released, changed) = release(dir.path(), &created.id).unwrap();
        assert!(changed);
        assert!(released.released);
        let (_, again) = release(dir.path(), &created.id).unwrap();
        assert!(!again);

        let board = IntelBoard::load(dir.path()).unwrap();
        assert_eq!(board.drops.len(), 2);
        let visible: Vec<&str> = board
            .visible_to(None, false)
            .map(|d| d.title.as_str())
            .collect();
        assert_eq!(visible, ["Alpha"]);
    }

    #[test]
    fn missing_drop_is_not_found() {
        let dir = TempDir::new().unwrap();
        init(&dir);
        assert!(matches!(
            release(dir.path(), "nope"),
            Err(AcademyError::IntelNotFound(_))
        ));
    }
}
